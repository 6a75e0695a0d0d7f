use std::sync::Arc;

use aide::{
	axum::{routing::get_with, ApiRouter, IntoApiResponse},
	openapi::OpenApi,
};
use axum::{response::IntoResponse, Extension};

use crate::{extract::Json, AppState};

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().api_route(
		"/api.json",
		get_with(serve_docs, |op| {
			op.summary("Get API documentation")
				.description("Returns this OpenAPI document.")
		}),
	)
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_serves_openapi_document() {
		let app = app();

		let response = app.get("/docs/api.json").await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert!(body["paths"].get("/posts/{id}/like").is_some());
		assert!(body["paths"].get("/auth/register").is_some());
	}
}
