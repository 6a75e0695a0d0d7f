use std::borrow::Cow;

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("user not found")]
	NotFound,
	#[error("username already taken")]
	UsernameTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/profile",
		get_with(get_profile, get_profile_docs).put_with(update_profile, update_profile_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::UsernameTaken => StatusCode::CONFLICT,
		}
	}

	fn message(&self) -> Cow<'static, str> {
		self.to_string().into()
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_get_profile() {
		let app = app();
		let token = register(&app, "ada").await;

		let response = app
			.get("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);

		let user = &response.json::<Value>()["data"]["user"];
		assert_eq!(user["username"], "ada");
		assert_eq!(user["bio"], Value::Null);
		assert!(user.get("email").is_none());
	}

	#[tokio::test]
	async fn test_update_profile_keeps_omitted_fields() {
		let app = app();
		let token = register(&app, "ada").await;

		let response = app
			.put("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({
				"bio": "  Counting engines  ",
				"location": "London",
				"cover_image": "/uploads/ada-cover.png",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let user = &response.json::<Value>()["data"]["user"];
		assert_eq!(user["name"], "ada");
		assert_eq!(user["username"], "ada");
		assert_eq!(user["bio"], "Counting engines");
		assert_eq!(user["location"], "London");
		assert_eq!(user["cover_image"], "/uploads/ada-cover.png");

		let response = app
			.put("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "username": "lovelace" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.get("/auth/me")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		let user = &response.json::<Value>()["data"]["user"];
		assert_eq!(user["username"], "lovelace");
		assert_eq!(user["location"], "London");
	}

	#[tokio::test]
	async fn test_update_profile_username_taken() {
		let app = app();
		let token = register(&app, "ada").await;
		register(&app, "bob").await;

		let response = app
			.put("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "username": "bob" }))
			.await;

		assert_eq!(response.status_code(), 409);
		assert_eq!(response.json::<Value>()["message"], "username already taken");
	}

	#[tokio::test]
	async fn test_update_profile_rejects_long_bio() {
		let app = app();
		let token = register(&app, "ada").await;

		let response = app
			.put("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "bio": "a".repeat(501) }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["status"], "error");

		let response = app
			.put("/users/profile")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "username": "not ok" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_profile_requires_session() {
		let app = app();

		assert_eq!(app.get("/users/profile").await.status_code(), 401);
		assert_eq!(
			app.put("/users/profile")
				.json(&json!({ "bio": "hi" }))
				.await
				.status_code(),
			401
		);
	}
}
