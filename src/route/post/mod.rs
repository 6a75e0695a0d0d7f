use aide::axum::{
	routing::{delete_with, get_with, post_with},
	ApiRouter,
};

use crate::{error, interaction, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<interaction::Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.patch_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route(
			"/:id/like",
			post_with(like_post, like_post_docs).delete_with(unlike_post, unlike_post_docs),
		)
		.api_route("/:id/comments", post_with(add_comment, add_comment_docs))
		.api_route(
			"/:id/comments/:comment_id",
			delete_with(delete_comment, delete_comment_docs),
		)
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn create(app: &TestServer, token: &str, content: &str) -> Value {
		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(token))
			.json(&json!({ "content": content }))
			.await;

		assert_eq!(response.status_code(), 201);
		response.json::<Value>()["data"]["post"].clone()
	}

	#[tokio::test]
	async fn test_create_post() {
		let app = app();
		let token = register(&app, "alice").await;

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({
				"content": "  hello  ",
				"tags": "rust, axum, rust",
				"media": [{ "content_type": "image/png", "locator": "uploads/a.png" }],
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		let body = response.json::<Value>();

		assert_eq!(body["status"], "success");
		assert_eq!(body["data"]["post"]["content"], "hello");
		assert_eq!(body["data"]["post"]["tags"], json!(["rust", "axum"]));
		assert_eq!(body["data"]["post"]["media"][0]["type"], "image");
		assert_eq!(body["data"]["post"]["likes"], json!([]));
		assert_eq!(body["data"]["post"]["comments"], json!([]));
	}

	#[tokio::test]
	async fn test_create_post_requires_session() {
		let app = app();

		let response = app
			.post("/posts")
			.json(&json!({ "content": "hello" }))
			.await;

		assert_eq!(response.status_code(), 401);
		assert_eq!(response.json::<Value>()["status"], "error");
	}

	#[tokio::test]
	async fn test_create_post_rejects_blank_content() {
		let app = app();
		let token = register(&app, "alice").await;

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "content": "   " }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["message"], "Content is required");
	}

	#[tokio::test]
	async fn test_list_posts_paginates() {
		let app = app();
		let token = register(&app, "alice").await;

		for i in 0..25 {
			create(&app, &token, &format!("post {i}")).await;
		}

		let response = app.get("/posts").add_query_param("page", 3).await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 5);
		assert_eq!(
			body["data"]["pagination"],
			json!({ "total": 25, "page": 3, "limit": 10, "pages": 3 })
		);
		assert_eq!(body["data"]["posts"][4]["content"], "post 0");
		assert_eq!(body["data"]["posts"][0]["author"]["username"], "alice");
	}

	#[tokio::test]
	async fn test_list_posts_rejects_bad_limit() {
		let app = app();

		let response = app.get("/posts").add_query_param("limit", 0).await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["message"],
			"Limit must be between 1 and 100"
		);
	}

	#[tokio::test]
	async fn test_list_posts_past_the_end() {
		let app = app();
		let token = register(&app, "alice").await;

		for i in 0..3 {
			create(&app, &token, &format!("post {i}")).await;
		}

		let response = app.get("/posts").add_query_param("page", 101).await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["data"]["posts"], json!([]));
		assert_eq!(
			body["data"]["pagination"],
			json!({ "total": 3, "page": 101, "limit": 10, "pages": 1 })
		);
	}

	#[tokio::test]
	async fn test_like_twice() {
		let app = app();
		let token = register(&app, "alice").await;
		let post = create(&app, &token, "hello").await;
		let path = format!("/posts/{}/like", post["id"].as_str().unwrap());

		let response = app.post(&path).add_header(AUTHORIZATION, bearer(&token)).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<Value>()["data"]["post"]["likes"]
				.as_array()
				.unwrap()
				.len(),
			1
		);

		let response = app.post(&path).add_header(AUTHORIZATION, bearer(&token)).await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["message"],
			"You have already liked this post"
		);

		let response = app
			.delete(&path)
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.delete(&path)
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["message"], "You have not liked this post");
	}

	#[tokio::test]
	async fn test_like_unknown_post() {
		let app = app();
		let token = register(&app, "alice").await;

		let response = app
			.post(&format!("/posts/{}/like", uuid::Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["message"], "Post not found");
	}

	#[tokio::test]
	async fn test_comment_too_long() {
		let app = app();
		let token = register(&app, "alice").await;
		let post = create(&app, &token, "hello").await;

		let response = app
			.post(&format!("/posts/{}/comments", post["id"].as_str().unwrap()))
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "content": "a".repeat(501) }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["status"], "error");
	}

	#[tokio::test]
	async fn test_comment_and_details() {
		let app = app();
		let alice = register(&app, "alice").await;
		let bob = register(&app, "bob").await;
		let post = create(&app, &alice, "hello").await;
		let id = post["id"].as_str().unwrap();

		let response = app
			.post(&format!("/posts/{id}/comments"))
			.add_header(AUTHORIZATION, bearer(&bob))
			.json(&json!({ "content": "nice" }))
			.await;

		assert_eq!(response.status_code(), 201);
		assert_eq!(
			response.json::<Value>()["data"]["comment"]["author"]["username"],
			"bob"
		);

		let response = app.get(&format!("/posts/{id}")).await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["data"]["post"]["comments"][0]["content"], "nice");
		assert_eq!(body["data"]["post"]["comments"][0]["author"]["name"], "bob");
	}

	#[tokio::test]
	async fn test_delete_comment_of_someone_else() {
		let app = app();
		let alice = register(&app, "alice").await;
		let bob = register(&app, "bob").await;
		let post = create(&app, &alice, "hello").await;
		let id = post["id"].as_str().unwrap();

		let response = app
			.post(&format!("/posts/{id}/comments"))
			.add_header(AUTHORIZATION, bearer(&bob))
			.json(&json!({ "content": "nice" }))
			.await;
		let comment = response.json::<Value>()["data"]["comment"]["id"].clone();
		let path = format!("/posts/{id}/comments/{}", comment.as_str().unwrap());

		let response = app
			.delete(&path)
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app.delete(&path).add_header(AUTHORIZATION, bearer(&bob)).await;

		assert_eq!(response.status_code(), 204);

		let response = app.get(&format!("/posts/{id}")).await;

		assert_eq!(response.json::<Value>()["data"]["post"]["comments"], json!([]));
	}

	#[tokio::test]
	async fn test_update_post() {
		let app = app();
		let alice = register(&app, "alice").await;
		let bob = register(&app, "bob").await;
		let post = create(&app, &alice, "hello").await;
		let path = format!("/posts/{}", post["id"].as_str().unwrap());

		let response = app
			.patch(&path)
			.add_header(AUTHORIZATION, bearer(&bob))
			.json(&json!({ "content": "mine now" }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.patch(&path)
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "content": "edited", "tags": ["news"] }))
			.await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["data"]["post"]["content"], "edited");
		assert_eq!(body["data"]["post"]["tags"], json!(["news"]));
	}

	#[tokio::test]
	async fn test_delete_post_cascades() {
		let app = app();
		let alice = register(&app, "alice").await;
		let post = create(&app, &alice, "hello").await;
		let id = post["id"].as_str().unwrap();

		app.post(&format!("/posts/{id}/comments"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "content": "first" }))
			.await;

		let response = app
			.delete(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		assert_eq!(response.status_code(), 204);

		let response = app.get(&format!("/posts/{id}")).await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.delete(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		assert_eq!(response.status_code(), 404);
	}
}
