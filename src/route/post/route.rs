use axum::extract::State;
use macros::route;

use crate::{
	extract::{Actor, Created, Json, NoContent, Path, Query},
	interaction::Engine,
	openapi::tag,
	route::model::Envelope,
};

use super::{model, RouteError};

/// Get all posts
/// Returns a page of posts, newest first, with authors, likes and comments expanded.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(engine): State<Engine>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Envelope<model::Listing>>, RouteError> {
	let listing = engine.list_posts(paginate.page, paginate.limit).await?;

	Ok(Json(Envelope::success(listing)))
}

/// Get single post
/// Returns a single post by its unique id, with authors, likes and comments expanded.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(engine): State<Engine>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<Envelope<model::PostDetailsData>>, RouteError> {
	let post = engine.post_details(path.id).await?;

	Ok(Json(Envelope::success(model::PostDetailsData { post })))
}

/// Create post
/// Creates a new post authored by the caller.
#[route(tag = tag::POST, response(status = 201, description = "Created the post.", shape = "Created<Envelope<model::PostData>>"))]
pub async fn create_post(
	State(engine): State<Engine>,
	actor: Actor,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Created<Envelope<model::PostData>>, RouteError> {
	let post = engine.create_post(actor.context(), input).await?;

	Ok(Created(Envelope::success(model::PostData { post })))
}

/// Update post
/// Changes the content and tags of a post owned by the caller.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<Envelope<model::PostData>>, RouteError> {
	let post = engine.update_post(path.id, actor.context(), input).await?;

	Ok(Json(Envelope::success(model::PostData { post })))
}

/// Delete post
/// Deletes a post owned by the caller, along with all of its comments.
#[route(tag = tag::POST, response(status = 204, description = "Deleted the post."))]
pub async fn delete_post(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::IdInput>,
) -> Result<NoContent, RouteError> {
	engine.delete_post(path.id, actor.context()).await?;

	Ok(NoContent)
}

/// Like post
/// Adds the caller to the likes of a post. Liking a post twice is rejected.
#[route(tag = tag::POST)]
pub async fn like_post(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::IdInput>,
) -> Result<Json<Envelope<model::PostData>>, RouteError> {
	let post = engine.like(path.id, actor.context()).await?;

	Ok(Json(Envelope::success(model::PostData { post })))
}

/// Unlike post
/// Removes the caller from the likes of a post. Unliking a post that was not liked is rejected.
#[route(tag = tag::POST)]
pub async fn unlike_post(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::IdInput>,
) -> Result<Json<Envelope<model::PostData>>, RouteError> {
	let post = engine.unlike(path.id, actor.context()).await?;

	Ok(Json(Envelope::success(model::PostData { post })))
}

/// Comment on post
/// Adds a comment by the caller to a post.
#[route(tag = tag::POST, response(status = 201, description = "Created the comment.", shape = "Created<Envelope<model::CommentData>>"))]
pub async fn add_comment(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Created<Envelope<model::CommentData>>, RouteError> {
	let comment = engine.add_comment(path.id, actor.context(), input).await?;

	Ok(Created(Envelope::success(model::CommentData { comment })))
}

/// Delete comment
/// Deletes a comment written by the caller. The comment is located by its own id.
#[route(tag = tag::POST, response(status = 204, description = "Deleted the comment."))]
pub async fn delete_comment(
	State(engine): State<Engine>,
	actor: Actor,
	Path(path): Path<model::CommentIdInput>,
) -> Result<NoContent, RouteError> {
	engine
		.delete_comment(path.comment_id, actor.context())
		.await?;

	Ok(NoContent)
}
