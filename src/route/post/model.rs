pub use crate::{
	interaction::Listing,
	model::{CommentView, CreateCommentInput, CreatePostInput, Post, PostView, UpdatePostInput},
	route::model::{IdInput, Paginate},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A post as stored, with likes and comments as plain ids.
#[derive(Serialize, JsonSchema)]
pub struct PostData {
	pub post: Post,
}

/// A post with its author, likers and comments expanded.
#[derive(Serialize, JsonSchema)]
pub struct PostDetailsData {
	pub post: PostView,
}

#[derive(Serialize, JsonSchema)]
pub struct CommentData {
	pub comment: CommentView,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CommentIdInput {
	/// The post the comment belongs to.
	pub id: Uuid,
	pub comment_id: Uuid,
}
