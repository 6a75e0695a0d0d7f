use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::Profile;

pub const MAX_CONTENT: usize = 500;

/// A single comment, bound to one post and one author.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub content: String,
	#[sqlx(rename = "author_id")]
	pub author: Uuid,
	/// The post this comment belongs to.
	#[sqlx(rename = "post_id")]
	pub post: Uuid,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Comment {
	/// Expands the author reference with the given profile.
	pub fn into_view(self, author: Option<Profile>) -> CommentView {
		CommentView {
			id: self.id,
			content: self.content,
			author,
			post: self.post,
			created_at: self.created_at,
			updated_at: self.updated_at,
		}
	}
}

/// A comment with its author expanded to display attributes.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CommentView {
	pub id: Uuid,
	pub content: String,
	pub author: Option<Profile>,
	pub post: Uuid,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn validate_comment_content(content: &str) -> Result<(), ValidationError> {
	super::bounded_content(content, MAX_CONTENT, "Comment content")
}

#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct CreateCommentInput {
	/// The text content of the comment.
	#[serde(deserialize_with = "super::trimmed")]
	#[schemars(with = "String")]
	#[validate(custom(function = "validate_comment_content"))]
	pub content: String,
}

impl CreateCommentInput {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
		}
	}

	pub fn normalized(mut self) -> Self {
		self.content = self.content.trim().to_owned();
		self
	}
}

/// A validated comment that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewComment {
	pub id: Uuid,
	pub post: Uuid,
	pub author: Uuid,
	pub content: String,
}
