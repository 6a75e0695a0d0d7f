mod comment;
mod post;
mod user;

pub use comment::{Comment, CommentView, CreateCommentInput, NewComment};
pub use post::{
	CreatePostInput, Media, MediaInput, MediaKind, NewPost, Post, PostChanges, PostView, Tags,
	UpdatePostInput,
};
pub use user::{NewUser, Profile, ProfileChanges, Session, User};

use serde::{Deserialize, Deserializer};

/// Deserializes a string, trimming surrounding whitespace.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	let value = String::deserialize(deserializer)?;

	Ok(value.trim().to_owned())
}

/// Same as [`trimmed`], for optional fields.
pub fn trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;

	Ok(value.map(|value| value.trim().to_owned()))
}

/// Validates that `content` is non-empty and at most `max` characters long.
fn bounded_content(content: &str, max: usize, label: &str) -> Result<(), validator::ValidationError> {
	let message = if content.is_empty() {
		format!("{label} is required")
	} else if content.chars().count() > max {
		format!("{label} must be less than {max} characters")
	} else {
		return Ok(());
	};

	let mut error = validator::ValidationError::new("length");
	error.message = Some(message.into());

	Err(error)
}
