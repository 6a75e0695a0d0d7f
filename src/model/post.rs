use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{CommentView, Profile};

/// The maximum number of media attachments on a single post.
pub const MAX_MEDIA: u64 = 5;
pub const MAX_CONTENT: usize = 1000;

/// The kind of an attached media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
	Image,
	Video,
}

impl MediaKind {
	/// Derives the kind from a MIME content type such as `image/png`.
	pub fn from_content_type(content_type: &str) -> Option<Self> {
		let (top, sub) = content_type.split_once('/')?;

		if sub.is_empty() {
			return None;
		}

		match top.trim().to_ascii_lowercase().as_str() {
			"image" => Some(Self::Image),
			"video" => Some(Self::Video),
			_ => None,
		}
	}
}

/// A media attachment, stored alongside the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Media {
	#[serde(rename = "type")]
	pub kind: MediaKind,
	/// Where the uploaded file can be fetched from.
	#[serde(rename = "url")]
	pub locator: String,
}

/// A single post, created by a user.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The text content of the post.
	pub content: String,
	/// Attached images and videos, in upload order.
	pub media: Vec<Media>,
	/// The user that created the post.
	pub author: Uuid,
	pub tags: Vec<String>,
	/// Users that liked the post. Never contains duplicates.
	pub likes: Vec<Uuid>,
	/// Comments on the post, oldest first.
	pub comments: Vec<Uuid>,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A post with its author, likers and comments expanded to display attributes.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PostView {
	pub id: Uuid,
	pub content: String,
	pub media: Vec<Media>,
	/// The author, or `null` if the account no longer exists.
	pub author: Option<Profile>,
	pub tags: Vec<String>,
	pub likes: Vec<Profile>,
	pub comments: Vec<CommentView>,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A media descriptor handed over by the upload layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct MediaInput {
	/// The MIME type of the uploaded file.
	#[validate(custom(function = "validate_content_type"))]
	pub content_type: String,
	/// Where the uploaded file can be fetched from.
	#[validate(length(min = 1, max = 2048))]
	pub locator: String,
}

fn validate_content_type(content_type: &str) -> Result<(), ValidationError> {
	if MediaKind::from_content_type(content_type).is_some() {
		return Ok(());
	}

	let mut error = ValidationError::new("content_type");
	error.message = Some("Only image and video files are allowed".into());

	Err(error)
}

impl MediaInput {
	/// Converts into a stored [`Media`], failing if the kind cannot be derived.
	pub fn into_media(self) -> Option<Media> {
		Some(Media {
			kind: MediaKind::from_content_type(&self.content_type)?,
			locator: self.locator,
		})
	}
}

/// Tags, either as a comma-separated string or as a list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Tags {
	Csv(String),
	List(Vec<String>),
}

impl Tags {
	/// Trims every tag, dropping empty and repeated ones.
	pub fn normalize(self) -> Vec<String> {
		let raw: Vec<String> = match self {
			Self::Csv(csv) => csv.split(',').map(str::to_owned).collect(),
			Self::List(list) => list,
		};

		let mut tags: Vec<String> = Vec::with_capacity(raw.len());

		for tag in raw {
			let tag = tag.trim();

			if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
				tags.push(tag.to_owned());
			}
		}

		tags
	}
}

fn validate_post_content(content: &str) -> Result<(), ValidationError> {
	super::bounded_content(content, MAX_CONTENT, "Content")
}

#[derive(Debug, Clone, Deserialize, Validate, JsonSchema)]
pub struct CreatePostInput {
	/// The text content of the post.
	#[serde(deserialize_with = "super::trimmed")]
	#[schemars(with = "String")]
	#[validate(custom(function = "validate_post_content"))]
	pub content: String,
	/// Attached media, as reported by the upload layer.
	#[serde(default)]
	#[validate(
		length(max = "MAX_MEDIA", message = "A post can have at most 5 media files"),
		nested
	)]
	pub media: Vec<MediaInput>,
	#[serde(default)]
	pub tags: Option<Tags>,
}

impl CreatePostInput {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			media: Vec::new(),
			tags: None,
		}
	}

	/// Trims the content. Deserialization already does this, but the
	/// input may also be constructed directly.
	pub fn normalized(mut self) -> Self {
		self.content = self.content.trim().to_owned();
		self
	}
}

#[derive(Debug, Clone, Default, Deserialize, Validate, JsonSchema)]
pub struct UpdatePostInput {
	/// The new text content, if it should change.
	#[serde(default, deserialize_with = "super::trimmed_option")]
	#[schemars(with = "Option<String>")]
	#[validate(custom(function = "validate_post_content"))]
	pub content: Option<String>,
	/// The new tags, replacing the existing ones wholesale.
	#[serde(default)]
	pub tags: Option<Tags>,
}

impl UpdatePostInput {
	pub fn normalized(mut self) -> Self {
		self.content = self.content.map(|content| content.trim().to_owned());
		self
	}
}

/// A validated post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
	pub author: Uuid,
	pub content: String,
	pub media: Vec<Media>,
	pub tags: Vec<String>,
}

/// The fields of a post that its author may change. `None` keeps the prior value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
	pub content: Option<String>,
	pub tags: Option<Vec<String>>,
}
