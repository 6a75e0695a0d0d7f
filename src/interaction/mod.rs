//! The rules for creating, changing and interacting with posts.
//!
//! Every operation here is an independent unit of work. Nothing is serialized
//! beyond the per-document atomicity that the [`Store`](crate::store::Store)
//! provides, and nothing is retried: a failed call must be re-issued by the caller.
//!
//! Deleting a post removes its comments first and the post second, and deleting
//! a comment detaches it from its post before removing it. These are separate
//! store calls, so a crash in between can leave orphaned comments or a dangling
//! comment reference behind. That window is accepted and not compensated for.

mod comments;
mod likes;
mod posts;
mod view;

pub use posts::Listing;

use std::borrow::Cow;

use axum::http::StatusCode;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
	error::{self, ErrorShape},
	store::{self, SharedStore},
};

/// The authenticated identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
	pub id: Uuid,
}

impl ActorContext {
	pub fn new(id: Uuid) -> Self {
		Self { id }
	}
}

/// Enforces the invariants that span posts, likes and comments.
///
/// Constructed once at startup and shared between requests.
#[derive(Clone)]
pub struct Engine {
	store: SharedStore,
}

impl Engine {
	pub fn new(store: SharedStore) -> Self {
		Self { store }
	}
}

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The input was malformed or out of bounds.
	Validation,
	/// A referenced entity does not exist.
	NotFound,
	/// The entity does not exist or is not owned by the actor. The two are
	/// deliberately indistinguishable to callers.
	NotFoundOrForbidden,
	/// The request contradicts the current state.
	Conflict,
	/// The store failed.
	Unexpected,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] ValidationErrors),
	#[error("unknown post {0}")]
	PostNotFound(Uuid),
	#[error("unknown or foreign post {0}")]
	PostNotFoundOrForbidden(Uuid),
	#[error("unknown or foreign comment {0}")]
	CommentNotFoundOrForbidden(Uuid),
	#[error("post {0} is already liked")]
	AlreadyLiked(Uuid),
	#[error("post {0} is not liked")]
	NotLiked(Uuid),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Validation(..) => ErrorKind::Validation,
			Self::PostNotFound(..) => ErrorKind::NotFound,
			Self::PostNotFoundOrForbidden(..) | Self::CommentNotFoundOrForbidden(..) => {
				ErrorKind::NotFoundOrForbidden
			}
			Self::AlreadyLiked(..) | Self::NotLiked(..) => ErrorKind::Conflict,
			Self::Store(..) => ErrorKind::Unexpected,
		}
	}
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self.kind() {
			ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
			ErrorKind::NotFound | ErrorKind::NotFoundOrForbidden => StatusCode::NOT_FOUND,
			ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> Cow<'static, str> {
		match self {
			Self::Validation(errors) => error::describe(errors).into(),
			Self::PostNotFound(..) => "Post not found".into(),
			Self::PostNotFoundOrForbidden(..) => {
				"Post not found or you are not authorized to modify it".into()
			}
			Self::CommentNotFoundOrForbidden(..) => {
				"Comment not found or you are not authorized to delete it".into()
			}
			Self::AlreadyLiked(..) => "You have already liked this post".into(),
			Self::NotLiked(..) => "You have not liked this post".into(),
			Self::Store(error) => error::unexpected(error),
		}
	}
}

#[cfg(test)]
pub(crate) mod test {
	use std::sync::Arc;

	use uuid::Uuid;

	use super::{ActorContext, Engine};
	use crate::{
		model::{CreatePostInput, NewUser, Post},
		store::{MemoryStore, SharedStore},
	};

	pub async fn engine() -> (Engine, SharedStore) {
		let store: SharedStore = Arc::new(MemoryStore::new());

		(Engine::new(Arc::clone(&store)), store)
	}

	/// Registers a user with the given handle and returns its actor context.
	pub async fn actor(store: &SharedStore, username: &str) -> ActorContext {
		let user = store
			.insert_user(NewUser {
				id: Uuid::new_v4(),
				email: format!("{username}@example.com"),
				password: Vec::new(),
				name: username.to_uppercase(),
				username: username.into(),
			})
			.await
			.unwrap();

		ActorContext::new(user.id)
	}

	pub async fn post(engine: &Engine, author: ActorContext, content: &str) -> Post {
		engine
			.create_post(author, CreatePostInput::new(content))
			.await
			.unwrap()
	}
}
