//! Persistence for users, posts and comments.
//!
//! Every method is a single unit of work against the backing store. Methods that
//! check and mutate a document (likes, comment attachment) do so atomically, so
//! concurrent callers never observe or produce a lost update.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{
	Comment, NewComment, NewPost, NewUser, Post, PostChanges, Profile, ProfileChanges, Session,
	User,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A shared handle to the store, constructed once at startup.
pub type SharedStore = Arc<dyn Store>;

/// A field with a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unique {
	Email,
	Username,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("duplicate value for {0:?}")]
	Duplicate(Unique),
}

/// The result of a conditional mutation on a single document.
#[derive(Debug)]
pub enum Outcome<T> {
	/// The condition held and the mutation was applied.
	Applied(T),
	/// The document exists, but the condition did not hold. Nothing changed.
	Unchanged,
	/// The document does not exist.
	Missing,
}

#[axum::async_trait]
pub trait IdentityStore: Send + Sync {
	/// Stores a new user, failing with [`Error::Duplicate`] if the email or username is taken.
	async fn insert_user(&self, user: NewUser) -> Result<User>;
	async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
	/// Applies `changes` to the user, failing with [`Error::Duplicate`] if the new
	/// username is taken. Returns `None` if the user does not exist.
	async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>>;
	async fn insert_session(&self, user_id: Uuid) -> Result<Session>;
	/// Returns the user that owns the session, if it exists.
	async fn session_user(&self, session_id: Uuid) -> Result<Option<User>>;
	async fn delete_session(&self, session_id: Uuid) -> Result<()>;
	/// Returns the display attributes of every existing user in `ids`, in no particular order.
	async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>>;
}

#[axum::async_trait]
pub trait PostStore: Send + Sync {
	async fn insert_post(&self, post: NewPost) -> Result<Post>;
	async fn post(&self, id: Uuid) -> Result<Option<Post>>;
	/// Returns the post only if `author` created it.
	async fn owned_post(&self, id: Uuid, author: Uuid) -> Result<Option<Post>>;
	/// Returns a page of posts, newest first.
	async fn posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;
	async fn count_posts(&self) -> Result<i64>;
	/// Applies `changes` if the post exists and `author` created it.
	async fn update_post(&self, id: Uuid, author: Uuid, changes: PostChanges)
		-> Result<Option<Post>>;
	/// Deletes the post record only. Comments are not touched.
	async fn delete_post(&self, id: Uuid) -> Result<bool>;
	/// Appends `user` to the likes of the post unless already present.
	async fn add_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>>;
	/// Removes every occurrence of `user` from the likes of the post if present.
	async fn remove_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>>;
}

#[axum::async_trait]
pub trait CommentStore: Send + Sync {
	/// Stores the comment and appends it to its post, both or neither.
	///
	/// Returns `None` if the post does not exist.
	async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>>;
	async fn comment(&self, id: Uuid) -> Result<Option<Comment>>;
	/// Returns the comment only if `author` wrote it.
	async fn owned_comment(&self, id: Uuid, author: Uuid) -> Result<Option<Comment>>;
	/// Returns every comment on the given posts, oldest first.
	async fn comments_of(&self, posts: &[Uuid]) -> Result<Vec<Comment>>;
	/// Removes the comment reference from the post. Idempotent.
	async fn detach_comment(&self, post: Uuid, comment: Uuid) -> Result<()>;
	async fn delete_comment(&self, id: Uuid) -> Result<bool>;
	/// Deletes every comment on the post, returning how many were removed.
	async fn delete_comments_of(&self, post: Uuid) -> Result<u64>;
}

/// Everything the application needs from persistence.
pub trait Store: IdentityStore + PostStore + CommentStore {}

impl<T> Store for T where T: IdentityStore + PostStore + CommentStore {}
