use uuid::Uuid;

use super::{ActorContext, Engine, Error};
use crate::{model::Post, store::Outcome};

impl Engine {
	/// Adds `actor` to the likes of the post.
	///
	/// The membership check and the append are a single atomic store operation,
	/// so concurrent likes from different actors all land exactly once.
	#[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
	pub async fn like(&self, post: Uuid, actor: ActorContext) -> Result<Post, Error> {
		match self.store.add_like(post, actor.id).await? {
			Outcome::Applied(post) => Ok(post),
			Outcome::Unchanged => Err(Error::AlreadyLiked(post)),
			Outcome::Missing => Err(Error::PostNotFound(post)),
		}
	}

	/// Removes `actor` from the likes of the post.
	#[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
	pub async fn unlike(&self, post: Uuid, actor: ActorContext) -> Result<Post, Error> {
		match self.store.remove_like(post, actor.id).await? {
			Outcome::Applied(post) => Ok(post),
			Outcome::Unchanged => Err(Error::NotLiked(post)),
			Outcome::Missing => Err(Error::PostNotFound(post)),
		}
	}
}
