use uuid::Uuid;
use validator::Validate;

use super::{ActorContext, Engine, Error};
use crate::model::{CommentView, CreateCommentInput, NewComment};

impl Engine {
	/// Comments on a post as `actor`, returning the comment with its author expanded.
	#[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
	pub async fn add_comment(
		&self,
		post: Uuid,
		actor: ActorContext,
		input: CreateCommentInput,
	) -> Result<CommentView, Error> {
		let input = input.normalized();
		input.validate()?;

		let comment = self
			.store
			.insert_comment(NewComment {
				id: Uuid::new_v4(),
				post,
				author: actor.id,
				content: input.content,
			})
			.await?
			.ok_or(Error::PostNotFound(post))?;

		tracing::info!(comment = %comment.id, "added comment");

		let author = self.store.profiles(&[actor.id]).await?.pop();

		Ok(comment.into_view(author))
	}

	/// Deletes a comment written by `actor` and detaches it from its post.
	///
	/// Detaching is idempotent, so repeating the call after a partial failure
	/// converges on the same state.
	#[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
	pub async fn delete_comment(&self, id: Uuid, actor: ActorContext) -> Result<(), Error> {
		let comment = self
			.store
			.owned_comment(id, actor.id)
			.await?
			.ok_or(Error::CommentNotFoundOrForbidden(id))?;

		self.store.detach_comment(comment.post, id).await?;
		self.store.delete_comment(id).await?;

		tracing::info!(comment = %id, post = %comment.post, "deleted comment");

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use crate::{
		interaction::{
			test::{actor, engine, post},
			Error, ErrorKind,
		},
		model::CreateCommentInput,
	};

	#[tokio::test]
	async fn test_add_comment_expands_author() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;
		let bob = actor(&store, "bob").await;
		let post = post(&engine, ada, "hello").await;

		let comment = engine
			.add_comment(post.id, bob, CreateCommentInput::new("  nice  "))
			.await
			.unwrap();

		assert_eq!(comment.content, "nice");
		assert_eq!(comment.post, post.id);
		assert_eq!(comment.author.unwrap().username, "bob");

		let post = store.post(post.id).await.unwrap().unwrap();
		assert_eq!(post.comments, vec![comment.id]);
	}

	#[tokio::test]
	async fn test_add_comment_rejects_long_content() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;
		let post = post(&engine, ada, "hello").await;

		let error = engine
			.add_comment(post.id, ada, CreateCommentInput::new("a".repeat(501)))
			.await
			.unwrap_err();

		assert_eq!(error.kind(), ErrorKind::Validation);
		assert!(store.comments_of(&[post.id]).await.unwrap().is_empty());
		assert!(store.post(post.id).await.unwrap().unwrap().comments.is_empty());
	}

	#[tokio::test]
	async fn test_add_comment_to_unknown_post() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;

		assert!(matches!(
			engine
				.add_comment(Uuid::new_v4(), ada, CreateCommentInput::new("hello"))
				.await,
			Err(Error::PostNotFound(..))
		));
	}

	#[tokio::test]
	async fn test_delete_comment_detaches_from_post() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;
		let bob = actor(&store, "bob").await;
		let post = post(&engine, ada, "hello").await;

		let first = engine
			.add_comment(post.id, bob, CreateCommentInput::new("first"))
			.await
			.unwrap();
		let second = engine
			.add_comment(post.id, ada, CreateCommentInput::new("second"))
			.await
			.unwrap();

		// Only the author may delete, not even the post's owner.
		assert!(matches!(
			engine.delete_comment(first.id, ada).await,
			Err(Error::CommentNotFoundOrForbidden(..))
		));

		engine.delete_comment(first.id, bob).await.unwrap();

		assert!(store.comment(first.id).await.unwrap().is_none());

		let details = engine.post_details(post.id).await.unwrap();
		assert_eq!(details.comments.len(), 1);
		assert_eq!(details.comments[0].id, second.id);
		assert_eq!(
			store.post(post.id).await.unwrap().unwrap().comments,
			vec![second.id]
		);

		assert!(matches!(
			engine.delete_comment(first.id, bob).await,
			Err(Error::CommentNotFoundOrForbidden(..))
		));
	}
}
