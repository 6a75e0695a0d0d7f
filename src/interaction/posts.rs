use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{ActorContext, Engine, Error};
use crate::model::{CreatePostInput, NewPost, Post, PostChanges, PostView, UpdatePostInput};

/// The position of a page within the full listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Pagination {
	/// The total number of posts.
	pub total: i64,
	pub page: i64,
	pub limit: i64,
	/// The total number of pages, `ceil(total / limit)`.
	pub pages: i64,
}

impl Pagination {
	pub fn new(total: i64, page: i64, limit: i64) -> Self {
		let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };

		Self {
			total,
			page,
			limit,
			pages,
		}
	}
}

/// A page of posts, newest first.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Listing {
	pub posts: Vec<PostView>,
	pub pagination: Pagination,
}

impl Engine {
	/// Creates a post authored by `actor`.
	#[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
	pub async fn create_post(
		&self,
		actor: ActorContext,
		input: CreatePostInput,
	) -> Result<Post, Error> {
		let input = input.normalized();
		input.validate()?;

		let media = input
			.media
			.into_iter()
			.map(|media| media.into_media())
			.collect::<Option<Vec<_>>>()
			.ok_or_else(|| {
				let mut errors = ValidationErrors::new();
				errors.add("media", ValidationError::new("content_type"));
				errors
			})?;

		let post = self
			.store
			.insert_post(NewPost {
				author: actor.id,
				content: input.content,
				media,
				tags: input.tags.map(|tags| tags.normalize()).unwrap_or_default(),
			})
			.await?;

		tracing::info!(post = %post.id, "created post");

		Ok(post)
	}

	/// Returns a page of posts, newest first, with every reference expanded.
	///
	/// `page` is 1-indexed.
	#[tracing::instrument(skip(self))]
	pub async fn list_posts(&self, page: i64, limit: i64) -> Result<Listing, Error> {
		let offset = (page - 1).max(0).saturating_mul(limit);

		let posts = self.store.posts(limit, offset).await?;
		let total = self.store.count_posts().await?;

		Ok(Listing {
			posts: self.project(posts).await?,
			pagination: Pagination::new(total, page, limit),
		})
	}

	/// Returns a single post with its author, comments and likers expanded.
	#[tracing::instrument(skip(self))]
	pub async fn post_details(&self, id: Uuid) -> Result<PostView, Error> {
		let post = self.store.post(id).await?.ok_or(Error::PostNotFound(id))?;

		self.project(vec![post])
			.await?
			.pop()
			.ok_or(Error::PostNotFound(id))
	}

	/// Changes the content and/or tags of a post owned by `actor`.
	#[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
	pub async fn update_post(
		&self,
		id: Uuid,
		actor: ActorContext,
		input: UpdatePostInput,
	) -> Result<Post, Error> {
		let input = input.normalized();
		input.validate()?;

		let changes = PostChanges {
			content: input.content,
			tags: input.tags.map(|tags| tags.normalize()),
		};

		self.store
			.update_post(id, actor.id, changes)
			.await?
			.ok_or(Error::PostNotFoundOrForbidden(id))
	}

	/// Deletes a post owned by `actor` along with all of its comments.
	///
	/// Comments go first, so a failure part way through leaves the post in place
	/// and the call can simply be repeated.
	#[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
	pub async fn delete_post(&self, id: Uuid, actor: ActorContext) -> Result<(), Error> {
		self.store
			.owned_post(id, actor.id)
			.await?
			.ok_or(Error::PostNotFoundOrForbidden(id))?;

		let comments = self.store.delete_comments_of(id).await?;

		if !self.store.delete_post(id).await? {
			tracing::debug!(post = %id, "post was already deleted");
		}

		tracing::info!(post = %id, comments, "deleted post");

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::Pagination;
	use crate::{
		interaction::{
			test::{actor, engine, post as publish},
			Error, ErrorKind,
		},
		model::{CreateCommentInput, CreatePostInput, MediaInput, MediaKind, Tags, UpdatePostInput},
	};

	#[test]
	fn test_pagination_pages() {
		assert_eq!(Pagination::new(25, 1, 10).pages, 3);
		assert_eq!(Pagination::new(20, 1, 10).pages, 2);
		assert_eq!(Pagination::new(0, 1, 10).pages, 0);
	}

	#[tokio::test]
	async fn test_create_post() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;

		let mut input = CreatePostInput::new("  hello  ");
		input.tags = Some(Tags::Csv("rust, web".into()));
		input.media.push(MediaInput {
			content_type: "image/jpeg".into(),
			locator: "/uploads/cat.jpg".into(),
		});

		let post = engine.create_post(ada, input).await.unwrap();

		assert_eq!(post.content, "hello");
		assert_eq!(post.author, ada.id);
		assert_eq!(post.tags, vec!["rust", "web"]);
		assert_eq!(post.media[0].kind, MediaKind::Image);
		assert!(post.likes.is_empty());
		assert!(post.comments.is_empty());
	}

	#[tokio::test]
	async fn test_create_post_rejects_invalid_content() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;

		for content in ["", "   ", "a".repeat(1001).as_str()] {
			let error = engine
				.create_post(ada, CreatePostInput::new(content))
				.await
				.unwrap_err();

			assert_eq!(error.kind(), ErrorKind::Validation);
		}

		assert_eq!(engine.list_posts(1, 10).await.unwrap().pagination.total, 0);
	}

	#[tokio::test]
	async fn test_list_posts_paginates() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;

		for i in 0..25 {
			publish(&engine, ada, &format!("post {i}")).await;
		}

		let first = engine.list_posts(1, 10).await.unwrap();

		assert_eq!(first.posts.len(), 10);
		assert_eq!(first.posts[0].content, "post 24");
		assert_eq!(first.pagination.total, 25);
		assert_eq!(first.pagination.pages, 3);

		let last = engine.list_posts(3, 10).await.unwrap();

		assert_eq!(last.posts.len(), 5);
		assert_eq!(last.posts[4].content, "post 0");
	}

	#[tokio::test]
	async fn test_update_post_keeps_omitted_fields() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;

		let mut input = CreatePostInput::new("hello");
		input.tags = Some(Tags::List(vec!["a".into()]));
		let post = engine.create_post(ada, input).await.unwrap();

		let updated = engine
			.update_post(
				post.id,
				ada,
				UpdatePostInput {
					content: Some("goodbye".into()),
					tags: None,
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.content, "goodbye");
		assert_eq!(updated.tags, vec!["a"]);

		let updated = engine
			.update_post(
				post.id,
				ada,
				UpdatePostInput {
					content: None,
					tags: Some(Tags::Csv("b, c".into())),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.content, "goodbye");
		assert_eq!(updated.tags, vec!["b", "c"]);
	}

	#[tokio::test]
	async fn test_update_post_hides_existence_from_others() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;
		let bob = actor(&store, "bob").await;
		let post = publish(&engine, ada, "hello").await;

		let foreign = engine
			.update_post(post.id, bob, UpdatePostInput::default())
			.await
			.unwrap_err();
		let missing = engine
			.update_post(Uuid::new_v4(), bob, UpdatePostInput::default())
			.await
			.unwrap_err();

		assert!(matches!(foreign, Error::PostNotFoundOrForbidden(..)));
		assert_eq!(foreign.kind(), missing.kind());
		assert_eq!(
			engine.post_details(post.id).await.unwrap().content,
			"hello"
		);
	}

	#[tokio::test]
	async fn test_delete_post_cascades_to_comments() {
		let (engine, store) = engine().await;
		let ada = actor(&store, "ada").await;
		let bob = actor(&store, "bob").await;
		let post = publish(&engine, ada, "hello").await;
		let other = publish(&engine, ada, "other").await;

		for i in 0..3 {
			engine
				.add_comment(post.id, bob, CreateCommentInput::new(format!("comment {i}")))
				.await
				.unwrap();
		}
		engine
			.add_comment(other.id, bob, CreateCommentInput::new("stays"))
			.await
			.unwrap();

		assert!(matches!(
			engine.delete_post(post.id, bob).await,
			Err(Error::PostNotFoundOrForbidden(..))
		));

		engine.delete_post(post.id, ada).await.unwrap();

		assert!(store.comments_of(&[post.id]).await.unwrap().is_empty());
		assert_eq!(store.comments_of(&[other.id]).await.unwrap().len(), 1);
		assert!(matches!(
			engine.post_details(post.id).await,
			Err(Error::PostNotFound(..))
		));
	}
}
