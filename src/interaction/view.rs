use std::collections::HashMap;

use uuid::Uuid;

use super::{Engine, Error};
use crate::model::{Comment, Post, PostView, Profile};

impl Engine {
	/// Expands authors, likers and comments of the given posts.
	///
	/// Always reads the current state; there is no cache in between. Comments
	/// follow the order of each post's comment references, and references to
	/// comments that no longer exist are skipped.
	pub(super) async fn project(&self, posts: Vec<Post>) -> Result<Vec<PostView>, Error> {
		let ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
		let comments = self.store.comments_of(&ids).await?;

		let mut people = posts
			.iter()
			.flat_map(|post| std::iter::once(post.author).chain(post.likes.iter().copied()))
			.chain(comments.iter().map(|comment| comment.author))
			.collect::<Vec<Uuid>>();
		people.sort_unstable();
		people.dedup();

		let profiles = self
			.store
			.profiles(&people)
			.await?
			.into_iter()
			.map(|profile| (profile.id, profile))
			.collect::<HashMap<Uuid, Profile>>();

		let mut comments = comments
			.into_iter()
			.map(|comment| (comment.id, comment))
			.collect::<HashMap<Uuid, Comment>>();

		Ok(posts
			.into_iter()
			.map(|post| PostView {
				comments: post
					.comments
					.iter()
					.filter_map(|id| comments.remove(id))
					.map(|comment| {
						let author = profiles.get(&comment.author).cloned();
						comment.into_view(author)
					})
					.collect(),
				likes: post
					.likes
					.iter()
					.filter_map(|id| profiles.get(id).cloned())
					.collect(),
				author: profiles.get(&post.author).cloned(),
				id: post.id,
				content: post.content,
				media: post.media,
				tags: post.tags,
				created_at: post.created_at,
				updated_at: post.updated_at,
			})
			.collect())
	}
}
