use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{CommentStore, Error, IdentityStore, Outcome, PostStore, Result, Unique};
use crate::model::{
	Comment, NewComment, NewPost, NewUser, Post, PostChanges, Profile, ProfileChanges, Session,
	User,
};

/// A value along with its insertion sequence number, used as a tiebreaker
/// when ordering by timestamps that may collide.
struct Stored<T> {
	seq: u64,
	value: T,
}

/// A [`Store`](super::Store) kept entirely in process memory.
///
/// Each document lives in its own map entry, and conditional mutations hold
/// the entry lock for the whole check-and-mutate, which mirrors the per-document
/// atomicity of a database.
#[derive(Default)]
pub struct MemoryStore {
	seq: AtomicU64,
	users: DashMap<Uuid, User>,
	emails: DashMap<String, Uuid>,
	usernames: DashMap<String, Uuid>,
	sessions: DashMap<Uuid, Session>,
	posts: DashMap<Uuid, Stored<Post>>,
	comments: DashMap<Uuid, Stored<Comment>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn next_seq(&self) -> u64 {
		self.seq.fetch_add(1, Ordering::Relaxed)
	}

	/// Applies `mutate` to the post under its entry lock. `mutate` returns
	/// `false` if its condition does not hold, in which case nothing changes.
	fn mutate_post<F>(&self, id: Uuid, mutate: F) -> Outcome<Post>
	where
		F: FnOnce(&mut Post) -> bool,
	{
		let Some(mut stored) = self.posts.get_mut(&id) else {
			return Outcome::Missing;
		};

		if !mutate(&mut stored.value) {
			return Outcome::Unchanged;
		}

		stored.value.updated_at = Utc::now();
		Outcome::Applied(stored.value.clone())
	}
}

#[axum::async_trait]
impl IdentityStore for MemoryStore {
	async fn insert_user(&self, user: NewUser) -> Result<User> {
		match self.emails.entry(user.email.clone()) {
			Entry::Occupied(..) => return Err(Error::Duplicate(Unique::Email)),
			Entry::Vacant(entry) => {
				entry.insert(user.id);
			}
		}

		match self.usernames.entry(user.username.clone()) {
			Entry::Occupied(..) => {
				self.emails.remove(&user.email);
				return Err(Error::Duplicate(Unique::Username));
			}
			Entry::Vacant(entry) => {
				entry.insert(user.id);
			}
		}

		let user = User {
			id: user.id,
			email: user.email,
			password: user.password,
			name: user.name,
			username: user.username,
			bio: None,
			location: None,
			avatar: None,
			cover_image: None,
			created_at: Utc::now(),
		};

		self.users.insert(user.id, user.clone());

		Ok(user)
	}

	async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
		let user = self
			.emails
			.get(email)
			.and_then(|id| self.users.get(&*id).map(|user| user.clone()));

		Ok(user)
	}

	async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
		let Some(mut user) = self.users.get_mut(&id) else {
			return Ok(None);
		};

		if let Some(username) = changes.username.filter(|username| *username != user.username) {
			let claimed = match self.usernames.entry(username.clone()) {
				Entry::Occupied(..) => false,
				Entry::Vacant(entry) => {
					entry.insert(id);
					true
				}
			};

			if !claimed {
				return Err(Error::Duplicate(Unique::Username));
			}

			self.usernames.remove(&user.username);
			user.username = username;
		}

		if let Some(name) = changes.name {
			user.name = name;
		}
		if let Some(bio) = changes.bio {
			user.bio = Some(bio);
		}
		if let Some(location) = changes.location {
			user.location = Some(location);
		}
		if let Some(avatar) = changes.avatar {
			user.avatar = Some(avatar);
		}
		if let Some(cover_image) = changes.cover_image {
			user.cover_image = Some(cover_image);
		}

		Ok(Some(user.clone()))
	}

	async fn insert_session(&self, user_id: Uuid) -> Result<Session> {
		let session = Session {
			id: Uuid::new_v4(),
			user_id,
			created_at: Utc::now(),
		};

		self.sessions.insert(session.id, session.clone());

		Ok(session)
	}

	async fn session_user(&self, session_id: Uuid) -> Result<Option<User>> {
		let Some(user_id) = self.sessions.get(&session_id).map(|session| session.user_id) else {
			return Ok(None);
		};

		Ok(self.users.get(&user_id).map(|user| user.clone()))
	}

	async fn delete_session(&self, session_id: Uuid) -> Result<()> {
		self.sessions.remove(&session_id);

		Ok(())
	}

	async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
		Ok(ids
			.iter()
			.filter_map(|id| self.users.get(id).map(|user| user.profile()))
			.collect())
	}
}

#[axum::async_trait]
impl PostStore for MemoryStore {
	async fn insert_post(&self, post: NewPost) -> Result<Post> {
		let now = Utc::now();
		let post = Post {
			id: Uuid::new_v4(),
			content: post.content,
			media: post.media,
			author: post.author,
			tags: post.tags,
			likes: Vec::new(),
			comments: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		self.posts.insert(
			post.id,
			Stored {
				seq: self.next_seq(),
				value: post.clone(),
			},
		);

		Ok(post)
	}

	async fn post(&self, id: Uuid) -> Result<Option<Post>> {
		Ok(self.posts.get(&id).map(|stored| stored.value.clone()))
	}

	async fn owned_post(&self, id: Uuid, author: Uuid) -> Result<Option<Post>> {
		Ok(self
			.posts
			.get(&id)
			.filter(|stored| stored.value.author == author)
			.map(|stored| stored.value.clone()))
	}

	async fn posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
		let mut posts = self
			.posts
			.iter()
			.map(|stored| (stored.value.created_at, stored.seq, stored.value.clone()))
			.collect::<Vec<_>>();

		posts.sort_unstable_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

		Ok(posts
			.into_iter()
			.skip(usize::try_from(offset).unwrap_or(0))
			.take(usize::try_from(limit).unwrap_or(0))
			.map(|(.., post)| post)
			.collect())
	}

	async fn count_posts(&self) -> Result<i64> {
		Ok(i64::try_from(self.posts.len()).unwrap_or(i64::MAX))
	}

	async fn update_post(
		&self,
		id: Uuid,
		author: Uuid,
		changes: PostChanges,
	) -> Result<Option<Post>> {
		let outcome = self.mutate_post(id, |post| {
			if post.author != author {
				return false;
			}

			if let Some(content) = changes.content {
				post.content = content;
			}

			if let Some(tags) = changes.tags {
				post.tags = tags;
			}

			true
		});

		Ok(match outcome {
			Outcome::Applied(post) => Some(post),
			Outcome::Unchanged | Outcome::Missing => None,
		})
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool> {
		let removed = self.posts.remove(&id).is_some();

		// Same as the comment foreign key cascade in Postgres. With the post entry
		// gone, nothing can attach to it anymore.
		self.comments.retain(|_, stored| stored.value.post != id);

		Ok(removed)
	}

	async fn add_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>> {
		Ok(self.mutate_post(post, |post| {
			if post.likes.contains(&user) {
				return false;
			}

			post.likes.push(user);
			true
		}))
	}

	async fn remove_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>> {
		Ok(self.mutate_post(post, |post| {
			if !post.likes.contains(&user) {
				return false;
			}

			post.likes.retain(|like| *like != user);
			true
		}))
	}
}

#[axum::async_trait]
impl CommentStore for MemoryStore {
	async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
		// The post entry stays locked until the comment is stored and attached.
		let Some(mut post) = self.posts.get_mut(&comment.post) else {
			return Ok(None);
		};

		let now = Utc::now();
		let comment = Comment {
			id: comment.id,
			content: comment.content,
			author: comment.author,
			post: comment.post,
			created_at: now,
			updated_at: now,
		};

		self.comments.insert(
			comment.id,
			Stored {
				seq: self.next_seq(),
				value: comment.clone(),
			},
		);

		post.value.comments.push(comment.id);
		post.value.updated_at = now;

		Ok(Some(comment))
	}

	async fn comment(&self, id: Uuid) -> Result<Option<Comment>> {
		Ok(self.comments.get(&id).map(|stored| stored.value.clone()))
	}

	async fn owned_comment(&self, id: Uuid, author: Uuid) -> Result<Option<Comment>> {
		Ok(self
			.comments
			.get(&id)
			.filter(|stored| stored.value.author == author)
			.map(|stored| stored.value.clone()))
	}

	async fn comments_of(&self, posts: &[Uuid]) -> Result<Vec<Comment>> {
		let mut comments = self
			.comments
			.iter()
			.filter(|stored| posts.contains(&stored.value.post))
			.map(|stored| (stored.value.created_at, stored.seq, stored.value.clone()))
			.collect::<Vec<_>>();

		comments.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

		Ok(comments.into_iter().map(|(.., comment)| comment).collect())
	}

	async fn detach_comment(&self, post: Uuid, comment: Uuid) -> Result<()> {
		self.mutate_post(post, |post| {
			let before = post.comments.len();
			post.comments.retain(|id| *id != comment);
			post.comments.len() != before
		});

		Ok(())
	}

	async fn delete_comment(&self, id: Uuid) -> Result<bool> {
		Ok(self.comments.remove(&id).is_some())
	}

	async fn delete_comments_of(&self, post: Uuid) -> Result<u64> {
		let ids = self
			.comments
			.iter()
			.filter(|stored| stored.value.post == post)
			.map(|stored| *stored.key())
			.collect::<Vec<_>>();

		let removed = ids
			.iter()
			.filter(|id| self.comments.remove(id).is_some())
			.count();

		Ok(u64::try_from(removed).unwrap_or(u64::MAX))
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use super::*;

	fn new_post(author: Uuid) -> NewPost {
		NewPost {
			author,
			content: "hello".into(),
			media: Vec::new(),
			tags: Vec::new(),
		}
	}

	#[tokio::test]
	async fn test_duplicate_user_fields() {
		let store = MemoryStore::new();
		let user = |email: &str, username: &str| NewUser {
			id: Uuid::new_v4(),
			email: email.into(),
			password: Vec::new(),
			name: "Ada".into(),
			username: username.into(),
		};

		store.insert_user(user("a@example.com", "ada")).await.unwrap();

		assert!(matches!(
			store.insert_user(user("a@example.com", "other")).await,
			Err(Error::Duplicate(Unique::Email))
		));
		assert!(matches!(
			store.insert_user(user("b@example.com", "ada")).await,
			Err(Error::Duplicate(Unique::Username))
		));

		// The email reserved by the rejected attempt is released again.
		store.insert_user(user("b@example.com", "bob")).await.unwrap();
	}

	#[tokio::test]
	async fn test_update_user_moves_username() {
		let store = MemoryStore::new();
		let user = |email: &str, username: &str| NewUser {
			id: Uuid::new_v4(),
			email: email.into(),
			password: Vec::new(),
			name: "Ada".into(),
			username: username.into(),
		};

		let ada = store.insert_user(user("a@example.com", "ada")).await.unwrap();
		store.insert_user(user("b@example.com", "bob")).await.unwrap();

		let taken = store
			.update_user(
				ada.id,
				ProfileChanges {
					username: Some("bob".into()),
					..Default::default()
				},
			)
			.await;
		assert!(matches!(taken, Err(Error::Duplicate(Unique::Username))));

		let renamed = store
			.update_user(
				ada.id,
				ProfileChanges {
					username: Some("lovelace".into()),
					bio: Some("Analyst".into()),
					..Default::default()
				},
			)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(renamed.username, "lovelace");
		assert_eq!(renamed.bio.as_deref(), Some("Analyst"));
		assert_eq!(renamed.name, "Ada");

		// The old handle is free again.
		store.insert_user(user("c@example.com", "ada")).await.unwrap();

		assert!(store
			.update_user(Uuid::new_v4(), ProfileChanges::default())
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_posts_newest_first() {
		let store = MemoryStore::new();
		let author = Uuid::new_v4();

		let first = store.insert_post(new_post(author)).await.unwrap();
		let second = store.insert_post(new_post(author)).await.unwrap();

		let posts = store.posts(10, 0).await.unwrap();

		assert_eq!(posts[0].id, second.id);
		assert_eq!(posts[1].id, first.id);
		assert_eq!(store.posts(10, 1).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_delete_post_takes_late_comments_along() {
		let store = MemoryStore::new();
		let author = Uuid::new_v4();
		let post = store.insert_post(new_post(author)).await.unwrap().id;

		store.delete_comments_of(post).await.unwrap();

		let late = store
			.insert_comment(NewComment {
				id: Uuid::new_v4(),
				post,
				author,
				content: "late".into(),
			})
			.await
			.unwrap();

		assert!(late.is_some());
		assert!(store.delete_post(post).await.unwrap());
		assert!(store.comments_of(&[post]).await.unwrap().is_empty());
		assert_eq!(store.comments.len(), 0);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_likes_are_not_lost() {
		let store = Arc::new(MemoryStore::new());
		let post = store.insert_post(new_post(Uuid::new_v4())).await.unwrap().id;
		let users = (0..64).map(|_| Uuid::new_v4()).collect::<Vec<_>>();

		let handles = users
			.iter()
			.flat_map(|user| [*user, *user])
			.map(|user| {
				let store = Arc::clone(&store);
				tokio::spawn(async move { store.add_like(post, user).await })
			})
			.collect::<Vec<_>>();

		let mut applied = 0;

		for handle in handles {
			if let Outcome::Applied(..) = handle.await.unwrap().unwrap() {
				applied += 1;
			}
		}

		let post = store.post(post).await.unwrap().unwrap();

		assert_eq!(applied, users.len());
		assert_eq!(post.likes.len(), users.len());
		assert!(users.iter().all(|user| post.likes.contains(user)));
	}
}
