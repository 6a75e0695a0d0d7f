use sqlx::{postgres::PgPoolOptions, types::Json};
use uuid::Uuid;

use super::{CommentStore, Error, IdentityStore, Outcome, PostStore, Result, Unique};
use crate::model::{
	Comment, Media, NewComment, NewPost, NewUser, Post, PostChanges, Profile, ProfileChanges,
	Session, User,
};

pub type Database = sqlx::Pool<sqlx::Postgres>;

const POST_COLUMNS: &str =
	"id, content, media, author_id, tags, likes, comments, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, author_id, post_id, created_at, updated_at";

/// A [`Store`](super::Store) backed by Postgres.
///
/// Conditional mutations are expressed as single guarded statements, so the
/// database's row-level atomicity is all the synchronization needed.
#[derive(Clone)]
pub struct PgStore {
	database: Database,
}

#[derive(sqlx::FromRow)]
struct PostRow {
	id: Uuid,
	content: String,
	media: Json<Vec<Media>>,
	author_id: Uuid,
	tags: Vec<String>,
	likes: Vec<Uuid>,
	comments: Vec<Uuid>,
	created_at: chrono::DateTime<chrono::Utc>,
	updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for Post {
	fn from(row: PostRow) -> Self {
		Self {
			id: row.id,
			content: row.content,
			media: row.media.0,
			author: row.author_id,
			tags: row.tags,
			likes: row.likes,
			comments: row.comments,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

/// Maps a violated unique constraint on `"user"` to [`Error::Duplicate`].
fn duplicate(e: sqlx::Error) -> Error {
	let unique = match &e {
		sqlx::Error::Database(d) => match d.constraint() {
			Some("user_email_key") => Some(Unique::Email),
			Some("user_username_key") => Some(Unique::Username),
			_ => None,
		},
		_ => None,
	};

	unique.map_or_else(|| Error::from(e), Error::Duplicate)
}

impl PgStore {
	pub fn new(database: Database) -> Self {
		Self { database }
	}

	/// Connects to the database and applies pending migrations.
	pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
		let database = PgPoolOptions::new()
			.max_connections(max_connections)
			.connect(url)
			.await?;

		sqlx::migrate!("./migrations").run(&database).await?;

		Ok(Self::new(database))
	}

	async fn post_exists(&self, id: Uuid) -> Result<bool> {
		let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM post WHERE id = $1)")
			.bind(id)
			.fetch_one(&self.database)
			.await?;

		Ok(exists)
	}

	async fn guarded(&self, id: Uuid, row: Option<PostRow>) -> Result<Outcome<Post>> {
		Ok(match row {
			Some(row) => Outcome::Applied(row.into()),
			None if self.post_exists(id).await? => Outcome::Unchanged,
			None => Outcome::Missing,
		})
	}
}

#[axum::async_trait]
impl IdentityStore for PgStore {
	async fn insert_user(&self, user: NewUser) -> Result<User> {
		sqlx::query_as::<_, User>(
			r#"
				INSERT INTO "user" (id, email, password, name, username)
				VALUES ($1, $2, $3, $4, $5)
				RETURNING *
			"#,
		)
		.bind(user.id)
		.bind(&user.email)
		.bind(&user.password)
		.bind(&user.name)
		.bind(&user.username)
		.fetch_one(&self.database)
		.await
		.map_err(duplicate)
	}

	async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE email = $1"#)
			.bind(email)
			.fetch_optional(&self.database)
			.await?;

		Ok(user)
	}

	async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
		sqlx::query_as::<_, User>(
			r#"
				UPDATE "user"
				SET
					name = COALESCE($2, name),
					username = COALESCE($3, username),
					bio = COALESCE($4, bio),
					location = COALESCE($5, location),
					avatar = COALESCE($6, avatar),
					cover_image = COALESCE($7, cover_image)
				WHERE id = $1
				RETURNING *
			"#,
		)
		.bind(id)
		.bind(changes.name)
		.bind(changes.username)
		.bind(changes.bio)
		.bind(changes.location)
		.bind(changes.avatar)
		.bind(changes.cover_image)
		.fetch_optional(&self.database)
		.await
		.map_err(duplicate)
	}

	async fn insert_session(&self, user_id: Uuid) -> Result<Session> {
		let session = sqlx::query_as::<_, Session>(
			"INSERT INTO session (user_id) VALUES ($1) RETURNING *",
		)
		.bind(user_id)
		.fetch_one(&self.database)
		.await?;

		Ok(session)
	}

	async fn session_user(&self, session_id: Uuid) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(&self.database)
		.await?;

		Ok(user)
	}

	async fn delete_session(&self, session_id: Uuid) -> Result<()> {
		sqlx::query("DELETE FROM session WHERE id = $1")
			.bind(session_id)
			.execute(&self.database)
			.await?;

		Ok(())
	}

	async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let profiles = sqlx::query_as::<_, Profile>(
			r#"SELECT id, name, username, avatar FROM "user" WHERE id = ANY($1)"#,
		)
		.bind(ids)
		.fetch_all(&self.database)
		.await?;

		Ok(profiles)
	}
}

#[axum::async_trait]
impl PostStore for PgStore {
	async fn insert_post(&self, post: NewPost) -> Result<Post> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			r#"
				INSERT INTO post (author_id, content, media, tags)
				VALUES ($1, $2, $3, $4)
				RETURNING {POST_COLUMNS}
			"#
		))
		.bind(post.author)
		.bind(&post.content)
		.bind(Json(&post.media))
		.bind(&post.tags)
		.fetch_one(&self.database)
		.await?;

		Ok(row.into())
	}

	async fn post(&self, id: Uuid) -> Result<Option<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			"SELECT {POST_COLUMNS} FROM post WHERE id = $1"
		))
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Post::from))
	}

	async fn owned_post(&self, id: Uuid, author: Uuid) -> Result<Option<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			"SELECT {POST_COLUMNS} FROM post WHERE id = $1 AND author_id = $2"
		))
		.bind(id)
		.bind(author)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Post::from))
	}

	async fn posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
		let rows = sqlx::query_as::<_, PostRow>(&format!(
			r#"
				SELECT {POST_COLUMNS} FROM post
				ORDER BY created_at DESC, id DESC
				LIMIT $1 OFFSET $2
			"#
		))
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.database)
		.await?;

		Ok(rows.into_iter().map(Post::from).collect())
	}

	async fn count_posts(&self) -> Result<i64> {
		let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post")
			.fetch_one(&self.database)
			.await?;

		Ok(count)
	}

	async fn update_post(
		&self,
		id: Uuid,
		author: Uuid,
		changes: PostChanges,
	) -> Result<Option<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			r#"
				UPDATE post
				SET content = COALESCE($1, content), tags = COALESCE($2, tags), updated_at = now()
				WHERE id = $3 AND author_id = $4
				RETURNING {POST_COLUMNS}
			"#
		))
		.bind(changes.content)
		.bind(changes.tags)
		.bind(id)
		.bind(author)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Post::from))
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool> {
		let status = sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		Ok(status.rows_affected() > 0)
	}

	async fn add_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			r#"
				UPDATE post
				SET likes = array_append(likes, $2), updated_at = now()
				WHERE id = $1 AND NOT ($2 = ANY(likes))
				RETURNING {POST_COLUMNS}
			"#
		))
		.bind(post)
		.bind(user)
		.fetch_optional(&self.database)
		.await?;

		self.guarded(post, row).await
	}

	async fn remove_like(&self, post: Uuid, user: Uuid) -> Result<Outcome<Post>> {
		let row = sqlx::query_as::<_, PostRow>(&format!(
			r#"
				UPDATE post
				SET likes = array_remove(likes, $2), updated_at = now()
				WHERE id = $1 AND $2 = ANY(likes)
				RETURNING {POST_COLUMNS}
			"#
		))
		.bind(post)
		.bind(user)
		.fetch_optional(&self.database)
		.await?;

		self.guarded(post, row).await
	}
}

#[axum::async_trait]
impl CommentStore for PgStore {
	async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
		let mut tx = self.database.begin().await?;

		// Locks the post row until commit, so a concurrent delete cannot slip in between.
		let attached = sqlx::query(
			r#"
				UPDATE post
				SET comments = array_append(comments, $2), updated_at = now()
				WHERE id = $1
			"#,
		)
		.bind(comment.post)
		.bind(comment.id)
		.execute(&mut *tx)
		.await?;

		if attached.rows_affected() == 0 {
			return Ok(None);
		}

		let comment = sqlx::query_as::<_, Comment>(&format!(
			r#"
				INSERT INTO comment (id, content, author_id, post_id)
				VALUES ($1, $2, $3, $4)
				RETURNING {COMMENT_COLUMNS}
			"#
		))
		.bind(comment.id)
		.bind(&comment.content)
		.bind(comment.author)
		.bind(comment.post)
		.fetch_one(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(Some(comment))
	}

	async fn comment(&self, id: Uuid) -> Result<Option<Comment>> {
		let comment = sqlx::query_as::<_, Comment>(&format!(
			"SELECT {COMMENT_COLUMNS} FROM comment WHERE id = $1"
		))
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(comment)
	}

	async fn owned_comment(&self, id: Uuid, author: Uuid) -> Result<Option<Comment>> {
		let comment = sqlx::query_as::<_, Comment>(&format!(
			"SELECT {COMMENT_COLUMNS} FROM comment WHERE id = $1 AND author_id = $2"
		))
		.bind(id)
		.bind(author)
		.fetch_optional(&self.database)
		.await?;

		Ok(comment)
	}

	async fn comments_of(&self, posts: &[Uuid]) -> Result<Vec<Comment>> {
		if posts.is_empty() {
			return Ok(Vec::new());
		}

		let comments = sqlx::query_as::<_, Comment>(&format!(
			r#"
				SELECT {COMMENT_COLUMNS} FROM comment
				WHERE post_id = ANY($1)
				ORDER BY created_at ASC, id ASC
			"#
		))
		.bind(posts)
		.fetch_all(&self.database)
		.await?;

		Ok(comments)
	}

	async fn detach_comment(&self, post: Uuid, comment: Uuid) -> Result<()> {
		sqlx::query(
			r#"
				UPDATE post
				SET comments = array_remove(comments, $2), updated_at = now()
				WHERE id = $1
			"#,
		)
		.bind(post)
		.bind(comment)
		.execute(&self.database)
		.await?;

		Ok(())
	}

	async fn delete_comment(&self, id: Uuid) -> Result<bool> {
		let status = sqlx::query("DELETE FROM comment WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		Ok(status.rows_affected() > 0)
	}

	async fn delete_comments_of(&self, post: Uuid) -> Result<u64> {
		let status = sqlx::query("DELETE FROM comment WHERE post_id = $1")
			.bind(post)
			.execute(&self.database)
			.await?;

		Ok(status.rows_affected())
	}
}
