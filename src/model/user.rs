use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

/// A single user.
///
/// Use this when fetching from the store and returning to the client.
/// The `email` and `password` fields are not serialized to the client.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The user's primary email address, used for logging in.
	#[serde(skip_serializing)]
	pub email: String,
	/// The hashed password, salted with `id`.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The display name.
	pub name: String,
	/// The handle that is displayed to the public.
	pub username: String,
	/// A short self-description.
	pub bio: Option<String>,
	/// Where the user says they are.
	pub location: Option<String>,
	/// A locator for the user's avatar image.
	pub avatar: Option<String>,
	/// A locator for the banner image shown on the user's profile.
	pub cover_image: Option<String>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
	pub fn profile(&self) -> Profile {
		Profile {
			id: self.id,
			name: self.name.clone(),
			username: self.username.clone(),
			avatar: self.avatar.clone(),
		}
	}
}

/// The display attributes of a user, used wherever a user reference
/// is expanded in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Profile {
	pub id: Uuid,
	pub name: String,
	pub username: String,
	pub avatar: Option<String>,
}

/// A user that has not been stored yet.
#[derive(Debug)]
pub struct NewUser {
	pub id: Uuid,
	pub email: String,
	pub password: Vec<u8>,
	pub name: String,
	pub username: String,
}

/// A partial update to a user's profile. `None` fields are left as they are.
#[derive(Debug, Default)]
pub struct ProfileChanges {
	pub name: Option<String>,
	pub username: Option<String>,
	pub bio: Option<String>,
	pub location: Option<String>,
	pub avatar: Option<String>,
	pub cover_image: Option<String>,
}

/// An open session, referenced by the session cookie or bearer token.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	#[serde(skip)]
	pub user_id: Uuid,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}
