pub use crate::model::{Session, User};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	/// The display name.
	#[serde(deserialize_with = "crate::model::trimmed")]
	#[schemars(with = "String")]
	#[validate(length(min = 1, max = 64))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The handle that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
}

/// A freshly opened session along with its user.
#[derive(Serialize, JsonSchema)]
pub struct SessionData {
	pub session: Session,
	pub user: User,
}

#[derive(Serialize, JsonSchema)]
pub struct UserData {
	pub user: User,
}
