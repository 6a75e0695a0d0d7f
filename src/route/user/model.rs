pub use crate::route::auth::model::UserData;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{model::ProfileChanges, route::auth::model::validate_username};

/// Fields to change on the authenticated user's profile. Omitted fields are kept.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct UpdateProfileInput {
	/// The display name.
	#[serde(default, deserialize_with = "crate::model::trimmed_option")]
	#[schemars(with = "Option<String>")]
	#[validate(length(min = 1, max = 64))]
	pub name: Option<String>,
	/// The handle that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: Option<String>,
	#[serde(default, deserialize_with = "crate::model::trimmed_option")]
	#[schemars(with = "Option<String>")]
	#[validate(length(max = 500))]
	pub bio: Option<String>,
	#[serde(default, deserialize_with = "crate::model::trimmed_option")]
	#[schemars(with = "Option<String>")]
	#[validate(length(max = 100))]
	pub location: Option<String>,
	/// A locator for the avatar image, such as an uploaded file path.
	#[validate(length(max = 2048))]
	pub avatar: Option<String>,
	/// A locator for the profile banner image.
	#[validate(length(max = 2048))]
	pub cover_image: Option<String>,
}

impl From<UpdateProfileInput> for ProfileChanges {
	fn from(input: UpdateProfileInput) -> Self {
		Self {
			name: input.name,
			username: input.username,
			bio: input.bio,
			location: input.location,
			avatar: input.avatar,
			cover_image: input.cover_image,
		}
	}
}
