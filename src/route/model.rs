use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[inline]
fn ten() -> i64 {
	10
}

/// Whether a response describes a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Success,
	Error,
}

/// The envelope wrapping every successful response body.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Envelope<T> {
	pub status: Status,
	pub data: T,
}

impl<T> Envelope<T> {
	pub fn success(data: T) -> Self {
		Self {
			status: Status::Success,
			data,
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed). Pages past the end are empty.
	#[validate(range(min = 1, message = "Page must be at least 1"))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
	#[serde(default = "ten")]
	pub limit: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}
