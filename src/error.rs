use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{route::model::Status, store};

/// Message shown to clients in place of unexpected failures.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Errors that are not specific to a single route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("rate limited: {0}")]
	RateLimit(tower_governor::GovernorError),
}

impl From<tower_governor::GovernorError> for AppError {
	fn from(error: tower_governor::GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

/// The error envelope sent to clients.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody {
	pub status: Status,
	pub message: Cow<'static, str>,
}

impl ErrorBody {
	pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
		Self {
			status: Status::Error,
			message: message.into(),
		}
	}
}

/// Describes how an error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	/// The message sent to the client. Must not contain sensitive information.
	fn message(&self) -> Cow<'static, str>;
}

/// The error returned from route handlers, wrapping either a shared
/// [`AppError`] or the route-specific error `E`.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<store::Error> for RouteError<E> {
	fn from(error: store::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E> From<ValidationErrors> for RouteError<E> {
	fn from(error: ValidationErrors) -> Self {
		Self::App(error.into())
	}
}

/// Flattens validation errors into a single readable line, preferring
/// the messages attached to each failing rule.
pub fn describe(errors: &ValidationErrors) -> String {
	let mut lines = Vec::new();
	collect(errors, "", &mut lines);
	lines.sort();
	lines.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, lines: &mut Vec<String>) {
	for (field, kind) in errors.errors() {
		let path = if prefix.is_empty() {
			field.to_string()
		} else {
			format!("{prefix}.{field}")
		};

		match kind {
			ValidationErrorsKind::Field(errors) => {
				lines.extend(errors.iter().map(|error| match &error.message {
					Some(message) => message.to_string(),
					None => format!("{path}: {}", error.code),
				}));
			}
			ValidationErrorsKind::Struct(errors) => collect(errors, &path, lines),
			ValidationErrorsKind::List(items) => {
				for (index, errors) in items {
					collect(errors, &format!("{path}[{index}]"), lines);
				}
			}
		}
	}
}

/// Logs an unexpected failure and hides its details outside of debug builds.
pub fn unexpected(error: &dyn std::error::Error) -> Cow<'static, str> {
	tracing::error!(%error, "unexpected error");

	if cfg!(debug_assertions) {
		Cow::Owned(error.to_string())
	} else {
		Cow::Borrowed(INTERNAL_MESSAGE)
	}
}

impl AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::RateLimit(tower_governor::GovernorError::TooManyRequests { .. }) => {
				StatusCode::TOO_MANY_REQUESTS
			}
			Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> Cow<'static, str> {
		match self {
			Self::Validation(errors) => describe(errors).into(),
			Self::Json(error) => error.body_text().into(),
			Self::Query(error) => error.body_text().into(),
			Self::Path(error) => error.body_text().into(),
			Self::RateLimit(tower_governor::GovernorError::TooManyRequests { .. }) => {
				"Too many requests".into()
			}
			Self::Store(error) => unexpected(error),
			Self::RateLimit(error) => unexpected(error),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		(self.status(), Json(ErrorBody::new(self.message()))).into_response()
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				(error.status(), Json(ErrorBody::new(error.message()))).into_response()
			}
		}
	}
}

impl<E> aide::OperationOutput for RouteError<E> {
	type Inner = ErrorBody;
}

impl aide::OperationOutput for AppError {
	type Inner = ErrorBody;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::describe;
	use crate::model::CreatePostInput;

	#[test]
	fn test_describe_uses_rule_messages() {
		let errors = CreatePostInput::new("").validate().unwrap_err();

		assert_eq!(describe(&errors), "Content is required");
	}

	#[test]
	fn test_describe_nested_errors() {
		let mut input = CreatePostInput::new("hello");
		input.media.push(crate::model::MediaInput {
			content_type: "application/zip".into(),
			locator: "/uploads/a.zip".into(),
		});

		let errors = input.validate().unwrap_err();

		assert_eq!(
			describe(&errors),
			"Only image and video files are allowed"
		);
	}
}
