use std::str::FromStr;

use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::RouteError,
	interaction::ActorContext,
	model::User,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	route::auth,
	session,
	store::SharedStore,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// The authenticated caller of a request, resolved from a session cookie
/// or an `Authorization: Bearer <session id>` header.
///
/// If neither is present, a [`auth::Error::NoSession`] is returned.
/// If the session is unknown, a [`auth::Error::InvalidSession`] is returned.
///
/// ```rust,ignore
/// async fn route(actor: Actor) {
///   println!("{:?}", actor.user);
/// }
/// ```
#[derive(Debug)]
pub struct Actor {
	pub session: Uuid,
	pub user: User,
}

impl Actor {
	/// The identity to attribute operations to.
	pub fn context(&self) -> ActorContext {
		ActorContext::new(self.user.id)
	}
}

/// Finds the session id in the request, preferring the authorization header.
fn session_id(parts: &request::Parts) -> Result<Uuid, auth::Error> {
	if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
		let token = value
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.ok_or(auth::Error::InvalidSession)?;

		return Uuid::from_str(token.trim()).map_err(|_| auth::Error::InvalidSession);
	}

	let cookie = parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.ok_or(auth::Error::NoSession)?;

	Uuid::parse_str(cookie.value()).map_err(|_| auth::Error::InvalidSession)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
	SharedStore: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session = session_id(parts)?;

		let store = SharedStore::from_ref(state);
		let user = store
			.session_user(session)
			.await?
			.ok_or(auth::Error::InvalidSession)?;

		Ok(Self { session, user })
	}
}

impl OperationInput for Actor {
	/// Adds a session cookie or bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
