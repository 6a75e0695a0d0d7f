use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{extract::State, http::header};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Actor, Created, Json, NoContent},
	model::NewUser,
	openapi::tag,
	route::model::Envelope,
	session,
	store::{self, SharedStore, Unique},
	AppState,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Log in
/// Logs in to an account, returning an associated session cookie.
/// The session id can also be sent as a bearer token.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<Envelope<model::SessionData>>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = state
		.store
		.user_by_email(&auth.email)
		.await?
		.ok_or(Error::InvalidEmailOrPassword)?;

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::from)?;

	if user.password != hashed {
		return Err(Error::InvalidEmailOrPassword.into());
	}

	let session = state.store.insert_session(user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user.id, "logged in");

	Ok((
		[(header::SET_COOKIE, cookie.to_string())],
		Json(Envelope::success(model::SessionData { session, user })),
	))
}

/// Log out
/// Closes the current session and clears the session cookie.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(store): State<SharedStore>,
	actor: Actor,
) -> Result<impl IntoApiResponse, RouteError> {
	store.delete_session(actor.session).await?;

	// Clear the session cookie
	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		NoContent,
	))
}

/// Register account
/// Registers a new account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 201, description = "Registered successfully.", shape = "Created<Envelope<model::SessionData>>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::from)?;

	let user = state
		.store
		.insert_user(NewUser {
			id: user_id,
			email: auth.email,
			password: hashed.to_vec(),
			name: auth.name,
			username: auth.username,
		})
		.await
		.map_err(|e| match e {
			store::Error::Duplicate(Unique::Email) => Error::EmailTaken.into(),
			store::Error::Duplicate(Unique::Username) => Error::UsernameTaken.into(),
			e => RouteError::from(e),
		})?;

	let session = state.store.insert_session(user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user.id, "registered");

	Ok((
		[(header::SET_COOKIE, cookie.to_string())],
		Created(Envelope::success(model::SessionData { session, user })),
	))
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(actor: Actor) -> Json<Envelope<model::UserData>> {
	Json(Envelope::success(model::UserData { user: actor.user }))
}
