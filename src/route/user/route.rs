use axum::extract::State;
use macros::route;

use crate::{
	extract::{Actor, Json},
	openapi::tag,
	route::model::Envelope,
	store::{self, SharedStore, Unique},
};

use super::{model, Error, RouteError};

/// Get profile
/// Returns the profile of the authenticated user.
#[route(tag = tag::USER)]
pub async fn get_profile(actor: Actor) -> Json<Envelope<model::UserData>> {
	Json(Envelope::success(model::UserData { user: actor.user }))
}

/// Update profile
/// Changes the given fields of the authenticated user's profile.
#[route(tag = tag::USER, response(status = 409, description = "The username is already taken."))]
pub async fn update_profile(
	State(store): State<SharedStore>,
	actor: Actor,
	Json(input): Json<model::UpdateProfileInput>,
) -> Result<Json<Envelope<model::UserData>>, RouteError> {
	let user = store
		.update_user(actor.user.id, input.into())
		.await
		.map_err(|e| match e {
			store::Error::Duplicate(Unique::Username) => Error::UsernameTaken.into(),
			e => RouteError::from(e),
		})?
		.ok_or(Error::NotFound)?;

	tracing::info!(user = %user.id, "updated profile");

	Ok(Json(Envelope::success(model::UserData { user })))
}
