#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod interaction;
mod model;
mod openapi;
mod ratelimit;
mod route;
mod session;
mod store;
mod trace;


use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	config::Config,
	interaction::Engine,
	store::{MemoryStore, PgStore, SharedStore},
};

pub type AppState = State;

/// The shared application state.
///
/// The store is shared by the engine and the authentication routes, and the
/// hasher is kept here since it is used on every login.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: SharedStore,
	pub engine: Engine,
	pub hasher: Argon2<'static>,
}

impl State {
	pub fn new(store: SharedStore) -> Self {
		Self {
			engine: Engine::new(Arc::clone(&store)),
			store,
			hasher: Argon2::default(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
enum Error {
	#[error(transparent)]
	Config(#[from] config::Error),
	#[error(transparent)]
	Trace(#[from] trace::Error),
	#[error(transparent)]
	Store(#[from] store::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid rate limit quota")]
	RateLimit,
}

/// Builds the application router, with the OpenAPI document served at `/docs/api.json`.
pub fn app(state: State) -> Router {
	aide::gen::on_error(|error| tracing::warn!(%error, "openapi generation error"));
	aide::gen::extract_schemas(true);

	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/posts", route::post::routes())
		.nest("/users", route::user::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(Extension(Arc::new(api))),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let config = Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let store: SharedStore = match &config.database_url {
		Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
		None => {
			tracing::warn!("DATABASE_URL is not set, keeping everything in memory");
			Arc::new(MemoryStore::new())
		}
	};

	let mut app = app(State::new(store));

	if config.rate_limit {
		let limit = ratelimit::default().ok_or(Error::RateLimit)?;

		ratelimit::cleanup_old_limits(&[&limit]);
		app = app.layer(GovernorLayer { config: limit });
	}

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await?;

	Ok(())
}
