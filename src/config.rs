use serde::Deserialize;

#[inline]
fn max_connections() -> u32 {
	10
}

#[inline]
fn host() -> String {
	"127.0.0.1".into()
}

#[inline]
fn port() -> u16 {
	3000
}

#[inline]
fn log_level() -> String {
	"info".into()
}

#[inline]
fn enabled() -> bool {
	true
}

/// Runtime configuration, read from the environment (and a `.env` file, if present).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// The Postgres connection string. Without one, everything is kept in memory.
	pub database_url: Option<String>,
	#[serde(default = "max_connections")]
	pub database_max_connections: u32,
	#[serde(default = "host")]
	pub host: String,
	#[serde(default = "port")]
	pub port: u16,
	/// One of `trace`, `debug`, `info`, `warn`, `error` or `off`.
	#[serde(default = "log_level")]
	pub log_level: String,
	/// Whether spans and metrics are exported over OTLP.
	#[serde(default)]
	pub otel_enabled: bool,
	#[serde(default = "enabled")]
	pub rate_limit: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid configuration: {0}")]
	Env(#[from] envy::Error),
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_iter(std::env::vars())
	}

	pub fn from_iter<I>(vars: I) -> Result<Self, Error>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		Ok(envy::from_iter(vars)?)
	}
}
