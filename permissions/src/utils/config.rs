use std::fmt::{Display, Formatter};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// The configuration for the permission service and the admin tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	/// The environment the application is running in. This is set at runtime
	/// based on an environment variable and if the application is compiled with
	/// debug mode.
	pub environment: RunningEnvironment,
	/// The configuration for the database the roles, grants and overrides are
	/// stored in.
	#[serde(default)]
	pub database: DatabaseConfig,
}

impl AppConfig {
	/// Get the config from the config files and the environment.
	///
	/// In development, `config/dev` is read from the workspace root. In
	/// production, an optional `config` file in the working directory is used.
	/// Either way, `PORTAL_*` environment variables take precedence. Nested
	/// keys are split on a double underscore, so the connection limit is set
	/// with `PORTAL_DATABASE__CONNECTION_LIMIT` and the file with
	/// `PORTAL_DATABASE__FILE`.
	pub fn parse() -> Result<Self, ConfigError> {
		let env = if cfg!(debug_assertions) {
			std::env::var("PORTAL_ENV").unwrap_or_else(|_| "dev".into())
		} else {
			std::env::var("PORTAL_ENV").unwrap_or_else(|_| "prod".into())
		};

		match env.as_ref() {
			"prod" | "production" => Config::builder()
				.add_source(File::with_name("config").required(false))
				.add_source(
					File::with_name(concat!(env!("CARGO_MANIFEST_DIR"), "/../config/prod"))
						.required(false),
				)
				.set_default("environment", "production")?,
			"dev" | "development" => Config::builder()
				.add_source(
					File::with_name(concat!(env!("CARGO_MANIFEST_DIR"), "/../config/dev"))
						.required(false),
				)
				.set_default("environment", "development")?,
			unknown => {
				return Err(ConfigError::Message(format!(
					"unknown running environment `{unknown}`"
				)));
			}
		}
		.add_source(environment())
		.build()?
		.try_deserialize()
	}
}

/// The `PORTAL_*` environment variables. A single underscore would also split
/// `CONNECTION_LIMIT`, so nesting uses `__`.
fn environment() -> Environment {
	Environment::with_prefix("PORTAL")
		.prefix_separator("_")
		.separator("__")
}

/// The environment the application is running in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	/// The application is running in development mode
	Development,
	/// The application is running in production mode
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

/// The configuration for the database to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
	/// The location of the sqlite database file. `:memory:` opens a private
	/// in-memory database.
	#[serde(default = "default_database_file")]
	pub file: String,
	/// The maximum number of connections to the database
	#[serde(
		alias = "connectionlimit",
		alias = "connection_limit",
		default = "default_connection_limit"
	)]
	pub connection_limit: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			file: default_database_file(),
			connection_limit: default_connection_limit(),
		}
	}
}

impl DatabaseConfig {
	/// A config for a private in-memory database, as used by tests.
	pub fn in_memory() -> Self {
		Self {
			file: ":memory:".to_string(),
			connection_limit: 1,
		}
	}

	/// Returns true if this config points at an in-memory database.
	pub fn is_in_memory(&self) -> bool {
		self.file == ":memory:"
	}
}

/// The database file used when none is configured.
fn default_database_file() -> String {
	"portal-permissions.db".to_string()
}

/// The connection limit used when none is configured.
fn default_connection_limit() -> u32 {
	4
}
