use std::str::FromStr;

use sqlx::{pool::PoolOptions, sqlite::SqliteConnectOptions, Pool};

use crate::prelude::*;

/// The initializer for the database. This creates the tables and seeds the
/// permission catalog on a fresh database.
pub mod initializer;
/// The queries for roles, permissions, role grants and user overrides.
pub mod rbac;

pub use self::{initializer::initialize, rbac::*};

/// Connects to the database based on a config.
///
/// An in-memory database only lives as long as its connection, so for those
/// the pool is pinned to a single connection that is never recycled.
#[instrument(skip(config))]
pub async fn connect(config: &DatabaseConfig) -> Result<Pool<DatabaseType>, sqlx::Error> {
	info!("Connecting to database: `{}`", config.file);

	if config.is_in_memory() {
		return PoolOptions::<DatabaseType>::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
			.await;
	}

	PoolOptions::<DatabaseType>::new()
		.max_connections(config.connection_limit)
		.connect_with(
			SqliteConnectOptions::new()
				.filename(&config.file)
				.foreign_keys(true)
				.create_if_missing(true),
		)
		.await
}
