#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The permission service for the portal. It owns the permission snapshot of
//! the current subject, loads it from a [`PermissionSource`], and answers
//! permission checks synchronously from the loaded snapshot. A SQL backed
//! source, along with the queries the role and permission managers use to
//! edit roles, grants and overrides, is provided in [`db`].

/// All the database related functions. Connecting to the database, creating
/// the tables, and the queries for roles, grants and overrides.
pub mod db;
/// The error type returned when a snapshot cannot be loaded.
mod error;
/// The service that owns a subject's snapshot and answers checks.
mod service;
/// The trait the service loads snapshots through, and its SQL implementation.
mod source;
/// Utilities used across the crate, such as the config parser.
pub mod utils;

pub use self::{
	error::SourceError,
	service::PermissionService,
	source::{PermissionSource, SqlPermissionSource},
};

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use models::{prelude::*, rbac::*};
	pub use sqlx::{query, Row};
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::{
		error::SourceError,
		service::PermissionService,
		source::{PermissionSource, SqlPermissionSource},
		utils::config::*,
	};

	/// The type of the database connection. A mutable reference to this should
	/// be used as the parameter for database functions, since it accepts both a
	/// connection and a transaction.
	///
	/// Example:
	/// ```rust
	/// use permissions::prelude::*;
	///
	/// pub async fn database_fn(connection: &mut DatabaseConnection) {
	///     // Do something with `connection` ....
	/// }
	/// ```
	pub type DatabaseConnection = <DatabaseType as sqlx::Database>::Connection;

	/// The type of the database. This is currently set to [`sqlx::Sqlite`].
	/// A type alias is used here so that it can be referenced everywhere easily
	pub type DatabaseType = sqlx::Sqlite;
}
