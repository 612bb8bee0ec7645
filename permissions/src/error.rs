use thiserror::Error;

/// An error returned by a [`PermissionSource`][1] while loading a snapshot, or
/// by the queries used to edit roles, grants and overrides.
///
/// These never reach callers of the permission checks. The service records a
/// failed load as a failed snapshot and denies everything until the next
/// refresh.
///
/// [1]: crate::PermissionSource
#[derive(Debug, Error)]
pub enum SourceError {
	/// The backing database returned an error.
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	/// The source could not be reached or refused to answer.
	#[error("permission source unavailable: {0}")]
	Unavailable(String),
}
