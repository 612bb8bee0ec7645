use std::future::Future;

use sqlx::Pool;

use crate::{db, prelude::*};

/// Where a [`PermissionService`] loads a subject's snapshot from.
///
/// Each of the four queries is independent of the others, so the service
/// runs them concurrently. Any of them failing fails the whole load.
pub trait PermissionSource: Send + Sync {
	/// The roles the user holds.
	fn list_roles_for_user(
		&self,
		user_id: &Uuid,
	) -> impl Future<Output = Result<Vec<UserRole>, SourceError>> + Send;

	/// The full permission catalog. This doesn't depend on the user.
	fn list_all_permissions(
		&self,
	) -> impl Future<Output = Result<Vec<Permission>, SourceError>> + Send;

	/// The overrides set directly on the user.
	fn list_overrides_for_user(
		&self,
		user_id: &Uuid,
	) -> impl Future<Output = Result<Vec<UserPermissionOverride>, SourceError>> + Send;

	/// The grants of every role the user holds.
	fn list_role_grants_for_user(
		&self,
		user_id: &Uuid,
	) -> impl Future<Output = Result<Vec<RolePermissionGrant>, SourceError>> + Send;
}

/// A [`PermissionSource`] backed by the SQL tables created by
/// [`db::initialize`].
#[derive(Debug, Clone)]
pub struct SqlPermissionSource {
	/// The pool each query takes a connection from.
	pool: Pool<DatabaseType>,
}

impl SqlPermissionSource {
	/// Creates a new source reading from the given pool.
	pub fn new(pool: Pool<DatabaseType>) -> Self {
		Self { pool }
	}

	/// The pool the source reads from.
	pub fn pool(&self) -> &Pool<DatabaseType> {
		&self.pool
	}
}

impl PermissionSource for SqlPermissionSource {
	async fn list_roles_for_user(&self, user_id: &Uuid) -> Result<Vec<UserRole>, SourceError> {
		let mut connection = self.pool.acquire().await?;
		Ok(db::get_roles_for_user(&mut connection, user_id).await?)
	}

	async fn list_all_permissions(&self) -> Result<Vec<Permission>, SourceError> {
		let mut connection = self.pool.acquire().await?;
		Ok(db::get_all_permissions(&mut connection).await?)
	}

	async fn list_overrides_for_user(
		&self,
		user_id: &Uuid,
	) -> Result<Vec<UserPermissionOverride>, SourceError> {
		let mut connection = self.pool.acquire().await?;
		Ok(db::get_overrides_for_user(&mut connection, user_id).await?)
	}

	async fn list_role_grants_for_user(
		&self,
		user_id: &Uuid,
	) -> Result<Vec<RolePermissionGrant>, SourceError> {
		let mut connection = self.pool.acquire().await?;
		Ok(db::get_role_grants_for_user(&mut connection, user_id).await?)
	}
}
