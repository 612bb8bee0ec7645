use sqlx::Pool;

use crate::prelude::*;

/// Initializes the database. On a fresh database, the tables and indices are
/// created and the permission table is seeded with the built-in catalog. An
/// existing database is left untouched, apart from adding any catalog entries
/// it is missing.
#[instrument(skip(pool))]
pub async fn initialize(pool: &Pool<DatabaseType>) -> Result<(), sqlx::Error> {
	info!("Initializing database");

	let tables = query(
		r#"
		SELECT
			name
		FROM
			sqlite_schema
		WHERE
			type = 'table' AND
			name NOT LIKE 'sqlite_%';
		"#,
	)
	.fetch_all(pool)
	.await?;

	let mut transaction = pool.begin().await?;

	if tables.is_empty() {
		warn!("No tables exist. Creating fresh");

		initialize_rbac_tables(&mut transaction).await?;
		initialize_rbac_indices(&mut transaction).await?;
	}

	let seeded = seed_permission_catalog(&mut transaction).await?;
	transaction.commit().await?;

	if tables.is_empty() {
		info!("Database created with {} permissions", seeded);
	} else if seeded > 0 {
		info!("Added {} missing permissions to the catalog", seeded);
	} else {
		debug!("Database already initialized");
	}

	Ok(())
}

/// Creates the role, permission and assignment tables.
#[instrument(skip(connection))]
async fn initialize_rbac_tables(connection: &mut DatabaseConnection) -> Result<(), sqlx::Error> {
	info!("Setting up rbac tables");

	query(
		r#"
		CREATE TABLE role(
			id TEXT NOT NULL PRIMARY KEY,
			name TEXT NOT NULL,
			description TEXT,
			CONSTRAINT role_uq_name UNIQUE(name)
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE TABLE permission(
			id TEXT NOT NULL PRIMARY KEY,
			resource TEXT NOT NULL,
			action TEXT NOT NULL,
			description TEXT,
			CONSTRAINT permission_uq_resource_action UNIQUE(resource, action)
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE TABLE user_role(
			user_id TEXT NOT NULL,
			role_id TEXT NOT NULL REFERENCES role(id) ON DELETE CASCADE,
			PRIMARY KEY(user_id, role_id)
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE TABLE role_permission(
			role_id TEXT NOT NULL REFERENCES role(id) ON DELETE CASCADE,
			permission_id TEXT NOT NULL REFERENCES permission(id) ON DELETE CASCADE,
			effect TEXT NOT NULL CHECK(effect IN ('allow', 'deny')),
			PRIMARY KEY(role_id, permission_id)
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	// At most one override per user and permission
	query(
		r#"
		CREATE TABLE user_permission_override(
			user_id TEXT NOT NULL,
			permission_id TEXT NOT NULL REFERENCES permission(id) ON DELETE CASCADE,
			effect TEXT NOT NULL CHECK(effect IN ('allow', 'deny')),
			PRIMARY KEY(user_id, permission_id)
		);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

/// Creates the indices used when loading a subject's snapshot.
#[instrument(skip(connection))]
async fn initialize_rbac_indices(connection: &mut DatabaseConnection) -> Result<(), sqlx::Error> {
	info!("Setting up rbac table indices");

	query(
		r#"
		CREATE INDEX user_role_idx_role_id
		ON user_role(role_id);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE INDEX role_permission_idx_permission_id
		ON role_permission(permission_id);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	query(
		r#"
		CREATE INDEX user_permission_override_idx_permission_id
		ON user_permission_override(permission_id);
		"#,
	)
	.execute(&mut *connection)
	.await?;

	Ok(())
}

/// Inserts every entry of the built-in catalog that isn't in the permission
/// table yet. Returns the number of permissions inserted.
async fn seed_permission_catalog(connection: &mut DatabaseConnection) -> Result<u64, sqlx::Error> {
	let mut inserted = 0;

	for entry in list_all_permissions() {
		let result = query(
			r#"
			INSERT INTO
				permission(id, resource, action, description)
			VALUES
				($1, $2, $3, $4)
			ON CONFLICT(resource, action) DO NOTHING;
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(entry.resource.to_string())
		.bind(entry.action.to_string())
		.bind(entry.description())
		.execute(&mut *connection)
		.await?;

		inserted += result.rows_affected();
	}

	trace!("Seeded {} permissions", inserted);

	Ok(inserted)
}
