use sqlx::sqlite::SqliteRow;

use crate::prelude::*;

/// Maps a row of the role table.
fn role_from_row(row: &SqliteRow) -> Result<Role, sqlx::Error> {
	Ok(Role {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
	})
}

/// Maps a row of the permission table.
fn permission_from_row(row: &SqliteRow) -> Result<Permission, sqlx::Error> {
	Ok(Permission {
		id: row.try_get("id")?,
		resource: row.try_get("resource")?,
		action: row.try_get("action")?,
		description: row.try_get("description")?,
	})
}

/// Maps a row of a user's roles.
fn user_role_from_row(row: &SqliteRow) -> Result<UserRole, sqlx::Error> {
	Ok(UserRole {
		role_id: row.try_get("id")?,
		role_name: row.try_get("name")?,
	})
}

/// Maps a row of a user's overrides.
fn override_from_row(row: &SqliteRow) -> Result<UserPermissionOverride, sqlx::Error> {
	Ok(UserPermissionOverride {
		permission_id: row.try_get("id")?,
		effect: row.try_get("effect")?,
		resource: row.try_get("resource")?,
		action: row.try_get("action")?,
	})
}

/// Maps a row of the grants of a user's roles.
fn role_grant_from_row(row: &SqliteRow) -> Result<RolePermissionGrant, sqlx::Error> {
	Ok(RolePermissionGrant {
		role_name: row.try_get("name")?,
		permission_id: row.try_get("id")?,
		effect: row.try_get("effect")?,
		resource: row.try_get("resource")?,
		action: row.try_get("action")?,
	})
}

/// Gets the roles a user holds.
pub async fn get_roles_for_user(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
) -> Result<Vec<UserRole>, sqlx::Error> {
	query(
		r#"
		SELECT
			role.id,
			role.name
		FROM
			user_role
		INNER JOIN
			role
		ON
			role.id = user_role.role_id
		WHERE
			user_role.user_id = $1
		ORDER BY
			role.name;
		"#,
	)
	.bind(user_id)
	.fetch_all(&mut *connection)
	.await?
	.iter()
	.map(user_role_from_row)
	.collect()
}

/// Gets the full permission catalog.
pub async fn get_all_permissions(
	connection: &mut DatabaseConnection,
) -> Result<Vec<Permission>, sqlx::Error> {
	query(
		r#"
		SELECT
			id,
			resource,
			action,
			description
		FROM
			permission
		ORDER BY
			resource,
			action;
		"#,
	)
	.fetch_all(&mut *connection)
	.await?
	.iter()
	.map(permission_from_row)
	.collect()
}

/// Gets the overrides set directly on a user, along with the key of the
/// permission each one applies to.
pub async fn get_overrides_for_user(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
) -> Result<Vec<UserPermissionOverride>, sqlx::Error> {
	query(
		r#"
		SELECT
			permission.id,
			permission.resource,
			permission.action,
			user_permission_override.effect
		FROM
			user_permission_override
		INNER JOIN
			permission
		ON
			permission.id = user_permission_override.permission_id
		WHERE
			user_permission_override.user_id = $1;
		"#,
	)
	.bind(user_id)
	.fetch_all(&mut *connection)
	.await?
	.iter()
	.map(override_from_row)
	.collect()
}

/// Gets the grants of every role a user holds, ordered by role name.
pub async fn get_role_grants_for_user(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
) -> Result<Vec<RolePermissionGrant>, sqlx::Error> {
	query(
		r#"
		SELECT
			role.name,
			permission.id,
			permission.resource,
			permission.action,
			role_permission.effect
		FROM
			user_role
		INNER JOIN
			role
		ON
			role.id = user_role.role_id
		INNER JOIN
			role_permission
		ON
			role_permission.role_id = role.id
		INNER JOIN
			permission
		ON
			permission.id = role_permission.permission_id
		WHERE
			user_role.user_id = $1
		ORDER BY
			role.name,
			permission.resource,
			permission.action;
		"#,
	)
	.bind(user_id)
	.fetch_all(&mut *connection)
	.await?
	.iter()
	.map(role_grant_from_row)
	.collect()
}

/// Creates a new role and returns it.
#[instrument(skip(connection))]
pub async fn create_role(
	connection: &mut DatabaseConnection,
	name: &str,
	description: Option<&str>,
) -> Result<Role, sqlx::Error> {
	let id = Uuid::new_v4();

	query(
		r#"
		INSERT INTO
			role(id, name, description)
		VALUES
			($1, $2, $3);
		"#,
	)
	.bind(id)
	.bind(name)
	.bind(description)
	.execute(&mut *connection)
	.await?;

	info!("Created role `{}`", name);

	Ok(Role {
		id,
		name: name.to_string(),
		description: description.map(str::to_string),
	})
}

/// Gets a role by its name.
pub async fn get_role_by_name(
	connection: &mut DatabaseConnection,
	name: &str,
) -> Result<Option<Role>, sqlx::Error> {
	query(
		r#"
		SELECT
			id,
			name,
			description
		FROM
			role
		WHERE
			name = $1;
		"#,
	)
	.bind(name)
	.fetch_optional(&mut *connection)
	.await?
	.as_ref()
	.map(role_from_row)
	.transpose()
}

/// Lists every role.
pub async fn get_all_roles(connection: &mut DatabaseConnection) -> Result<Vec<Role>, sqlx::Error> {
	query(
		r#"
		SELECT
			id,
			name,
			description
		FROM
			role
		ORDER BY
			name;
		"#,
	)
	.fetch_all(&mut *connection)
	.await?
	.iter()
	.map(role_from_row)
	.collect()
}

/// Gives a role to a user. Assigning a role the user already holds is a
/// no-op.
#[instrument(skip(connection))]
pub async fn assign_role_to_user(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
	role_id: &Uuid,
) -> Result<(), sqlx::Error> {
	query(
		r#"
		INSERT INTO
			user_role(user_id, role_id)
		VALUES
			($1, $2)
		ON CONFLICT(user_id, role_id) DO NOTHING;
		"#,
	)
	.bind(user_id)
	.bind(role_id)
	.execute(&mut *connection)
	.await
	.map(|_| ())
}

/// Takes a role away from a user. Returns false if the user didn't hold it.
#[instrument(skip(connection))]
pub async fn remove_role_from_user(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
	role_id: &Uuid,
) -> Result<bool, sqlx::Error> {
	query(
		r#"
		DELETE FROM
			user_role
		WHERE
			user_id = $1 AND
			role_id = $2;
		"#,
	)
	.bind(user_id)
	.bind(role_id)
	.execute(&mut *connection)
	.await
	.map(|result| result.rows_affected() > 0)
}

/// Gets a permission of the catalog by its key.
pub async fn get_permission_by_key(
	connection: &mut DatabaseConnection,
	key: &PermissionKey,
) -> Result<Option<Permission>, sqlx::Error> {
	query(
		r#"
		SELECT
			id,
			resource,
			action,
			description
		FROM
			permission
		WHERE
			resource = $1 AND
			action = $2;
		"#,
	)
	.bind(&key.resource)
	.bind(&key.action)
	.fetch_optional(&mut *connection)
	.await?
	.as_ref()
	.map(permission_from_row)
	.transpose()
}

/// Grants (or denies) a permission to a role. An existing grant for the same
/// permission has its effect replaced.
#[instrument(skip(connection))]
pub async fn set_role_permission(
	connection: &mut DatabaseConnection,
	role_id: &Uuid,
	permission_id: &Uuid,
	effect: Effect,
) -> Result<(), sqlx::Error> {
	query(
		r#"
		INSERT INTO
			role_permission(role_id, permission_id, effect)
		VALUES
			($1, $2, $3)
		ON CONFLICT(role_id, permission_id) DO UPDATE SET
			effect = EXCLUDED.effect;
		"#,
	)
	.bind(role_id)
	.bind(permission_id)
	.bind(effect)
	.execute(&mut *connection)
	.await
	.map(|_| ())
}

/// Removes a permission from a role. Returns false if the role had no grant
/// for it.
#[instrument(skip(connection))]
pub async fn remove_role_permission(
	connection: &mut DatabaseConnection,
	role_id: &Uuid,
	permission_id: &Uuid,
) -> Result<bool, sqlx::Error> {
	query(
		r#"
		DELETE FROM
			role_permission
		WHERE
			role_id = $1 AND
			permission_id = $2;
		"#,
	)
	.bind(role_id)
	.bind(permission_id)
	.execute(&mut *connection)
	.await
	.map(|result| result.rows_affected() > 0)
}

/// Sets an override on a user for a permission, replacing the effect of any
/// existing override for the same permission.
#[instrument(skip(connection))]
pub async fn set_user_override(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
	permission_id: &Uuid,
	effect: Effect,
) -> Result<(), sqlx::Error> {
	query(
		r#"
		INSERT INTO
			user_permission_override(user_id, permission_id, effect)
		VALUES
			($1, $2, $3)
		ON CONFLICT(user_id, permission_id) DO UPDATE SET
			effect = EXCLUDED.effect;
		"#,
	)
	.bind(user_id)
	.bind(permission_id)
	.bind(effect)
	.execute(&mut *connection)
	.await
	.map(|_| ())
}

/// Removes the override a user has for a permission. Returns false if there
/// was none.
#[instrument(skip(connection))]
pub async fn remove_user_override(
	connection: &mut DatabaseConnection,
	user_id: &Uuid,
	permission_id: &Uuid,
) -> Result<bool, sqlx::Error> {
	query(
		r#"
		DELETE FROM
			user_permission_override
		WHERE
			user_id = $1 AND
			permission_id = $2;
		"#,
	)
	.bind(user_id)
	.bind(permission_id)
	.execute(&mut *connection)
	.await
	.map(|result| result.rows_affected() > 0)
}
