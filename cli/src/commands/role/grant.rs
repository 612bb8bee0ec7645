use clap::Args;
use serde_json::json;

use crate::{
	commands::{find_permission, find_role, parse_permission_key},
	prelude::*,
};

/// The arguments that can be passed to the grant command.
#[derive(Debug, Clone, Args)]
pub struct GrantArgs {
	/// The name of the role.
	pub role: String,
	/// The permission, as a `resource:action` pair or a legacy permission
	/// name.
	#[arg(value_parser = parse_permission_key)]
	pub permission: PermissionKey,
	/// Deny the permission instead. A deny on any role of a user beats an
	/// allow on every other role.
	#[arg(long)]
	pub deny: bool,
}

/// The arguments that can be passed to the revoke command.
#[derive(Debug, Clone, Args)]
pub struct RevokeArgs {
	/// The name of the role.
	pub role: String,
	/// The permission, as a `resource:action` pair or a legacy permission
	/// name.
	#[arg(value_parser = parse_permission_key)]
	pub permission: PermissionKey,
}

/// Grants or denies a permission on a role, replacing any existing grant for
/// the same permission.
pub(super) async fn grant(
	_: &GlobalArgs,
	args: GrantArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let effect = if args.deny { Effect::Deny } else { Effect::Allow };

	let mut connection = state.connection().await?;
	let role = find_role(&mut connection, &args.role).await?;
	let permission = find_permission(&mut connection, &args.permission).await?;

	permissions::db::set_role_permission(&mut connection, &role.id, &permission.id, effect)
		.await?;

	CommandOutput::new(
		format!("Role `{}` now has {} for `{}`", role.name, effect, args.permission),
		json!({
			"role": role.name,
			"permission": args.permission,
			"effect": effect,
		}),
	)
}

/// Removes a permission from a role.
pub(super) async fn revoke(
	_: &GlobalArgs,
	args: RevokeArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let mut connection = state.connection().await?;
	let role = find_role(&mut connection, &args.role).await?;
	let permission = find_permission(&mut connection, &args.permission).await?;

	let removed =
		permissions::db::remove_role_permission(&mut connection, &role.id, &permission.id).await?;

	CommandOutput::new(
		if removed {
			format!("Revoked `{}` from role `{}`", args.permission, role.name)
		} else {
			format!("Role `{}` had no grant for `{}`", role.name, args.permission)
		},
		json!({
			"role": role.name,
			"permission": args.permission,
			"removed": removed,
		}),
	)
}
