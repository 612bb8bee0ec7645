use clap::{Args, Subcommand};
use serde_json::json;

use super::{find_permission, parse_permission_key};
use crate::prelude::*;

/// A list of all the commands that manage user overrides.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum OverrideCommands {
	/// Allow or deny a permission for a single user, regardless of their
	/// roles.
	Set(SetOverrideArgs),
	/// Remove the override a user has for a permission.
	#[command(alias = "rm")]
	Remove(RemoveOverrideArgs),
}

/// The arguments that can be passed to the set override command.
#[derive(Debug, Clone, Args)]
pub struct SetOverrideArgs {
	/// The ID of the user.
	pub user: Uuid,
	/// The permission, as a `resource:action` pair or a legacy permission
	/// name.
	#[arg(value_parser = parse_permission_key)]
	pub permission: PermissionKey,
	/// Either `allow` or `deny`.
	pub effect: Effect,
}

/// The arguments that can be passed to the remove override command.
#[derive(Debug, Clone, Args)]
pub struct RemoveOverrideArgs {
	/// The ID of the user.
	pub user: Uuid,
	/// The permission, as a `resource:action` pair or a legacy permission
	/// name.
	#[arg(value_parser = parse_permission_key)]
	pub permission: PermissionKey,
}

impl CommandExecutor for OverrideCommands {
	async fn execute(self, _: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput> {
		let mut connection = state.connection().await?;

		match self {
			Self::Set(SetOverrideArgs {
				user,
				permission,
				effect,
			}) => {
				let stored = find_permission(&mut connection, &permission).await?;
				permissions::db::set_user_override(&mut connection, &user, &stored.id, effect)
					.await?;

				CommandOutput::new(
					format!("User `{user}` now has an explicit {effect} for `{permission}`"),
					json!({
						"user": user,
						"permission": permission,
						"effect": effect,
					}),
				)
			}
			Self::Remove(RemoveOverrideArgs { user, permission }) => {
				let stored = find_permission(&mut connection, &permission).await?;
				let removed =
					permissions::db::remove_user_override(&mut connection, &user, &stored.id)
						.await?;

				CommandOutput::new(
					if removed {
						format!("Removed the override of user `{user}` for `{permission}`")
					} else {
						format!("User `{user}` had no override for `{permission}`")
					},
					json!({
						"user": user,
						"permission": permission,
						"removed": removed,
					}),
				)
			}
		}
	}
}
