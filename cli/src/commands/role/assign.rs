use clap::Args;
use serde_json::json;

use crate::{
	commands::find_role,
	prelude::*,
};

/// The arguments that can be passed to the assign and remove role commands.
#[derive(Debug, Clone, Args)]
pub struct AssignArgs {
	/// The ID of the user.
	pub user: Uuid,
	/// The name of the role.
	pub role: String,
}

/// Gives a role to a user.
pub(super) async fn assign(
	_: &GlobalArgs,
	args: AssignArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let mut connection = state.connection().await?;
	let role = find_role(&mut connection, &args.role).await?;

	permissions::db::assign_role_to_user(&mut connection, &args.user, &role.id).await?;

	CommandOutput::new(
		format!("User `{}` now has the role `{}`", args.user, role.name),
		json!({
			"user": args.user,
			"role": role.name,
		}),
	)
}

/// Takes a role away from a user.
pub(super) async fn remove(
	_: &GlobalArgs,
	args: AssignArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let mut connection = state.connection().await?;
	let role = find_role(&mut connection, &args.role).await?;

	let removed =
		permissions::db::remove_role_from_user(&mut connection, &args.user, &role.id).await?;

	CommandOutput::new(
		if removed {
			format!("Removed the role `{}` from user `{}`", role.name, args.user)
		} else {
			format!("User `{}` didn't have the role `{}`", args.user, role.name)
		},
		json!({
			"user": args.user,
			"role": role.name,
			"removed": removed,
		}),
	)
}
