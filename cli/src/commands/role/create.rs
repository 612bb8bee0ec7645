use clap::Args;

use crate::prelude::*;

/// The arguments that can be passed to the create role command.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
	/// The unique name of the role.
	pub name: String,
	/// What the role is for.
	#[arg(short, long)]
	pub description: Option<String>,
}

/// Creates a new role without any permissions.
pub(super) async fn execute(
	_: &GlobalArgs,
	args: CreateArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let mut connection = state.connection().await?;

	if permissions::db::get_role_by_name(&mut connection, &args.name)
		.await?
		.is_some()
	{
		anyhow::bail!("a role named `{}` already exists", args.name);
	}

	let role = permissions::db::create_role(
		&mut connection,
		&args.name,
		args.description.as_deref(),
	)
	.await?;

	if role.name == SUPER_ADMIN_ROLE {
		warn!("Users given the `{}` role are granted every permission", SUPER_ADMIN_ROLE);
	}

	CommandOutput::new(format!("Created role `{}` ({})", role.name, role.id), role)
}
