use clap::Subcommand;

use self::{
	assign::AssignArgs,
	create::CreateArgs,
	grant::{GrantArgs, RevokeArgs},
};
use crate::prelude::*;

/// Giving roles to users and taking them away.
mod assign;
/// Creating a role.
mod create;
/// Granting, denying and revoking permissions on a role.
mod grant;
/// Listing the roles.
mod list;

/// A list of all the commands that manage roles.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum RoleCommands {
	/// Create a new role.
	Create(CreateArgs),
	/// List every role.
	#[command(alias = "ls")]
	List,
	/// Give a role to a user.
	Assign(AssignArgs),
	/// Take a role away from a user.
	#[command(alias = "unassign")]
	Remove(AssignArgs),
	/// Grant a permission to a role, or deny it with `--deny`.
	Grant(GrantArgs),
	/// Remove a permission from a role.
	Revoke(RevokeArgs),
}

impl CommandExecutor for RoleCommands {
	async fn execute(self, global_args: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput> {
		match self {
			Self::Create(args) => create::execute(global_args, args, state).await,
			Self::List => list::execute(global_args, state).await,
			Self::Assign(args) => assign::assign(global_args, args, state).await,
			Self::Remove(args) => assign::remove(global_args, args, state).await,
			Self::Grant(args) => grant::grant(global_args, args, state).await,
			Self::Revoke(args) => grant::revoke(global_args, args, state).await,
		}
	}
}
