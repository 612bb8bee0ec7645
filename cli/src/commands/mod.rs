use clap::{Args, Parser, Subcommand};

use self::{
	catalog::CatalogArgs,
	check::CheckArgs,
	effective::EffectiveArgs,
	explain::ExplainArgs,
	overrides::OverrideCommands,
	role::RoleCommands,
};
use crate::prelude::*;

/// The command to list the built-in permission catalog.
mod catalog;
/// The command to check a set of permissions for a user.
mod check;
/// The command to list every permission a user has, with the reasons.
mod effective;
/// The command to explain how a single permission is decided for a user.
mod explain;
/// The command to create the tables and seed the permission catalog.
mod init;
/// The commands to set and remove user overrides.
mod overrides;
/// The commands to manage roles, their grants and who holds them.
mod role;

/// A list of all the arguments that can be passed to the CLI.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct AppArgs {
	/// All global arguments that can be used across all commands.
	#[command(flatten)]
	pub global_args: GlobalArgs,
	/// A command that is called on the CLI.
	#[command(subcommand)]
	pub command: GlobalCommands,
}

/// A global list of all the arguments that can be passed to the CLI.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
	/// The output type of each command. Defaults to text.
	#[arg(short = 'o', long, global = true, default_value_t = OutputType::Text)]
	pub output: OutputType,
	/// The database file to use, instead of the one in the config.
	#[arg(long, global = true)]
	pub database: Option<String>,
	/// Log everything, including every permission decision.
	#[arg(short = 'v', long, global = true)]
	pub verbose: bool,
}

/// A list of all the commands that can be called on the CLI.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum GlobalCommands {
	/// Create the tables and seed the permission catalog.
	Init,
	/// List the built-in permissions, or the legacy permission names.
	Catalog(CatalogArgs),
	/// Check whether a user has the given permissions.
	Check(CheckArgs),
	/// Explain how a permission is decided for a user.
	#[command(alias = "why")]
	Explain(ExplainArgs),
	/// List every permission of the catalog and whether a user has it.
	Effective(EffectiveArgs),
	/// Manage roles, their grants and who holds them.
	#[command(subcommand, alias = "roles")]
	Role(RoleCommands),
	/// Manage the overrides set directly on users.
	#[command(subcommand, alias = "overrides")]
	Override(OverrideCommands),
}

impl CommandExecutor for GlobalCommands {
	async fn execute(self, global_args: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput> {
		match self {
			Self::Init => init::execute(global_args, state).await,
			Self::Catalog(args) => catalog::execute(global_args, args, state).await,
			Self::Check(args) => check::execute(global_args, args, state).await,
			Self::Explain(args) => explain::execute(global_args, args, state).await,
			Self::Effective(args) => effective::execute(global_args, args, state).await,
			Self::Role(commands) => commands.execute(global_args, state).await,
			Self::Override(commands) => commands.execute(global_args, state).await,
		}
	}
}

/// Parses a permission given on the command line. This is either a
/// `resource:action` pair or a legacy permission name. A pair naming a
/// resource of the catalog must use an action that resource supports, while
/// resources outside the catalog are taken as-is.
pub(crate) fn parse_permission_key(value: &str) -> Result<PermissionKey, String> {
	if let Some(entry) = legacy_permission(value) {
		return Ok(entry.key());
	}

	let Some((resource, action)) = value
		.split_once(':')
		.filter(|(resource, action)| !resource.is_empty() && !action.is_empty())
	else {
		return Err(format!(
			"`{value}` is neither a `resource:action` pair nor a known legacy permission"
		));
	};

	if let Ok(known) = resource.parse::<Resource>() {
		let supported = action
			.parse::<Action>()
			.is_ok_and(|action| known.supports(action));
		if !supported {
			return Err(format!(
				"`{resource}` does not support the `{action}` action"
			));
		}
	}

	Ok(PermissionKey::new(resource, action))
}

/// Looks up a permission of the catalog, failing if it doesn't exist.
pub(crate) async fn find_permission(
	connection: &mut DatabaseConnection,
	key: &PermissionKey,
) -> anyhow::Result<Permission> {
	permissions::db::get_permission_by_key(connection, key)
		.await?
		.ok_or_else(|| anyhow::anyhow!("`{key}` is not in the permission catalog"))
}

/// Looks up a role by its name, failing if it doesn't exist.
pub(crate) async fn find_role(connection: &mut DatabaseConnection, name: &str) -> anyhow::Result<Role> {
	permissions::db::get_role_by_name(connection, name)
		.await?
		.ok_or_else(|| anyhow::anyhow!("there is no role named `{name}`"))
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn arguments_are_valid() {
		AppArgs::command().debug_assert();
	}

	#[test]
	fn parses_structured_and_legacy_permissions() {
		assert_eq!(
			parse_permission_key("hardware:approve").unwrap(),
			PermissionKey::new("hardware", "approve")
		);
		assert_eq!(
			parse_permission_key("approve_hardware_request").unwrap(),
			PermissionKey::new("hardware", "approve")
		);
		assert!(parse_permission_key("approve").is_err());
		assert!(parse_permission_key(":approve").is_err());
	}

	#[test]
	fn rejects_actions_a_catalog_resource_does_not_support() {
		assert!(parse_permission_key("hardware:send").is_err());
		assert!(parse_permission_key("hardware:not_an_action").is_err());
		assert_eq!(
			parse_permission_key("newsletters:send").unwrap(),
			PermissionKey::new("newsletters", "send")
		);
		assert_eq!(
			parse_permission_key("custom_widget:frobnicate").unwrap(),
			PermissionKey::new("custom_widget", "frobnicate")
		);
	}

	#[test]
	fn parses_a_role_grant() {
		let AppArgs {
			global_args,
			command,
		} = AppArgs::parse_from([
			"portal-perms",
			"-o",
			"json",
			"role",
			"grant",
			"manager",
			"hardware:approve",
			"--deny",
		]);
		assert_eq!(global_args.output, OutputType::Json);
		assert!(matches!(
			command,
			GlobalCommands::Role(RoleCommands::Grant(ref args))
				if args.role == "manager" && args.deny
		));
	}
}
