use clap::Args;
use comfy_table::Table;
use serde_json::json;

use super::parse_permission_key;
use crate::prelude::*;

/// The arguments that can be passed to the explain command.
#[derive(Debug, Clone, Args)]
pub struct ExplainArgs {
	/// The ID of the user.
	pub user: Uuid,
	/// The permission to explain, as a `resource:action` pair or a legacy
	/// permission name.
	#[arg(value_parser = parse_permission_key)]
	pub permission: PermissionKey,
}

/// Resolves a single permission for a user and shows which tier decided it.
pub(super) async fn execute(
	_: &GlobalArgs,
	args: ExplainArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let service = state.load_user(args.user).await?;
	let Resolution {
		allowed,
		reason,
		source,
	} = service.resolve(&args.permission.resource, &args.permission.action);

	CommandOutput::new(
		Table::new()
			.set_header(["Data", "Value"])
			.add_row(["Permission".to_string(), args.permission.to_string()])
			.add_row(["Allowed".to_string(), allowed.to_string()])
			.add_row(["Decided by".to_string(), source.to_string()])
			.add_row(["Reason".to_string(), reason.clone()])
			.to_string(),
		json!({
			"user": args.user,
			"permission": args.permission,
			"allowed": allowed,
			"source": source,
			"reason": reason,
		}),
	)
}
