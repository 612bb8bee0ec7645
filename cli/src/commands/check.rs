use clap::Args;
use comfy_table::Table;
use serde_json::json;

use crate::prelude::*;

/// The arguments that can be passed to the check command.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
	/// The ID of the user to check.
	pub user: Uuid,
	/// The permissions to check. Each one is a `resource:action` pair or a
	/// legacy permission name.
	#[arg(required = true)]
	pub permissions: Vec<String>,
	/// Require every permission to be granted, instead of any of them.
	#[arg(long)]
	pub all: bool,
}

/// Checks a list of permissions for a user, the same way a screen guarded by
/// them would.
pub(super) async fn execute(
	_: &GlobalArgs,
	args: CheckArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let service = state.load_user(args.user).await?;

	let requests = args
		.permissions
		.iter()
		.map(|permission| PermissionRequest::from(permission.as_str()))
		.collect::<Vec<_>>();

	let granted = if args.all {
		service.check_all(&requests)
	} else {
		service.check_any(&requests)
	};

	let mut table = Table::new();
	table.set_header(["Permission", "Allowed"]);
	let results = args
		.permissions
		.iter()
		.zip(&requests)
		.map(|(permission, request)| {
			let allowed = match request {
				PermissionRequest::Structured { resource, action } => {
					service.check(resource, action)
				}
				PermissionRequest::Legacy(name) => service.check_legacy(name),
			};
			table.add_row([permission.clone(), allowed.to_string()]);
			json!({
				"permission": permission,
				"allowed": allowed,
			})
		})
		.collect::<Vec<_>>();

	CommandOutput::new(
		format!(
			"{table}\n{} of the permissions: {}",
			if args.all { "All" } else { "Any" },
			if granted { "granted" } else { "denied" }
		),
		json!({
			"user": args.user,
			"mode": if args.all { "all" } else { "any" },
			"granted": granted,
			"permissions": results,
		}),
	)
}
