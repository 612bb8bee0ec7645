use clap::Args;
use comfy_table::Table;
use serde_json::json;

use crate::prelude::*;

/// The arguments that can be passed to the effective permissions command.
#[derive(Debug, Clone, Args)]
pub struct EffectiveArgs {
	/// The ID of the user.
	pub user: Uuid,
	/// Only list the permissions the user is granted.
	#[arg(long)]
	pub granted_only: bool,
}

/// Lists every permission of the catalog with the decision for the user, the
/// way the permission manager screen shows it.
pub(super) async fn execute(
	_: &GlobalArgs,
	args: EffectiveArgs,
	state: AppState,
) -> anyhow::Result<CommandOutput> {
	let service = state.load_user(args.user).await?;
	let roles = service
		.current()
		.status
		.snapshot()
		.map(|snapshot| snapshot.roles().iter().cloned().collect::<Vec<_>>())
		.unwrap_or_default();

	let effective = service
		.effective_permissions()
		.into_iter()
		.filter(|(_, resolution)| !args.granted_only || resolution.allowed)
		.collect::<Vec<_>>();

	let mut table = Table::new();
	table.set_header(["Permission", "Allowed", "Decided by", "Reason"]);
	for (permission, resolution) in &effective {
		table.add_row([
			permission.key().to_string(),
			resolution.allowed.to_string(),
			resolution.source.to_string(),
			resolution.reason.clone(),
		]);
	}

	CommandOutput::new(
		format!(
			"Roles: {}\n{table}",
			if roles.is_empty() {
				"(none)".to_string()
			} else {
				roles.join(", ")
			}
		),
		json!({
			"user": args.user,
			"roles": roles,
			"permissions": effective
				.iter()
				.map(|(permission, resolution)| {
					json!({
						"resource": permission.resource,
						"action": permission.action,
						"allowed": resolution.allowed,
						"source": resolution.source,
						"reason": resolution.reason,
					})
				})
				.collect::<Vec<_>>(),
		}),
	)
}
