use clap::Args;
use comfy_table::Table;
use serde_json::json;

use crate::prelude::*;

/// The arguments that can be passed to the catalog command.
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
	/// List the legacy permission names and what they map to instead.
	#[arg(long)]
	pub legacy: bool,
}

/// Lists the built-in permission catalog, or the legacy name table. This
/// doesn't need the database.
pub(super) async fn execute(
	_: &GlobalArgs,
	args: CatalogArgs,
	_: AppState,
) -> anyhow::Result<CommandOutput> {
	if args.legacy {
		let mut table = Table::new();
		table.set_header(["Legacy name", "Permission"]);
		for (name, resource, action) in LEGACY_PERMISSIONS {
			table.add_row([name.to_string(), format!("{resource}:{action}")]);
		}

		return CommandOutput::new(
			table.to_string(),
			LEGACY_PERMISSIONS
				.iter()
				.map(|(name, resource, action)| {
					json!({
						"name": name,
						"resource": resource.to_string(),
						"action": action.to_string(),
					})
				})
				.collect::<Vec<_>>(),
		);
	}

	let entries = list_all_permissions();

	let mut table = Table::new();
	table.set_header(["Permission", "Description"]);
	for entry in &entries {
		table.add_row([entry.key().to_string(), entry.description()]);
	}

	CommandOutput::new(
		table.to_string(),
		entries
			.iter()
			.map(|entry| {
				json!({
					"resource": entry.resource.to_string(),
					"action": entry.action.to_string(),
					"description": entry.description(),
				})
			})
			.collect::<Vec<_>>(),
	)
}
