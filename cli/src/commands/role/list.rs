use comfy_table::Table;

use crate::prelude::*;

/// Lists every role.
pub(super) async fn execute(_: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput> {
	let mut connection = state.connection().await?;
	let roles = permissions::db::get_all_roles(&mut connection).await?;

	let mut table = Table::new();
	table.set_header(["ID", "Name", "Description"]);
	for role in &roles {
		table.add_row([
			role.id.to_string(),
			role.name.clone(),
			role.description.clone().unwrap_or_default(),
		]);
	}

	CommandOutput::new(table.to_string(), roles)
}
