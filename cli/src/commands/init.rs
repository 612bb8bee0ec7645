use permissions::db;
use serde_json::json;

use crate::prelude::*;

/// Creates the tables on a fresh database and seeds the permission catalog.
pub(super) async fn execute(_: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput> {
	db::initialize(state.source.pool()).await?;

	let mut connection = state.connection().await?;
	let permissions = db::get_all_permissions(&mut connection).await?.len();

	CommandOutput::new(
		format!(
			"Database `{}` is ready with {} permissions",
			state.config.database.file, permissions
		),
		json!({
			"database": state.config.database.file,
			"permissions": permissions,
		}),
	)
}
