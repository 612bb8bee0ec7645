use clap::ValueEnum;
use serde::Serialize;
use sqlx::pool::PoolConnection;
use strum::Display;

use crate::prelude::*;

/// The format the output of a command is printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputType {
	/// Human readable text, usually a table.
	Text,
	/// Compact JSON.
	Json,
	/// Indented JSON.
	PrettyJson,
}

/// The output of a command, in both of the formats it can be printed in.
#[derive(Debug, Clone)]
pub struct CommandOutput {
	/// The output shown for [`OutputType::Text`].
	pub text: String,
	/// The output shown for [`OutputType::Json`] and
	/// [`OutputType::PrettyJson`].
	pub json: serde_json::Value,
}

impl CommandOutput {
	/// Creates an output from its text form and anything that serializes to
	/// the JSON form.
	pub fn new(text: impl Into<String>, json: impl Serialize) -> anyhow::Result<Self> {
		Ok(Self {
			text: text.into(),
			json: serde_json::to_value(json)?,
		})
	}
}

/// Everything a command needs to run.
#[derive(Debug, Clone)]
pub struct AppState {
	/// The permission source, backed by the configured database.
	pub source: SqlPermissionSource,
	/// The parsed configuration.
	pub config: AppConfig,
}

impl AppState {
	/// Takes a connection from the database pool.
	pub async fn connection(&self) -> anyhow::Result<PoolConnection<DatabaseType>> {
		Ok(self.source.pool().acquire().await?)
	}

	/// Creates a permission service and loads the snapshot of `user_id` into
	/// it.
	pub async fn load_user(&self, user_id: Uuid) -> anyhow::Result<PermissionService<SqlPermissionSource>> {
		let service = PermissionService::new(self.source.clone());
		service.refresh(user_id).await;
		if let Some(error) = service.last_error() {
			anyhow::bail!("unable to load permissions for `{user_id}`: {error}");
		}
		Ok(service)
	}
}

/// A command that can be run by the CLI.
pub trait CommandExecutor {
	/// Runs the command and returns what it should print.
	async fn execute(self, global_args: &GlobalArgs, state: AppState) -> anyhow::Result<CommandOutput>;
}
