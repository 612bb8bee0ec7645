#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A CLI tool for inspecting and managing the roles, grants and overrides of
//! portal users, and for checking what a user is allowed to do.

use clap::Parser;
use permissions::{db, utils::config::AppConfig};
use tracing::{Dispatch, Level};
use tracing_subscriber::{
	filter::LevelFilter,
	fmt::{format::FmtSpan, Layer as FmtLayer},
	layer::SubscriberExt,
	prelude::*,
};

use crate::prelude::*;

/// All items related to running the CLI goes here
mod app;
/// All the commands, arguments and the functionalities for it.
mod commands;

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use permissions::prelude::*;
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::{
		app::{AppState, CommandExecutor, CommandOutput, OutputType},
		commands::{AppArgs, GlobalArgs, GlobalCommands},
	};
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let AppArgs {
		global_args,
		command,
	} = AppArgs::parse();

	let mut config = AppConfig::parse()?;
	if let Some(file) = &global_args.database {
		config.database.file = file.clone();
	}

	tracing::dispatcher::set_global_default(Dispatch::new(
		tracing_subscriber::registry().with(
			FmtLayer::new()
				.with_writer(std::io::stderr)
				.with_span_events(FmtSpan::NONE)
				.event_format(
					tracing_subscriber::fmt::format()
						.with_ansi(true)
						.with_file(false)
						.without_time()
						.compact(),
				)
				.with_filter(
					tracing_subscriber::filter::Targets::new()
						.with_target(env!("CARGO_PKG_NAME"), LevelFilter::TRACE)
						.with_target("permissions", LevelFilter::TRACE)
						.with_target("models", LevelFilter::TRACE),
				)
				.with_filter(LevelFilter::from_level(if global_args.verbose {
					Level::TRACE
				} else if config.environment == RunningEnvironment::Development {
					Level::DEBUG
				} else {
					Level::INFO
				})),
		),
	))?;

	let database = db::connect(&config.database).await?;
	let state = AppState {
		source: SqlPermissionSource::new(database),
		config,
	};

	let output_type = global_args.output;
	let output = command.execute(&global_args, state).await?;

	println!(
		"{}",
		match output_type {
			OutputType::Text => output.text,
			OutputType::Json => serde_json::to_string(&output.json)?,
			OutputType::PrettyJson => serde_json::to_string_pretty(&output.json)?,
		}
	);

	Ok(())
}
