use arcitect_core::ServiceConfig;

use std::{fs::OpenOptions, sync::Mutex};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: stderr always, plus the configured log file.
///
/// Stdout carries the IPC stream, so nothing is ever logged there.
pub fn init(config: &ServiceConfig) -> anyhow::Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.log_filter)
			.with_context(|| format!("invalid log filter '{}'", config.log_filter))?,
	};

	let file_layer = match &config.log_file {
		Some(path) => {
			if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
				std::fs::create_dir_all(parent).with_context(|| {
					format!("unable to create log directory '{}'", parent.display())
				})?;
			}

			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(path)
				.with_context(|| format!("unable to open log file '{}'", path.display()))?;

			Some(
				fmt::layer()
					.with_writer(Mutex::new(file))
					.with_ansi(false)
					.with_target(true)
					.with_thread_ids(true)
					.with_line_number(true),
			)
		}
		None => None,
	};

	let console_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(false);

	tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()?;

	if let Some(path) = &config.log_file {
		info!("Logging to: {}", path.display());
	}

	Ok(())
}
