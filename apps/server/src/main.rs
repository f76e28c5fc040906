use arcitect_core::{LocalFileSystem, ServiceConfig, VirtualPath};

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{io, select, signal};
use tracing::info;

mod ipc;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "arcitect-server", about = "ARCitect local file system host (JSON lines over stdio)")]
struct Cli {
	/// Path to the service config, created with defaults if missing
	#[arg(long, env = "ARCITECT_CONFIG")]
	config: Option<PathBuf>,

	/// Directory to watch from startup
	#[arg(long)]
	root: Option<PathBuf>,

	/// Log filter directives, overriding the config file
	#[arg(long)]
	log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let mut config = match &cli.config {
		Some(path) => ServiceConfig::load_or_create(path)
			.await
			.with_context(|| format!("unable to load config '{}'", path.display()))?,
		None => ServiceConfig::default(),
	};
	if let Some(filter) = cli.log {
		config.log_filter = filter;
	}

	logging::init(&config)?;

	let local_fs = LocalFileSystem::new(&config);

	if let Some(root) = &cli.root {
		local_fs
			.watch(&VirtualPath::from_native(root))
			.await
			.with_context(|| format!("unable to watch root '{}'", root.display()))?;
	}

	info!("Serving requests on stdio");

	let res = select! {
		res = ipc::run(local_fs.clone(), io::stdin(), io::stdout()) => res,
		_ = signal::ctrl_c() => {
			info!("Interrupted, shutting down");
			Ok(())
		}
	};

	local_fs.shutdown().await;

	res
}
