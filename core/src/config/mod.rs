//! Service configuration

use arcitect_utils::error::FileIOError;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("invalid config file: <path='{}'>: {source}", .path.display())]
	Parse {
		path: Box<Path>,
		#[source]
		source: serde_json::Error,
	},
	#[error("failed to serialize config: {0}")]
	Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
	/// `tracing_subscriber::EnvFilter` directives, `RUST_LOG` takes precedence
	pub log_filter: String,

	/// Also append logs to this file
	pub log_file: Option<PathBuf>,

	pub watcher: WatcherConfig,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			log_filter: "info".to_string(),
			log_file: None,
			watcher: WatcherConfig::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
	/// When disabled, watch requests are accepted but no native watcher is created
	pub enabled: bool,
}

impl Default for WatcherConfig {
	fn default() -> Self {
		Self { enabled: true }
	}
}

impl ServiceConfig {
	/// Load the config at `path`, writing the defaults there first if it does not exist
	pub async fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		match fs::read(path).await {
			Ok(bytes) => {
				info!(path = %path.display(), "Loading config");
				serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
					path: path.into(),
					source,
				})
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				warn!(path = %path.display(), "No config found, creating default");
				let config = Self::default();
				config.save(path).await?;
				Ok(config)
			}
			Err(e) => Err(FileIOError::from((path, e, "reading config")).into()),
		}
	}

	pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
		let path = path.as_ref();

		if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| FileIOError::from((parent, e, "creating config directory")))?;
		}

		fs::write(path, serde_json::to_vec_pretty(self)?)
			.await
			.map_err(|e| FileIOError::from((path, e, "writing config")).into())
	}
}
