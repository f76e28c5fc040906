use crate::{
	config::ServiceConfig,
	fs::{self, DirEntry},
	notifier::ChangeNotifier,
	path::{native_separator, VirtualPath},
	watcher::WatchRegistry,
	Error,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A request from the front-end, tagged by its method name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Request {
	ReadDir(VirtualPath),
	ReadFile(VirtualPath),
	WriteFile(VirtualPath, String),
	CreateEmptyFile(VirtualPath),
	Copy(VirtualPath, VirtualPath),
	#[serde(rename = "registerChangeListener")]
	Watch(VirtualPath),
	#[serde(rename = "unregisterChangeListener")]
	Unwatch(VirtualPath),
	GetPathSeparator,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
	Entries(Vec<DirEntry>),
	Text(String),
	Path(VirtualPath),
	/// Soft-failure status of `copy`
	Status(bool),
	Separator(char),
	Unit,
}

/// Entry point of the core: serves requests and owns the watch registry
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
	notifier: Arc<ChangeNotifier>,
	watchers: Arc<WatchRegistry>,
}

impl LocalFileSystem {
	pub fn new(config: &ServiceConfig) -> Self {
		let notifier = Arc::new(ChangeNotifier::new());
		let watchers = Arc::new(WatchRegistry::with_config(
			Arc::clone(&notifier),
			&config.watcher,
		));

		Self { notifier, watchers }
	}

	pub fn notifier(&self) -> &Arc<ChangeNotifier> {
		&self.notifier
	}

	pub fn watchers(&self) -> &WatchRegistry {
		&self.watchers
	}

	pub async fn read_dir(&self, path: &VirtualPath) -> Result<Vec<DirEntry>, Error> {
		fs::read_dir(path).await
	}

	pub async fn read_file(&self, path: &VirtualPath) -> Result<String, Error> {
		fs::read_file(path).await
	}

	pub async fn write_file(&self, path: &VirtualPath, contents: &str) -> Result<(), Error> {
		fs::write_file(path, contents).await
	}

	pub async fn create_empty_file(&self, path: &VirtualPath) -> Result<VirtualPath, Error> {
		fs::create_empty_file(path).await
	}

	pub async fn copy(&self, source: &VirtualPath, target_dir: &VirtualPath) -> bool {
		fs::copy(source, target_dir).await
	}

	pub async fn watch(&self, path: &VirtualPath) -> Result<(), Error> {
		self.watchers.watch(path).await
	}

	pub async fn unwatch(&self, path: &VirtualPath) {
		self.watchers.unwatch(path).await
	}

	pub fn path_separator(&self) -> char {
		native_separator()
	}

	/// Serve a single request to completion
	#[instrument(skip(self))]
	pub async fn handle(&self, request: Request) -> Result<Response, Error> {
		debug!("Handling request");

		Ok(match request {
			Request::ReadDir(path) => Response::Entries(self.read_dir(&path).await?),
			Request::ReadFile(path) => Response::Text(self.read_file(&path).await?),
			Request::WriteFile(path, contents) => {
				self.write_file(&path, &contents).await?;
				Response::Unit
			}
			Request::CreateEmptyFile(path) => Response::Path(self.create_empty_file(&path).await?),
			Request::Copy(source, target_dir) => {
				Response::Status(self.copy(&source, &target_dir).await)
			}
			Request::Watch(path) => {
				self.watch(&path).await?;
				Response::Unit
			}
			Request::Unwatch(path) => {
				self.unwatch(&path).await;
				Response::Unit
			}
			Request::GetPathSeparator => Response::Separator(self.path_separator()),
		})
	}

	/// Release every native watcher, to be called before the process exits
	pub async fn shutdown(&self) {
		self.watchers.shutdown().await;
	}
}
