//! Recursive filesystem watcher emitting normalized events.
//!
//! Native notifications differ a lot between inotify, FSEvents and `ReadDirectoryChangesW`.
//! Consumers of this crate only care about entries appearing and disappearing, so every
//! native event is reduced to zero or more [`FsEvent`]s of kind [`FsEventKind::Created`] or
//! [`FsEventKind::Removed`]. Content modifications and access events are dropped.

use std::path::Path;

use thiserror::Error;

mod event;
mod watcher;

pub use event::{normalize, FsEvent, FsEventKind};
pub use watcher::FsWatcher;

#[derive(Error, Debug)]
pub enum Error {
	#[error("failed to create native watcher: {0}")]
	Create(#[source] notify::Error),
	#[error("failed to watch path: <path='{}'>: {source}", .path.display())]
	Watch {
		path: Box<Path>,
		#[source]
		source: notify::Error,
	},
}

impl Error {
	/// Whether the failure was caused by the watched path not existing
	pub fn is_path_not_found(&self) -> bool {
		let source = match self {
			Self::Create(source) | Self::Watch { source, .. } => source,
		};

		match &source.kind {
			notify::ErrorKind::PathNotFound => true,
			notify::ErrorKind::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
