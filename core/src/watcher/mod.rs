//! Registry of directory watchers, keyed by native path.
//!
//! Each watched path owns exactly one recursive native watcher. Additions and removals of
//! entries anywhere below it are reported to the [`ChangeNotifier`] as a change of the
//! entry's parent directory.
//!
//! All registrations go through a single lock, so racing `watch`/`unwatch` calls on the same
//! path are serialized and can never leave an orphaned native watcher behind. The lock is
//! released before an unwatched entry is stopped, so other paths are never held up by it.
//! Watching an already watched path is a no-op: one `unwatch` always releases the path.

use crate::{config::WatcherConfig, notifier::ChangeNotifier, path::VirtualPath, Error};

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};

mod entry;

use entry::WatchEntry;

#[derive(Debug)]
pub struct WatchRegistry {
	entries: Mutex<HashMap<PathBuf, WatchEntry>>,
	notifier: Arc<ChangeNotifier>,
	enabled: bool,
}

impl WatchRegistry {
	pub fn new(notifier: Arc<ChangeNotifier>) -> Self {
		Self::with_config(notifier, &WatcherConfig::default())
	}

	pub fn with_config(notifier: Arc<ChangeNotifier>, config: &WatcherConfig) -> Self {
		if !config.enabled {
			info!("Directory watcher is disabled, out-of-band changes will not be reported");
		}

		Self {
			entries: Mutex::default(),
			notifier,
			enabled: config.enabled,
		}
	}

	/// Start reporting future additions and removals below `path`
	#[instrument(skip_all, fields(%path))]
	pub async fn watch(&self, path: &VirtualPath) -> Result<(), Error> {
		if !self.enabled {
			debug!("Watcher disabled, ignoring watch request");
			return Ok(());
		}

		let native = path.to_native();
		let mut entries = self.entries.lock().await;

		if entries.contains_key(&native) {
			debug!("Path already watched");
			return Ok(());
		}

		let entry = WatchEntry::new(native.clone(), Arc::clone(&self.notifier))
			.map_err(|e| Error::from((path, e)))?;
		entries.insert(native, entry);

		debug!(watched = entries.len(), "Now watching path");

		Ok(())
	}

	/// Stop watching `path`; unwatching a path that is not watched is not an error
	#[instrument(skip_all, fields(%path))]
	pub async fn unwatch(&self, path: &VirtualPath) {
		let native = path.to_native();

		// Stop outside the lock
		let removed = {
			let mut entries = self.entries.lock().await;
			entries.remove(&native).map(|entry| (entry, entries.len()))
		};

		if let Some((entry, watched)) = removed {
			entry.stop().await;
			debug!(watched, "Stopped watching path");
		} else {
			trace!("Path was not watched");
		}
	}

	pub async fn is_watching(&self, path: &VirtualPath) -> bool {
		self.entries.lock().await.contains_key(&path.to_native())
	}

	pub async fn watched_paths(&self) -> Vec<VirtualPath> {
		self.entries
			.lock()
			.await
			.keys()
			.map(VirtualPath::from_native)
			.collect()
	}

	/// Stop every outstanding watcher
	pub async fn shutdown(&self) {
		let entries = std::mem::take(&mut *self.entries.lock().await);
		let count = entries.len();

		for entry in entries.into_values() {
			entry.stop().await;
		}

		info!(count, "Stopped all directory watchers");
	}
}
