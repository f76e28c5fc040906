use crate::{event::normalize, Error, FsEvent, Result};

use std::path::{Path, PathBuf};

use async_channel as chan;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, instrument, trace};

/// A recursive native watcher rooted at a single path.
///
/// Only changes happening after construction are reported; entries that already exist when
/// the watch starts produce no events. Dropping the watcher releases the native handle.
#[derive(Debug)]
pub struct FsWatcher {
	root: PathBuf,
	watcher: RecommendedWatcher,
}

impl FsWatcher {
	#[instrument(skip_all, fields(root = %root.as_ref().display()))]
	pub fn new(root: impl AsRef<Path>) -> Result<(Self, chan::Receiver<FsEvent>)> {
		let root = root.as_ref().to_path_buf();
		let (events_tx, events_rx) = chan::unbounded();

		let mut watcher = RecommendedWatcher::new(
			move |result: notify::Result<Event>| match result {
				Ok(event) => {
					for fs_event in normalize(event) {
						// SAFETY: we are not blocking the thread as this is an unbounded channel
						if events_tx.send_blocking(fs_event).is_err() {
							trace!("Events receiver dropped, discarding watcher event;");
						}
					}
				}
				Err(e) => error!(?e, "Watcher error;"),
			},
			Config::default(),
		)
		.map_err(Error::Create)?;

		watcher
			.watch(&root, RecursiveMode::Recursive)
			.map_err(|source| Error::Watch {
				path: root.clone().into_boxed_path(),
				source,
			})?;

		debug!("Now watching;");

		Ok((Self { root, watcher }, events_rx))
	}
}

impl Drop for FsWatcher {
	fn drop(&mut self) {
		// Fails when the root itself was removed, the native handle is released either way
		if let Err(e) = self.watcher.unwatch(&self.root) {
			debug!(?e, root = %self.root.display(), "Unable to unwatch root;");
		} else {
			trace!(root = %self.root.display(), "Stopped watching;");
		}
	}
}
