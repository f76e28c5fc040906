use crate::{
	notifier::{ChangeEvent, ChangeNotifier},
	path::VirtualPath,
};

use arcitect_fs_watcher::{FsEvent, FsWatcher};

use std::{path::PathBuf, sync::Arc};

use async_channel as chan;
use tokio::{select, spawn, task::JoinHandle};
use tracing::{debug, error, instrument, trace, Instrument};

/// One native recursive watcher and the task forwarding its events
#[derive(Debug)]
pub(super) struct WatchEntry {
	path: PathBuf,
	watcher: Option<FsWatcher>,
	handle: Option<JoinHandle<()>>,
	stop_tx: chan::Sender<()>,
}

impl WatchEntry {
	#[instrument(name = "watch_entry", skip_all, fields(path = %path.display()))]
	pub(super) fn new(
		path: PathBuf,
		notifier: Arc<ChangeNotifier>,
	) -> Result<Self, arcitect_fs_watcher::Error> {
		let (watcher, events_rx) = FsWatcher::new(&path)?;
		let (stop_tx, stop_rx) = chan::bounded(1);

		let handle = spawn(Self::handle_watch_events(events_rx, stop_rx, notifier).in_current_span());

		Ok(Self {
			path,
			watcher: Some(watcher),
			handle: Some(handle),
			stop_tx,
		})
	}

	async fn handle_watch_events(
		events_rx: chan::Receiver<FsEvent>,
		stop_rx: chan::Receiver<()>,
		notifier: Arc<ChangeNotifier>,
	) {
		loop {
			select! {
				biased;

				_ = stop_rx.recv() => {
					debug!("Stopping watch event handler");
					break;
				}

				res = events_rx.recv() => {
					let Ok(event) = res else {
						debug!("Native watcher gone, stopping watch event handler");
						break;
					};

					// Listings are refreshed per directory, so report the entry's parent
					let Some(parent) = event.parent() else {
						trace!(?event, "Event without parent directory;");
						continue;
					};

					trace!(?event, "Forwarding change;");
					notifier
						.notify(ChangeEvent::new(VirtualPath::from_native(parent)))
						.await;
				}
			}
		}
	}

	/// Release the native watcher and wait for the forwarding task to finish, after this
	/// returns no further event from this entry reaches the notifier
	pub(super) async fn stop(mut self) {
		if self.stop_tx.send(()).await.is_err() {
			trace!(path = %self.path.display(), "Watch event handler already finished;");
		}

		drop(self.watcher.take());

		if let Some(handle) = self.handle.take() {
			if let Err(e) = handle.await {
				error!(?e, path = %self.path.display(), "Failed to join watch event handler;");
			}
		}
	}
}

impl Drop for WatchEntry {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}
}
