//! Delivery of directory change events to the front-end.
//!
//! Several surfaces (windows, IPC connections) may be attached, but only the most recently
//! active one receives events. Delivery is best effort: with no reachable surface the event
//! is dropped, never queued.

use crate::path::VirtualPath;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};
use uuid::Uuid;

pub type SurfaceId = Uuid;

/// A watched directory whose listing is stale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
	pub affected_directory: VirtualPath,
}

impl ChangeEvent {
	pub fn new(affected_directory: VirtualPath) -> Self {
		Self { affected_directory }
	}
}

#[derive(Debug, Default)]
pub struct ChangeNotifier {
	// Ordered by activity, the last one is the active surface
	surfaces: Mutex<Vec<(SurfaceId, mpsc::UnboundedSender<ChangeEvent>)>>,
}

impl ChangeNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Attach a new surface, which becomes the active one
	pub async fn subscribe(&self) -> Surface {
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let id = Uuid::new_v4();

		self.surfaces.lock().await.push((id, events_tx));
		debug!(%id, "Surface attached;");

		Surface { id, events_rx }
	}

	/// Make an attached surface the active one again, returns `false` if it is gone
	pub async fn focus(&self, id: SurfaceId) -> bool {
		let mut surfaces = self.surfaces.lock().await;

		let Some(idx) = surfaces
			.iter()
			.position(|(surface_id, events_tx)| *surface_id == id && !events_tx.is_closed())
		else {
			return false;
		};

		let surface = surfaces.remove(idx);
		surfaces.push(surface);

		true
	}

	/// Deliver `event` to the active surface, returns whether any surface received it.
	///
	/// Surfaces found detached on the way are pruned and the next most recent one is tried.
	pub async fn notify(&self, event: ChangeEvent) -> bool {
		let mut surfaces = self.surfaces.lock().await;

		while let Some((id, events_tx)) = surfaces.last() {
			if events_tx.send(event.clone()).is_ok() {
				trace!(%id, directory = %event.affected_directory, "Change event delivered;");
				return true;
			}

			debug!(%id, "Pruning detached surface;");
			surfaces.pop();
		}

		trace!(directory = %event.affected_directory, "No active surface, dropping change event;");

		false
	}
}

/// Receiving end of a front-end surface; dropping it detaches the surface
#[derive(Debug)]
pub struct Surface {
	id: SurfaceId,
	events_rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl Surface {
	pub fn id(&self) -> SurfaceId {
		self.id
	}

	pub async fn recv(&mut self) -> Option<ChangeEvent> {
		self.events_rx.recv().await
	}

	pub fn try_recv(&mut self) -> Option<ChangeEvent> {
		self.events_rx.try_recv().ok()
	}
}
