use std::path::{Path, PathBuf};

use notify::{
	event::{ModifyKind, RenameMode},
	Event, EventKind,
};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
	Created,
	Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
	pub kind: FsEventKind,
	pub path: PathBuf,
}

impl FsEvent {
	pub fn created(path: impl Into<PathBuf>) -> Self {
		Self {
			kind: FsEventKind::Created,
			path: path.into(),
		}
	}

	pub fn removed(path: impl Into<PathBuf>) -> Self {
		Self {
			kind: FsEventKind::Removed,
			path: path.into(),
		}
	}

	/// Directory containing the affected entry
	pub fn parent(&self) -> Option<&Path> {
		self.path.parent()
	}
}

/// Reduce a native notification to entry additions and removals.
///
/// Renames become a removal of the old name and a creation of the new one. inotify reports
/// both halves on their own (`From`, `To`) and then once more paired as `Both`, so on Linux the
/// paired event is dropped; halves of a move into or out of the watched tree still come through.
/// FSEvents only reports `RenameMode::Any` for both sides of a rename, so the current state of
/// the path decides which side we are looking at.
pub fn normalize(event: Event) -> Vec<FsEvent> {
	let Event { kind, paths, .. } = event;

	match kind {
		EventKind::Create(_) => paths.into_iter().map(FsEvent::created).collect(),

		EventKind::Remove(_) => paths.into_iter().map(FsEvent::removed).collect(),

		EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
			paths.into_iter().map(FsEvent::removed).collect()
		}

		EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
			paths.into_iter().map(FsEvent::created).collect()
		}

		EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if cfg!(target_os = "linux") => {
			trace!(?paths, "Rename halves already reported;");
			vec![]
		}

		EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
			let mut paths = paths.into_iter();
			match (paths.next(), paths.next()) {
				(Some(from), Some(to)) => vec![FsEvent::removed(from), FsEvent::created(to)],
				(Some(path), None) => vec![by_presence(path)],
				_ => vec![],
			}
		}

		EventKind::Modify(ModifyKind::Name(RenameMode::Any | RenameMode::Other)) => {
			paths.into_iter().map(by_presence).collect()
		}

		other => {
			trace!(?other, "Ignoring event kind;");
			vec![]
		}
	}
}

fn by_presence(path: PathBuf) -> FsEvent {
	if std::fs::symlink_metadata(&path).is_ok() {
		FsEvent::created(path)
	} else {
		FsEvent::removed(path)
	}
}
