use crate::path::VirtualPath;

use std::io;

use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the request operations.
///
/// `copy` never returns these, it reports a plain status flag instead.
#[derive(Error, Debug)]
pub enum Error {
	#[error("path not found: <path='{0}'>")]
	NotFound(VirtualPath),
	#[error("not a directory: <path='{0}'>")]
	NotADirectory(VirtualPath),
	#[error("permission denied: <path='{0}'>")]
	PermissionDenied(VirtualPath),
	#[error("an entry already exists: <path='{0}'>")]
	AlreadyExists(VirtualPath),
	#[error("file is not valid UTF-8 text: <path='{0}'>")]
	Decode(VirtualPath),
	#[error("I/O error: {source}; path: '{path}'")]
	Io {
		path: VirtualPath,
		#[source]
		source: io::Error,
	},
	#[error("unable to watch path: <path='{path}'>")]
	Watcher {
		path: VirtualPath,
		#[source]
		source: arcitect_fs_watcher::Error,
	},
}

/// Stable, serializable discriminant of [`Error`] for the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
	NotFound,
	NotADirectory,
	PermissionDenied,
	AlreadyExists,
	Decode,
	Io,
	Watcher,
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NotFound(_) => ErrorKind::NotFound,
			Self::NotADirectory(_) => ErrorKind::NotADirectory,
			Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
			Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
			Self::Decode(_) => ErrorKind::Decode,
			Self::Io { .. } => ErrorKind::Io,
			Self::Watcher { .. } => ErrorKind::Watcher,
		}
	}

	pub fn path(&self) -> &VirtualPath {
		match self {
			Self::NotFound(path)
			| Self::NotADirectory(path)
			| Self::PermissionDenied(path)
			| Self::AlreadyExists(path)
			| Self::Decode(path)
			| Self::Io { path, .. }
			| Self::Watcher { path, .. } => path,
		}
	}
}

impl From<(&VirtualPath, io::Error)> for Error {
	fn from((path, source): (&VirtualPath, io::Error)) -> Self {
		let path = path.clone();
		match source.kind() {
			io::ErrorKind::NotFound => Self::NotFound(path),
			io::ErrorKind::NotADirectory => Self::NotADirectory(path),
			io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
			io::ErrorKind::AlreadyExists => Self::AlreadyExists(path),
			io::ErrorKind::InvalidData => Self::Decode(path),
			_ => Self::Io { path, source },
		}
	}
}

impl From<(&VirtualPath, arcitect_fs_watcher::Error)> for Error {
	fn from((path, source): (&VirtualPath, arcitect_fs_watcher::Error)) -> Self {
		if source.is_path_not_found() {
			Self::NotFound(path.clone())
		} else {
			Self::Watcher {
				path: path.clone(),
				source,
			}
		}
	}
}
