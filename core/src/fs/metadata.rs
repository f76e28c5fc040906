use std::fs::Metadata;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of an entry's `lstat` metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
	pub size: u64,
	pub is_file: bool,
	pub is_symlink: bool,
	pub readonly: bool,
	pub accessed: Option<DateTime<Utc>>,
	pub modified: Option<DateTime<Utc>>,
	pub created: Option<DateTime<Utc>>,
	#[serde(flatten)]
	pub unix: Option<UnixMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnixMetadata {
	pub mode: u32,
	pub ino: u64,
	pub dev: u64,
	pub nlink: u64,
	pub uid: u32,
	pub gid: u32,
	pub changed: Option<DateTime<Utc>>,
}

impl From<&Metadata> for EntryMetadata {
	fn from(metadata: &Metadata) -> Self {
		Self {
			size: metadata.len(),
			is_file: metadata.is_file(),
			is_symlink: metadata.file_type().is_symlink(),
			readonly: metadata.permissions().readonly(),
			accessed: metadata.accessed().ok().map(Into::into),
			modified: metadata.modified().ok().map(Into::into),
			created: metadata.created().ok().map(Into::into),
			unix: unix_metadata(metadata),
		}
	}
}

#[cfg(unix)]
fn unix_metadata(metadata: &Metadata) -> Option<UnixMetadata> {
	use std::os::unix::fs::MetadataExt;

	Some(UnixMetadata {
		mode: metadata.mode(),
		ino: metadata.ino(),
		dev: metadata.dev(),
		nlink: metadata.nlink(),
		uid: metadata.uid(),
		gid: metadata.gid(),
		changed: u32::try_from(metadata.ctime_nsec())
			.ok()
			.and_then(|nanos| DateTime::from_timestamp(metadata.ctime(), nanos)),
	})
}

#[cfg(not(unix))]
fn unix_metadata(_: &Metadata) -> Option<UnixMetadata> {
	None
}
