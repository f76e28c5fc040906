use crate::{path::VirtualPath, Error};

use super::EntryMetadata;

use std::io;

use serde::Serialize;
use tokio::fs;
use tracing::{instrument, trace};

/// Entries whose name starts with one of these are internal to ARC tooling and never listed
pub const RESERVED_PREFIXES: [&str; 3] = ["isa.", ".git", ".arc"];

pub fn is_reserved(name: &str) -> bool {
	RESERVED_PREFIXES
		.iter()
		.any(|prefix| name.starts_with(prefix))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
	pub id: VirtualPath,
	pub is_directory: bool,
	#[serde(flatten)]
	pub metadata: EntryMetadata,
}

impl DirEntry {
	fn new(id: VirtualPath, metadata: &std::fs::Metadata) -> Self {
		Self {
			id,
			is_directory: metadata.is_dir(),
			metadata: metadata.into(),
		}
	}
}

/// List the immediate children of `path`, in whatever order the OS hands them out.
///
/// Entries are described with `lstat` semantics, so symlinks are reported as such and not
/// followed. An entry vanishing between the listing and its `lstat` is skipped.
#[instrument(skip_all, fields(%path))]
pub async fn read_dir(path: &VirtualPath) -> Result<Vec<DirEntry>, Error> {
	let native = path.to_native();

	if !fs::metadata(&native)
		.await
		.map_err(|e| (path, e))?
		.is_dir()
	{
		return Err(Error::NotADirectory(path.clone()));
	}

	let mut read_dir = fs::read_dir(&native).await.map_err(|e| (path, e))?;
	let mut entries = vec![];

	while let Some(entry) = read_dir.next_entry().await.map_err(|e| (path, e))? {
		let file_name = entry.file_name();
		let name = file_name.to_string_lossy();

		if is_reserved(&name) {
			trace!(%name, "Skipping reserved entry;");
			continue;
		}

		let entry_path = entry.path();
		let id = VirtualPath::from_native(&entry_path);

		match fs::symlink_metadata(&entry_path).await {
			Ok(metadata) => entries.push(DirEntry::new(id, &metadata)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				trace!(%id, "Entry vanished while listing;");
			}
			Err(e) => return Err((&id, e).into()),
		}
	}

	Ok(entries)
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::ErrorKind;

	use tempfile::tempdir;

	#[test]
	fn reserved_prefixes() {
		assert!(is_reserved("isa.investigation.xlsx"));
		assert!(is_reserved(".git"));
		assert!(is_reserved(".gitattributes"));
		assert!(is_reserved(".arc"));
		assert!(!is_reserved("assays"));
		assert!(!is_reserved("isa_notes.md"));
		assert!(!is_reserved("my.git"));
	}

	#[tokio::test]
	async fn lists_children_without_reserved_entries() {
		let dir = tempdir().unwrap();
		let root = dir.path();
		std::fs::create_dir(root.join("assays")).unwrap();
		std::fs::create_dir(root.join(".git")).unwrap();
		std::fs::create_dir(root.join(".arc")).unwrap();
		std::fs::write(root.join("README.md"), "# arc").unwrap();
		std::fs::write(root.join("isa.investigation.xlsx"), "").unwrap();
		std::fs::write(root.join(".gitignore"), "").unwrap();
		std::fs::write(root.join("assays").join("nested.md"), "").unwrap();

		let mut entries = read_dir(&VirtualPath::from_native(root)).await.unwrap();
		entries.sort_by(|a, b| a.id.cmp(&b.id));

		let names = entries
			.iter()
			.map(|entry| entry.id.file_name().unwrap())
			.collect::<Vec<_>>();
		assert_eq!(names, ["README.md", "assays"]);

		let readme = &entries[0];
		assert!(!readme.is_directory);
		assert!(readme.metadata.is_file);
		assert_eq!(readme.metadata.size, 5);
		assert_eq!(readme.id, VirtualPath::from_native(root.join("README.md")));
		assert!(entries[1].is_directory);
	}

	#[tokio::test]
	async fn missing_directory() {
		let dir = tempdir().unwrap();
		let err = read_dir(&VirtualPath::from_native(dir.path().join("missing")))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn file_is_not_a_directory() {
		let dir = tempdir().unwrap();
		let file = dir.path().join("file.md");
		std::fs::write(&file, "").unwrap();

		let err = read_dir(&VirtualPath::from_native(&file)).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotADirectory);
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn symlinks_are_not_followed() {
		let dir = tempdir().unwrap();
		std::fs::create_dir(dir.path().join("target")).unwrap();
		std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("link")).unwrap();

		let entries = read_dir(&VirtualPath::from_native(dir.path())).await.unwrap();
		let link = entries
			.iter()
			.find(|entry| entry.id.file_name() == Some("link"))
			.unwrap();
		assert!(link.metadata.is_symlink);
		assert!(!link.is_directory);
	}

	#[tokio::test]
	async fn serializes_like_a_stat() {
		let dir = tempdir().unwrap();
		std::fs::write(dir.path().join("a.md"), "abc").unwrap();

		let entries = read_dir(&VirtualPath::from_native(dir.path())).await.unwrap();
		let json = serde_json::to_value(&entries[0]).unwrap();

		assert_eq!(json["isDirectory"], false);
		assert_eq!(json["size"], 3);
		assert!(json["id"].as_str().unwrap().ends_with("a.md"));
		assert!(json.get("metadata").is_none());
	}
}
