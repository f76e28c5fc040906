use crate::{path::VirtualPath, Error};

use tokio::fs;
use tracing::{debug, instrument};

/// Extensions recognized as text documents by `create_empty_file`
pub const TEXT_EXTENSIONS: [&str; 2] = ["md", "txt"];

pub const DEFAULT_EXTENSION: &str = "md";

#[instrument(skip_all, fields(%path))]
pub async fn read_file(path: &VirtualPath) -> Result<String, Error> {
	fs::read_to_string(path.to_native())
		.await
		.map_err(|e| (path, e).into())
}

/// Overwrite `path` with `contents`, creating the file if needed.
///
/// This is a plain truncate-and-write: a crash in the middle can leave a partial file behind.
#[instrument(skip_all, fields(%path, len = contents.len()))]
pub async fn write_file(path: &VirtualPath, contents: &str) -> Result<(), Error> {
	fs::write(path.to_native(), contents)
		.await
		.map_err(|e| (path, e).into())
}

/// `path` itself if it already ends in a text extension, otherwise `path` with
/// [`DEFAULT_EXTENSION`] appended
pub fn with_text_extension(path: &VirtualPath) -> VirtualPath {
	let has_text_extension = TEXT_EXTENSIONS.iter().any(|extension| {
		path.as_str()
			.strip_suffix(extension)
			.is_some_and(|rest| rest.ends_with('.'))
	});

	if has_text_extension {
		path.clone()
	} else {
		format!("{path}.{DEFAULT_EXTENSION}").into()
	}
}

/// Create a zero-length text document, returning the path actually created.
///
/// Never clobbers: fails with [`Error::AlreadyExists`] if an entry is already there.
#[instrument(skip_all, fields(%path))]
pub async fn create_empty_file(path: &VirtualPath) -> Result<VirtualPath, Error> {
	let path = with_text_extension(path);

	fs::OpenOptions::new()
		.write(true)
		.create_new(true)
		.open(path.to_native())
		.await
		.map_err(|e| Error::from((&path, e)))?;

	debug!(created = %path, "Created empty file;");

	Ok(path)
}
