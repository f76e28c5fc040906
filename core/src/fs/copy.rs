use crate::path::VirtualPath;

use arcitect_utils::error::{report_error, FileIOError};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument, trace};

#[derive(Error, Debug)]
enum CopyError {
	#[error("source has no file name: <path='{}'>", .0.display())]
	MissingFileName(Box<Path>),
	#[error("cannot copy a directory into itself: <from='{}', into='{}'>", .from.display(), .into.display())]
	IntoItself { from: Box<Path>, into: Box<Path> },
	#[error("source and target are the same entry: <path='{}'>", .0.display())]
	SameEntry(Box<Path>),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

/// Copy `source` (a file or a whole directory tree) into the directory `target_dir`, keeping
/// its base name and overwriting whatever already has that name there.
///
/// Unlike every other request this one never fails loudly: any error is logged and reported
/// as `false`, so callers must check the flag.
#[instrument(skip_all, fields(%source, %target_dir))]
pub async fn copy(source: &VirtualPath, target_dir: &VirtualPath) -> bool {
	let res = copy_into(&source.to_native(), &target_dir.to_native()).await;
	report_error(&res);

	res.is_ok()
}

async fn copy_into(source: &Path, target_dir: &Path) -> Result<(), CopyError> {
	let name = source
		.file_name()
		.ok_or_else(|| CopyError::MissingFileName(source.into()))?;
	let target = target_dir.join(name);

	let source_metadata = fs::symlink_metadata(source)
		.await
		.map_err(|e| FileIOError::from((source, e, "reading copy source")))?;

	let resolved_source = resolve(source).await;
	if source_metadata.is_dir() && resolve(target_dir).await.starts_with(&resolved_source) {
		return Err(CopyError::IntoItself {
			from: source.into(),
			into: target_dir.into(),
		});
	}
	if resolve(&target).await == resolved_source {
		return Err(CopyError::SameEntry(source.into()));
	}

	fs::create_dir_all(target_dir)
		.await
		.map_err(|e| FileIOError::from((target_dir, e, "creating copy target directory")))?;

	let mut steps = vec![(source.to_path_buf(), target)];

	while let Some((from, to)) = steps.pop() {
		let metadata = fs::symlink_metadata(&from)
			.await
			.map_err(|e| FileIOError::from((&from, e)))?;

		if metadata.is_dir() {
			match fs::symlink_metadata(&to).await {
				Ok(existing) if existing.is_dir() => {
					trace!(to = %to.display(), "Merging into existing directory;");
				}
				_ => fs::create_dir(&to)
					.await
					.map_err(|e| FileIOError::from((&to, e, "creating directory")))?,
			}

			let mut read_dir = fs::read_dir(&from)
				.await
				.map_err(|e| FileIOError::from((&from, e)))?;

			while let Some(entry) = read_dir
				.next_entry()
				.await
				.map_err(|e| FileIOError::from((&from, e)))?
			{
				steps.push((entry.path(), to.join(entry.file_name())));
			}
		} else if metadata.file_type().is_symlink() {
			copy_symlink(&from, &to).await?;
		} else {
			trace!(from = %from.display(), to = %to.display(), "Copying file;");
			fs::copy(&from, &to)
				.await
				.map_err(|e| FileIOError::from((&to, e, "copying file")))?;
		}
	}

	debug!("Copy finished");

	Ok(())
}

/// Canonical form of `path`. Missing trailing components are re-appended to the canonical form
/// of their nearest existing ancestor, so aliases of a not yet created target still resolve.
async fn resolve(path: &Path) -> PathBuf {
	let mut missing = vec![];
	let mut current = path;

	loop {
		if let Ok(resolved) = fs::canonicalize(current).await {
			return missing
				.into_iter()
				.rev()
				.fold(resolved, |resolved, name| resolved.join(name));
		}

		match (current.parent(), current.file_name()) {
			(Some(parent), Some(name)) => {
				missing.push(name.to_os_string());
				current = if parent.as_os_str().is_empty() {
					Path::new(".")
				} else {
					parent
				};
			}
			_ => return path.to_path_buf(),
		}
	}
}

#[cfg(unix)]
async fn copy_symlink(from: &Path, to: &Path) -> Result<(), FileIOError> {
	let link_target = fs::read_link(from)
		.await
		.map_err(|e| FileIOError::from((from, e, "reading symlink")))?;

	if fs::symlink_metadata(to).await.is_ok() {
		fs::remove_file(to)
			.await
			.map_err(|e| FileIOError::from((to, e, "replacing existing entry")))?;
	}

	fs::symlink(&link_target, to)
		.await
		.map_err(|e| FileIOError::from((to, e, "creating symlink")))
}

#[cfg(not(unix))]
async fn copy_symlink(from: &Path, to: &Path) -> Result<(), FileIOError> {
	fs::copy(from, to)
		.await
		.map(|_| ())
		.map_err(|e| FileIOError::from((to, e, "copying symlink target")))
}
