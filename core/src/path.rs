//! Mapping between native paths and the forward-slash paths handed to the front-end.
//!
//! The mapping is purely lexical: no `.`/`..` normalization and no symlink resolution, that
//! is left to whatever filesystem call follows. Non UTF-8 native paths are converted lossily,
//! as the front-end can only carry UTF-8 strings anyway.

use std::{
	fmt,
	path::{Path, PathBuf, MAIN_SEPARATOR},
};

use serde::{Deserialize, Serialize};

pub const VIRTUAL_SEPARATOR: char = '/';

/// Separator used by the host for native paths
pub const fn native_separator() -> char {
	MAIN_SEPARATOR
}

/// Platform independent path, always using `/` as separator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualPath(String);

impl VirtualPath {
	pub fn from_native(native: impl AsRef<Path>) -> Self {
		to_virtual(native)
	}

	pub fn to_native(&self) -> PathBuf {
		to_native(self)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}

	/// Last segment of the path, if it has a non-empty one
	pub fn file_name(&self) -> Option<&str> {
		self.0
			.rsplit(VIRTUAL_SEPARATOR)
			.next()
			.filter(|name| !name.is_empty())
	}

	pub fn join(&self, name: &str) -> Self {
		if self.0.ends_with(VIRTUAL_SEPARATOR) {
			Self(format!("{}{name}", self.0))
		} else {
			Self(format!("{}{VIRTUAL_SEPARATOR}{name}", self.0))
		}
	}
}

impl fmt::Display for VirtualPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for VirtualPath {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<String> for VirtualPath {
	fn from(path: String) -> Self {
		Self(path)
	}
}

impl From<&str> for VirtualPath {
	fn from(path: &str) -> Self {
		Self(path.to_string())
	}
}

pub fn to_virtual(native: impl AsRef<Path>) -> VirtualPath {
	to_virtual_with(&native.as_ref().to_string_lossy(), native_separator())
}

pub fn to_native(path: &VirtualPath) -> PathBuf {
	PathBuf::from(to_native_with(path.as_str(), native_separator()))
}

/// Split on `separator` and rejoin with `/`
pub fn to_virtual_with(native: &str, separator: char) -> VirtualPath {
	if separator == VIRTUAL_SEPARATOR {
		return VirtualPath(native.to_string());
	}

	VirtualPath(native.replace(separator, "/"))
}

/// Split on `/` and rejoin with `separator`
pub fn to_native_with(path: &str, separator: char) -> String {
	if separator == VIRTUAL_SEPARATOR {
		return path.to_string();
	}

	path.replace(VIRTUAL_SEPARATOR, separator.encode_utf8(&mut [0; 4]))
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLES: [&str; 8] = [
		"",
		"/",
		"relative/file.md",
		"/home/user/arc/assays/a1/isa.assay.xlsx",
		"C:\\Users\\me\\arc\\studies",
		"C:\\mixed/style\\path",
		"\\\\server\\share\\file.txt",
		"trailing\\",
	];

	#[test]
	fn windows_mapping() {
		assert_eq!(
			to_virtual_with("C:\\Users\\me\\arc", '\\').as_str(),
			"C:/Users/me/arc"
		);
		assert_eq!(to_native_with("C:/Users/me/arc", '\\'), "C:\\Users\\me\\arc");
	}

	#[test]
	fn unix_mapping_is_identity() {
		for sample in SAMPLES {
			assert_eq!(to_virtual_with(sample, '/').as_str(), sample);
			assert_eq!(to_native_with(sample, '/'), sample);
		}
	}

	#[test]
	fn round_trip_is_stable() {
		for separator in ['/', '\\'] {
			for sample in SAMPLES {
				let virtual_path = to_virtual_with(sample, separator);
				let again =
					to_virtual_with(&to_native_with(virtual_path.as_str(), separator), separator);
				assert_eq!(again, virtual_path, "{sample:?} with {separator:?}");
			}
		}
	}

	#[test]
	fn virtual_paths_never_contain_the_native_separator() {
		for sample in SAMPLES {
			assert!(!to_virtual_with(sample, '\\').as_str().contains('\\'));
		}
	}

	#[test]
	fn host_round_trip() {
		let native = std::env::temp_dir().join("arc").join("notes.md");
		let virtual_path = VirtualPath::from_native(&native);

		assert_eq!(virtual_path.to_native(), native);
		assert_eq!(VirtualPath::from_native(virtual_path.to_native()), virtual_path);
		assert_eq!(virtual_path.file_name(), Some("notes.md"));
	}

	#[test]
	fn file_name_and_join() {
		let dir = VirtualPath::from("/arc/studies");
		assert_eq!(dir.file_name(), Some("studies"));
		assert_eq!(dir.join("s1").as_str(), "/arc/studies/s1");
		assert_eq!(VirtualPath::from("/").join("arc").as_str(), "/arc");
		assert_eq!(VirtualPath::from("/").file_name(), None);
	}

	#[test]
	fn serializes_as_plain_string() {
		let path = VirtualPath::from("a/b");
		assert_eq!(serde_json::to_string(&path).unwrap(), "\"a/b\"");
	}
}
