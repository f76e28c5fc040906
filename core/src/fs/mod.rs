//! Request side of the core: directory listing and file content operations.
//!
//! All functions take and return [`VirtualPath`](crate::VirtualPath)s and translate them to
//! native form only for the actual filesystem call.

mod copy;
mod dir;
mod file;
mod metadata;

pub use copy::copy;
pub use dir::{is_reserved, read_dir, DirEntry, RESERVED_PREFIXES};
pub use file::{
	create_empty_file, read_file, with_text_extension, write_file, DEFAULT_EXTENSION,
	TEXT_EXTENSIONS,
};
pub use metadata::{EntryMetadata, UnixMetadata};
