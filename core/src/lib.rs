//! Local file-system access layer for the ARCitect front-end.
//!
//! Every path crossing this crate's API is a [`VirtualPath`], a `/` separated string that is
//! the same on every platform. Native paths only exist at the filesystem boundary.
//!
//! Requests (list, read, write, create, copy) are served by the functions in [`fs`].
//! Out-of-band changes are picked up by the [`WatchRegistry`] and pushed to whichever
//! front-end surface is currently active through the [`ChangeNotifier`].

pub mod config;
pub mod fs;
pub mod notifier;
pub mod path;
pub mod watcher;

mod error;
mod local_fs;

pub use config::{ConfigError, ServiceConfig, WatcherConfig};
pub use error::{Error, ErrorKind};
pub use fs::{DirEntry, EntryMetadata};
pub use local_fs::{LocalFileSystem, Request, Response};
pub use notifier::{ChangeEvent, ChangeNotifier, Surface, SurfaceId};
pub use path::VirtualPath;
pub use watcher::WatchRegistry;
