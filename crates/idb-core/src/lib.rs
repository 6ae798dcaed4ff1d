//! Item Database Loader Core
//!
//! This library turns raw bytes of unknown text encoding into validated
//! item records and stitches multi-file databases together:
//! - Schema-shape parsing strategies with graceful fallback
//! - Generic node to typed record mapping
//! - Import path resolution against a base directory
//! - Worklist dataset loading with per-path deduplication
//! - Flat-list serialization back to disk
//!
//! The binary entry point is in `main.rs`.

pub mod loader;
pub mod map;
pub mod parse;
pub mod progress;
pub mod resolve;
pub mod writer;

pub use loader::{DatasetLoader, DatasetOutcome, LoadOutcome, LoadStatus, LoaderConfig};
pub use parse::{parse_document, Header, ParseStrategy, ParsedDocument};
pub use progress::{ProgressEvent, ProgressObserver};
pub use resolve::{resolve_import, ImportOrigin, ResolvedImport};
pub use writer::save;
