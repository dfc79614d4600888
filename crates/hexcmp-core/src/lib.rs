//! Core comparison engine for hexcmp.
//!
//! The crate is UI-free: it turns opened byte streams into cached
//! [`FileView`]s, computes per-byte difference flags across up to eight views,
//! and runs the cancellable background scan that skips ahead to the next
//! disagreement. Rendering, key handling and persistence live in the `hexcmp`
//! binary crate.

pub mod diff;
pub mod nav;
pub mod scan;
pub mod source;
pub mod view;

pub use diff::{DiffEngine, DiffVector, PageSummary};
pub use nav::{Move, NavigationConfig, Navigator};
pub use scan::{DiffScanner, ScanOutcome, ScanReport};
pub use source::{ByteSource, FileSource, MemorySource, OpenError};
pub use view::{CacheStats, FileView, CACHE_ALIGN, CACHE_CAPACITY};

/// Maximum number of files compared side by side.
pub const MAX_VIEWS: usize = 8;
