//! # Dashdex Core
//!
//! Core library for Dashdex: turns a dashcam's on-card footage tree into a
//! persisted index of typed video records and assembles those records into
//! time-ordered clips for playback and export.
//!
//! ## Overview
//!
//! The pipeline is: filesystem → [`ClipPathParser`] → [`DurationProbe`] →
//! [`ClipIndex`] → [`ClipBuilder`] → `Clip[]` → [`ClipResultCache`].
//! [`ClipLibrary`] wires the pieces together and exposes the one entry
//! point, [`ClipLibrary::get_clips`].
//!
//! Syncs are single-flighted process-wide and probe invocations are capped
//! by a bounded gate, so concurrent requests cannot duplicate directory
//! walks or spawn an unbounded number of external processes.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dashdex_core::{
//!     ClipLibrary, FfprobeDurationProbe, InMemoryClipIndex, LibraryConfig,
//!     SyncMode, TracingReporter,
//! };
//!
//! async fn list_clips() -> dashdex_core::Result<()> {
//!     let library = ClipLibrary::new(
//!         LibraryConfig::new("/mnt/dashcam"),
//!         Arc::new(InMemoryClipIndex::new()),
//!         Arc::new(FfprobeDurationProbe::new()),
//!         Arc::new(TracingReporter),
//!     );
//!
//!     let clips = library.get_clips(SyncMode::Incremental).await?;
//!     for clip in clips.iter() {
//!         println!("{} {} ({}s)", clip.clip_type(), clip.start_date(), clip.total_seconds());
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Clip assembly from the persisted record set
pub mod builder;
/// Sliding-expiration cache of the built clip array
pub mod cache;
/// Footage tree configuration
pub mod config;
/// Error types
pub mod error;
/// Event-folder sidecar metadata cache
pub mod events;
/// Bounded resource gates
pub mod gate;
/// Library facade
pub mod library;
/// Recorder path/filename parsing
pub mod path_parser;
/// External duration probe abstraction
pub mod probe;
/// Isolated-failure reporting
pub mod report;
/// Filesystem enumeration
pub mod scanner;
/// Persisted index abstraction
pub mod store;
/// Index/filesystem reconciliation
pub mod sync;

pub use builder::{ClipBuilder, DEFAULT_THUMBNAIL_URL};
pub use cache::ClipResultCache;
pub use config::LibraryConfig;
pub use error::{DashdexError, Result};
pub use events::{EventFolderMetadata, EventMetadataCache};
pub use gate::{ResourceGate, SyncGate};
pub use library::ClipLibrary;
pub use path_parser::{ClipPathParser, ParsedClipPath};
pub use probe::{DurationProbe, FfprobeDurationProbe, ProbeError};
pub use report::{ErrorReporter, TracingReporter};
pub use scanner::ClipScanner;
pub use store::{ClipIndex, IndexBatch, InMemoryClipIndex};
pub use sync::{SyncEngine, SyncMode, SyncReport};

// Re-export the model crate the way consumers expect to reach it.
pub use dashdex_model as model;
pub use dashdex_model::{Camera, Clip, ClipType, ClipVideoSegment, Event, VideoFileRecord};
