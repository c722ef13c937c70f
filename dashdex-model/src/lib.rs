//! Core data model definitions shared across Dashdex crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod camera;
pub mod clip;
pub mod clip_type;
pub mod event;
pub mod files;

// Intentionally curated re-exports for downstream consumers.
pub use camera::Camera;
pub use clip::{Clip, ClipVideoSegment};
pub use clip_type::ClipType;
pub use event::Event;
pub use files::VideoFileRecord;
