//! Parking-space occupancy detection from camera frames, built on [imageproc].
//!
//! The image-level modules are organized into the same categories (as possible) as in [imageproc].
//! [`occupancy`] holds the decision logic; [`session`] drives it from a [`source::FrameSource`].

mod colors;
pub mod config;
pub mod contours;
pub mod contrast;
pub mod drawing;
pub mod error;
pub mod frame;
pub mod occupancy;
pub mod session;
pub mod source;

pub use colors::{AnnotationPalette, parse_hex_color};
pub use config::MonitorConfig;
pub use error::{ConfigError, FrameError, OccupancyError, SessionError, SourceError};
pub use occupancy::{
    Analysis, AnalyzerSettings, CoverageReport, CoverageRules, OccupancyAnalyzer, Verdict,
    assess_coverage,
};
pub use session::{CameraSession, SessionState, StatusUpdate};
pub use source::{FrameSource, ImageSequenceSource};
