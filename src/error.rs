use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Failures of a single frame analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OccupancyError {
    #[error("found {found} contour(s), slot selection needs at least {required}")]
    InsufficientContours { found: usize, required: usize },
    #[error("reference slot contour {index} has zero area")]
    DegenerateSlotArea { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("BGR buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("no frames found under {0}")]
    Empty(PathBuf),
    #[error("frame source is not open")]
    NotOpen,
}

/// Everything that can go wrong while a camera session is driven.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera acquisition failed: {0}")]
    Acquisition(#[from] SourceError),
    #[error("frame analysis failed: {0}")]
    Analysis(#[from] OccupancyError),
    #[error("status display disconnected")]
    DisplayDisconnected,
    #[error("cannot {action} a session that is {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("invalid {field} color {value:?}: {reason}")]
    Color {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Invalid(String),
}
