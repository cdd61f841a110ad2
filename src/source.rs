//! Frame sources feeding a camera session.
//!
//! Camera drivers live outside this crate. They plug in by implementing
//! [`FrameSource`]. [`ImageSequenceSource`] replays still images from disk,
//! which is enough to drive the analyzer from recorded captures.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::SourceError;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A producer of color frames with an explicit acquire/release lifecycle.
pub trait FrameSource {
    /// Acquires the underlying device or stream.
    fn open(&mut self) -> Result<(), SourceError>;

    /// Returns the next frame, or `None` once the stream is exhausted.
    fn grab(&mut self) -> Result<Option<RgbImage>, SourceError>;

    /// Releases the device. Must be safe to call more than once.
    fn release(&mut self);
}

/// Replays image files in order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    open: bool,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            open: false,
        }
    }

    /// Expands every directory argument into its image files, sorted by name.
    /// Plain file arguments are kept as given.
    pub fn from_paths<P: AsRef<Path>>(inputs: &[P]) -> Result<Self, SourceError> {
        let mut paths = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            if input.is_dir() {
                let mut found = list_images(input)?;
                if found.is_empty() {
                    return Err(SourceError::Empty(input.to_path_buf()));
                }
                found.sort();
                paths.extend(found);
            } else {
                paths.push(input.to_path_buf());
            }
        }
        Ok(Self::new(paths))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Path of the frame the next `grab` will return.
    pub fn peek_path(&self) -> Option<&Path> {
        self.paths.get(self.next).map(PathBuf::as_path)
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let io_err = |source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            found.push(path);
        }
    }
    Ok(found)
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if let Some(missing) = self.paths.iter().find(|p| !p.is_file()) {
            return Err(SourceError::Io {
                path: missing.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        self.open = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<Option<RgbImage>, SourceError> {
        if !self.open {
            return Err(SourceError::NotOpen);
        }
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let frame = image::open(path).map_err(|source| SourceError::Decode {
            path: path.clone(),
            source,
        })?;
        Ok(Some(frame.to_rgb8()))
    }

    fn release(&mut self) {
        self.open = false;
    }
}
