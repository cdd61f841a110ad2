//! Camera session lifecycle and status hand-off.
//!
//! A [`CameraSession`] owns a [`FrameSource`] and an [`OccupancyAnalyzer`].
//! Every processed frame produces a [`StatusUpdate`] sent over an mpsc channel
//! to whichever thread owns the display. Any failure tears the session down
//! and releases the source before the error is returned.

use std::sync::mpsc::Sender;

use image::RgbImage;

use crate::{
    error::SessionError,
    occupancy::{CoverageReport, OccupancyAnalyzer, Verdict},
    source::FrameSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Running,
    Paused,
}

/// Message delivered to the status display.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    /// A frame was analyzed.
    Verdict {
        frame_number: u64,
        report: CoverageReport,
        annotated: RgbImage,
    },
    /// The session was paused or stopped; the status line should be blanked.
    Cleared,
}

impl StatusUpdate {
    /// Text for the status line; empty when cleared.
    pub fn message(&self) -> &'static str {
        match self {
            StatusUpdate::Verdict { report, .. } => report.verdict.message(),
            StatusUpdate::Cleared => "",
        }
    }
}

pub struct CameraSession<S: FrameSource> {
    camera_index: u32,
    source: S,
    analyzer: OccupancyAnalyzer,
    display: Sender<StatusUpdate>,
    state: SessionState,
    frames_processed: u64,
}

impl<S: FrameSource> CameraSession<S> {
    pub fn new(
        camera_index: u32,
        source: S,
        analyzer: OccupancyAnalyzer,
        display: Sender<StatusUpdate>,
    ) -> Self {
        Self {
            camera_index,
            source,
            analyzer,
            display,
            state: SessionState::Stopped,
            frames_processed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Opens the source when stopped, or resumes when paused.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Running => Err(SessionError::InvalidTransition {
                from: self.state,
                action: "start",
            }),
            SessionState::Paused => {
                log::info!("camera {} resumed", self.camera_index);
                self.state = SessionState::Running;
                Ok(())
            }
            SessionState::Stopped => {
                if let Err(e) = self.source.open() {
                    return Err(self.teardown(e.into()));
                }
                log::info!("camera {} started", self.camera_index);
                self.state = SessionState::Running;
                Ok(())
            }
        }
    }

    /// Suspends frame processing and clears the status display.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "pause",
            });
        }
        self.state = SessionState::Paused;
        log::info!("camera {} paused", self.camera_index);
        self.notify(StatusUpdate::Cleared)
    }

    /// Releases the source and clears the status display. Stopping a stopped
    /// session does nothing.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Stopped {
            return Ok(());
        }
        self.source.release();
        self.state = SessionState::Stopped;
        log::info!(
            "camera {} stopped after {} frame(s)",
            self.camera_index,
            self.frames_processed
        );
        self.notify(StatusUpdate::Cleared)
    }

    /// Grabs and analyzes one frame, then sends the verdict to the display.
    ///
    /// Returns `Ok(None)` when the source is exhausted; the session stays
    /// running so the caller decides when to stop.
    pub fn process_next(&mut self) -> Result<Option<Verdict>, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "process a frame in",
            });
        }

        let frame = match self.source.grab() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => return Err(self.teardown(e.into())),
        };

        let analysis = match self.analyzer.analyze(&frame) {
            Ok(analysis) => analysis,
            Err(e) => return Err(self.teardown(e.into())),
        };

        self.frames_processed += 1;
        let verdict = analysis.verdict();
        self.notify(StatusUpdate::Verdict {
            frame_number: self.frames_processed,
            report: analysis.report,
            annotated: analysis.annotated,
        })?;
        Ok(Some(verdict))
    }

    fn notify(&mut self, update: StatusUpdate) -> Result<(), SessionError> {
        if self.display.send(update).is_err() {
            return Err(self.teardown(SessionError::DisplayDisconnected));
        }
        Ok(())
    }

    fn teardown(&mut self, error: SessionError) -> SessionError {
        log::warn!("camera {} torn down: {}", self.camera_index, error);
        self.source.release();
        self.state = SessionState::Stopped;
        error
    }
}

impl<S: FrameSource> Drop for CameraSession<S> {
    fn drop(&mut self) {
        if self.state != SessionState::Stopped {
            self.source.release();
        }
    }
}
