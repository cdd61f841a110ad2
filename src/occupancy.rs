//! Parking-slot occupancy analysis.
//!
//! A frame is reduced to a binary mask by a gray-level range, its contours are
//! ranked by area, and the contour at the configured rank is taken as the
//! parking slot. Every smaller, non-empty contour counts as something covering
//! the slot. When the covered share of the slot area exceeds a percentage
//! threshold the space is reported as full.

use std::fmt;

use image::{GrayImage, RgbImage};
use imageproc::contours::Contour;

use crate::{
    colors::AnnotationPalette,
    contours::{ContourAreaTable, find_contours_with_border},
    contrast::{threshold_range, to_luma_bt601},
    drawing::draw_contour_mut,
    error::OccupancyError,
};

/// Default lower bound of the gray range that isolates the slot.
pub const DEFAULT_MIN_GRAY: u8 = 100;
/// Default upper bound of the gray range that isolates the slot.
pub const DEFAULT_MAX_GRAY: u8 = 250;
/// Default share of the slot, in percent, that must be covered to report it full.
pub const DEFAULT_MIN_PERCENTAGE_COVERED: f64 = 5.0;
/// Default rank of the slot contour; rank 0 is usually the enclosing border.
pub const DEFAULT_SLOT_RANK: usize = 1;

const OCCLUSION_THICKNESS: u32 = 1;
const SLOT_THICKNESS: u32 = 3;

/// Occupancy status of the monitored space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Vacant,
    Full,
}

impl Verdict {
    /// The status line shown to the operator.
    pub fn message(self) -> &'static str {
        match self {
            Verdict::Vacant => "Parking Vacant !!",
            Verdict::Full => "Parking FULL !!",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Rules that turn a contour area table into a verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageRules {
    /// Zero-based position in the descending area ranking that holds the slot.
    pub slot_rank: usize,
    /// The slot is full when strictly more than this percentage is covered.
    pub min_percentage_covered: f64,
}

impl Default for CoverageRules {
    fn default() -> Self {
        Self {
            slot_rank: DEFAULT_SLOT_RANK,
            min_percentage_covered: DEFAULT_MIN_PERCENTAGE_COVERED,
        }
    }
}

/// Everything the analyzer needs besides the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    pub min_gray: u8,
    pub max_gray: u8,
    pub rules: CoverageRules,
    pub palette: AnnotationPalette,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            min_gray: DEFAULT_MIN_GRAY,
            max_gray: DEFAULT_MAX_GRAY,
            rules: CoverageRules::default(),
            palette: AnnotationPalette::default(),
        }
    }
}

/// Outcome of the area-ratio decision for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Index of the slot contour in extraction order.
    pub slot_index: usize,
    pub slot_area: f64,
    /// Indices of the contours counted as covering the slot, in extraction order.
    pub occlusion_indices: Vec<usize>,
    pub total_area_covered: f64,
    pub percentage_covered: f64,
    pub contour_count: usize,
    pub verdict: Verdict,
}

/// A verdict together with the annotated copy of the analyzed frame.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: CoverageReport,
    pub annotated: RgbImage,
}

impl Analysis {
    pub fn verdict(&self) -> Verdict {
        self.report.verdict
    }
}

/// Decides occupancy from contour areas alone.
///
/// The contour at `rules.slot_rank` of the descending ranking is the slot.
/// Every contour with an area strictly between zero and the slot area is
/// summed as covered area. The verdict is [`Verdict::Full`] only when the
/// covered percentage is strictly greater than `rules.min_percentage_covered`.
///
/// # Errors
///
/// * [`OccupancyError::InsufficientContours`] when the table has no entry at
///   the slot rank.
/// * [`OccupancyError::DegenerateSlotArea`] when the selected slot has zero
///   area, which would make the percentage undefined.
pub fn assess_coverage(
    table: &ContourAreaTable,
    rules: &CoverageRules,
) -> Result<CoverageReport, OccupancyError> {
    let (slot_index, slot_area) =
        table
            .nth_largest(rules.slot_rank)
            .ok_or(OccupancyError::InsufficientContours {
                found: table.len(),
                required: rules.slot_rank + 1,
            })?;

    if slot_area <= 0.0 {
        return Err(OccupancyError::DegenerateSlotArea { index: slot_index });
    }

    let mut total_area_covered = 0.0;
    let mut occlusion_indices = Vec::new();
    for (index, area) in table.iter() {
        if area > 0.0 && area < slot_area {
            total_area_covered += area;
            occlusion_indices.push(index);
        }
    }

    let percentage_covered = (total_area_covered / slot_area) * 100.0;
    let verdict = if percentage_covered > rules.min_percentage_covered {
        Verdict::Full
    } else {
        Verdict::Vacant
    };

    Ok(CoverageReport {
        slot_index,
        slot_area,
        occlusion_indices,
        total_area_covered,
        percentage_covered,
        contour_count: table.len(),
        verdict,
    })
}

/// Stateless per-frame occupancy analyzer.
#[derive(Debug, Clone, Default)]
pub struct OccupancyAnalyzer {
    settings: AnalyzerSettings,
}

impl OccupancyAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// The binary mask of pixels whose gray level lies in the configured range.
    pub fn mask(&self, frame: &RgbImage) -> GrayImage {
        threshold_range(
            &to_luma_bt601(frame),
            self.settings.min_gray,
            self.settings.max_gray,
        )
    }

    /// Extracts every contour of the frame's mask, keeping the full hierarchy.
    pub fn contours(&self, frame: &RgbImage) -> Vec<Contour<i32>> {
        self.contours_in_mask(&self.mask(frame))
    }

    /// Extracts every contour of an already computed mask. Regions touching
    /// the image edge keep their outer border.
    pub fn contours_in_mask(&self, mask: &GrayImage) -> Vec<Contour<i32>> {
        find_contours_with_border(mask)
    }

    /// Analyzes one frame and returns the verdict with an annotated copy.
    ///
    /// Occlusion contours are outlined one pixel wide in the occlusion color.
    /// The slot contour is outlined three pixels wide in the alert color when
    /// full and in the clear color when vacant. The input frame is untouched.
    pub fn analyze(&self, frame: &RgbImage) -> Result<Analysis, OccupancyError> {
        let contours = self.contours(frame);
        let table = ContourAreaTable::from_contours(&contours);
        let report = assess_coverage(&table, &self.settings.rules)?;

        log::debug!(
            "slot contour {} area {:.1}, {} occlusion(s) covering {:.2}% of {} contour(s): {:?}",
            report.slot_index,
            report.slot_area,
            report.occlusion_indices.len(),
            report.percentage_covered,
            report.contour_count,
            report.verdict
        );

        let palette = &self.settings.palette;
        let mut annotated = frame.clone();
        for &index in &report.occlusion_indices {
            draw_contour_mut(
                &mut annotated,
                &contours[index],
                palette.occlusion,
                OCCLUSION_THICKNESS,
            );
        }
        let slot_color = match report.verdict {
            Verdict::Full => palette.alert,
            Verdict::Vacant => palette.clear,
        };
        draw_contour_mut(
            &mut annotated,
            &contours[report.slot_index],
            slot_color,
            SLOT_THICKNESS,
        );

        Ok(Analysis { report, annotated })
    }
}
