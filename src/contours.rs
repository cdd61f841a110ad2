use image::{GrayImage, imageops};
use imageproc::{
    contours::{Contour, find_contours},
    point::Point,
};
use num::{Num, NumCast};
use num_traits::AsPrimitive;

/// Computes the planar area enclosed by a closed sequence of points.
///
/// The area is the absolute value of the shoelace sum, closing the loop from
/// the last point back to the first. It does not depend on the winding
/// direction. Removing collinear points from a boundary leaves the result
/// unchanged, so full and chain-approximated borders give the same value.
///
/// # Type Parameters
///
/// * `T`: The numeric type of the point coordinates, such as `i32` or `u32`.
///
/// # Returns
///
/// The non-negative area as an `f64`. Fewer than three points enclose nothing
/// and yield `0.0`.
pub fn polygon_area<T>(points: &[Point<T>]) -> f64
where
    T: Num + NumCast + Copy + PartialEq + Eq + AsPrimitive<f64>,
{
    if points.len() < 3 {
        return 0.0;
    }

    let twice_signed: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let (x1, y1): (f64, f64) = (p1.x.as_(), p1.y.as_());
            let (x2, y2): (f64, f64) = (p2.x.as_(), p2.y.as_());
            x1 * y2 - x2 * y1
        })
        .sum();

    (twice_signed * 0.5).abs()
}

/// Finds all contours of a binary mask, including borders of regions that
/// touch the image edge.
///
/// `imageproc::contours::find_contours` never starts an outer border in the
/// first column, so a region filling the frame loses its outer contour. The
/// mask is traced inside a one-pixel zero frame instead, and the points are
/// shifted back into mask coordinates.
pub fn find_contours_with_border(mask: &GrayImage) -> Vec<Contour<i32>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    let mut contours = find_contours::<i32>(&padded);
    for contour in &mut contours {
        for point in &mut contour.points {
            point.x -= 1;
            point.y -= 1;
        }
    }
    contours
}

/// Areas of a set of contours, indexed by extraction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourAreaTable {
    areas: Vec<f64>,
}

impl ContourAreaTable {
    /// Builds the table from extracted contours.
    pub fn from_contours<T>(contours: &[Contour<T>]) -> Self
    where
        T: Num + NumCast + Copy + PartialEq + Eq + AsPrimitive<f64>,
    {
        Self {
            areas: contours.iter().map(|c| polygon_area(&c.points)).collect(),
        }
    }

    /// Builds a table from precomputed areas. Negative or NaN entries are
    /// clamped to `0.0`.
    pub fn from_areas(areas: impl IntoIterator<Item = f64>) -> Self {
        Self {
            areas: areas
                .into_iter()
                .map(|a| if a > 0.0 { a } else { 0.0 })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.areas.get(index).copied()
    }

    /// Iterates over `(index, area)` pairs in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.areas.iter().copied().enumerate()
    }

    /// Returns `(index, area)` pairs sorted by area in descending order.
    ///
    /// The sort is stable: contours with equal area keep their extraction
    /// order, so the ranking is deterministic for a given contour set.
    pub fn ranked(&self) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Returns the `(index, area)` entry at zero-based position `rank` of the
    /// descending ranking, or `None` when there are not enough contours.
    pub fn nth_largest(&self, rank: usize) -> Option<(usize, f64)> {
        self.ranked().get(rank).copied()
    }
}

/// Calculates the area of each contour and sorts them in descending order.
///
/// Takes ownership of the contours and returns them paired with their area.
/// Equal areas keep extraction order.
pub fn sort_by_areas_owned<T>(contours: Vec<Contour<T>>) -> Vec<(Contour<T>, f64)>
where
    T: Num + NumCast + Copy + PartialEq + Eq + AsPrimitive<f64>,
{
    let mut contours_with_areas: Vec<(Contour<T>, f64)> = contours
        .into_iter()
        .map(|contour| {
            let area = polygon_area(&contour.points);
            (contour, area)
        })
        .collect();

    contours_with_areas.sort_by(|a, b| b.1.total_cmp(&a.1));

    contours_with_areas
}
