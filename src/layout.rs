// SPDX-License-Identifier: Apache-2.0

use geo::{Area, Rect, coord};
use itertools::Itertools;
use nalgebra::Vector2;

/// Spacing added between the two halves at every split level.
pub const SPLIT_OVERHEAD: f64 = 0.5;

/// Default length of shared edge served by one inter-chiplet interface.
pub const DEFAULT_INTERFACE_PITCH: f64 = 10.0;

/// Direction along which a group of chiplets is split in two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Index of this axis in a 2-vector of dimensions.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Estimated envelope of a set of chiplets sharing a substrate, together
/// with the estimated number of interfaces between neighbouring chiplets.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    dimensions: Vector2<f64>,
    interface_count: f64,
}

impl LayoutResult {
    /// Extent of the envelope along the X axis.
    pub fn width(&self) -> f64 {
        self.dimensions[Axis::X.index()]
    }

    /// Extent of the envelope along the Y axis.
    pub fn height(&self) -> f64 {
        self.dimensions[Axis::Y.index()]
    }

    /// Extent of the envelope along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        self.dimensions[axis.index()]
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width(), self.height())
    }

    /// Number of interface crossings, summed over every split level. Each
    /// level contributes a whole number, so the total is integral.
    pub fn interface_count(&self) -> f64 {
        self.interface_count
    }

    /// The envelope as a rectangle anchored at the origin.
    pub fn envelope(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: self.width(), y: self.height() },
        )
    }

    /// Area of the envelope, in the square of the input length unit.
    pub fn area(&self) -> f64 {
        self.envelope().unsigned_area()
    }
}

/// Estimates the envelope of a set of chiplet `areas` by recursive
/// bisection.
///
/// The areas are sorted largest first and dealt greedily into two groups,
/// each area going to the group with the smaller running total (ties go to
/// the first group). Each group is laid out recursively along the
/// perpendicular axis, and the two halves are then placed side by side along
/// `axis` with [`SPLIT_OVERHEAD`] between them. The perpendicular extent is
/// the larger of the two halves. The shorter of the two facing edges is the
/// overlap at that level; it is served by `ceil(overlap / pitch)`
/// interfaces.
///
/// A single area becomes a 2:1 block elongated along `axis`, so its envelope
/// area equals the input area exactly and it has no interfaces.
///
/// The result depends only on the multiset of areas, not on their order.
/// This method panics if `areas` is empty or contains a value that is not
/// strictly positive.
pub fn estimate_layout(areas: &[f64], axis: Axis, pitch: f64) -> LayoutResult {
    if areas.is_empty() {
        panic!("Cannot estimate the layout of an empty set of chiplets.");
    }
    if let Some(area) = areas.iter().find(|area| !(**area > 0.0)) {
        panic!("Chiplet areas must be positive, got {area}.");
    }

    let sorted = areas
        .iter()
        .copied()
        .sorted_by(|a, b| b.total_cmp(a))
        .collect_vec();

    bisect(&sorted, axis, pitch)
}

// `sorted` is in descending order; the greedy deal keeps each group sorted.
fn bisect(sorted: &[f64], axis: Axis, pitch: f64) -> LayoutResult {
    if let [area] = sorted {
        let side = (area / 2.0).sqrt();
        let mut dimensions = Vector2::repeat(side);
        dimensions[axis.index()] *= 2.0;
        return LayoutResult {
            dimensions,
            interface_count: 0.0,
        };
    }

    let mut sums = [0.0_f64; 2];
    let mut groups: [Vec<f64>; 2] = [Vec::new(), Vec::new()];
    for &area in sorted {
        let target = if sums[1] < sums[0] { 1 } else { 0 };
        groups[target].push(area);
        sums[target] += area;
    }

    let perpendicular = axis.perpendicular();
    let first = bisect(&groups[0], perpendicular, pitch);
    let second = bisect(&groups[1], perpendicular, pitch);

    let along = axis.index();
    let across = perpendicular.index();

    let mut dimensions = Vector2::zeros();
    dimensions[along] = first.dimensions[along] + second.dimensions[along] + SPLIT_OVERHEAD;
    dimensions[across] = first.dimensions[across].max(second.dimensions[across]);

    let overlap = first.dimensions[across].min(second.dimensions[across]);
    let interface_count =
        first.interface_count + second.interface_count + (overlap / pitch).ceil();

    LayoutResult {
        dimensions,
        interface_count,
    }
}
