//! Crop placement search.
//!
//! Picks where a crop window of a fixed size goes inside the source image.
//! Without areas the window is centered. With areas, every integer origin
//! is scored by the summed [`Area::penalty`] and the minimum wins.
//!
//! ## Scan order and ties
//!
//! Candidates are visited with `x` in the outer loop and `y` in the inner
//! loop, both ascending. Every origin whose total equals the minimum is kept
//! in the optimal set, in scan order, and the first one is chosen: lowest
//! `x`, then lowest `y`. The same inputs always produce the same window.
//!
//! ## Pruning
//!
//! Summing a candidate's terms stops as soon as the running total exceeds
//! the best total seen so far. This only holds because every term is
//! non-negative: a partial sum is a lower bound on the full sum.
//!
//! ## Cost
//!
//! The search is `O(W × H × A)` for a `W × H` candidate grid and `A` areas.
//! Large sources with small windows get slow; callers that care should
//! downscale before cropping. At or above [`PARALLEL_WORK_THRESHOLD`] the
//! grid is split into one rayon task per column, merged back in column order,
//! which gives the same optimal set as the sequential scan.

use super::area::Area;
use super::backend::{CropBox, Dimensions};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Candidate × area evaluations at or above which the search runs in parallel.
pub const PARALLEL_WORK_THRESHOLD: u64 = 1 << 20;

/// Outcome of a placement search.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// The chosen top-left corner.
    pub origin: (u32, u32),
    /// Total penalty at `origin`.
    pub penalty: f64,
    /// Every origin with the minimum total, in scan order. Starts with `origin`.
    pub optimal: Vec<(u32, u32)>,
}

/// Running minimum and the origins that reach it.
#[derive(Debug, Default)]
struct Tracker {
    min: Option<f64>,
    optimal: Vec<(u32, u32)>,
}

impl Tracker {
    fn offer(&mut self, origin: (u32, u32), total: f64) {
        match self.min {
            Some(min) if total > min => {}
            Some(min) if total == min => self.optimal.push(origin),
            _ => {
                self.min = Some(total);
                self.optimal.clear();
                self.optimal.push(origin);
            }
        }
    }

    /// Fold in a tracker whose origins all come later in scan order.
    fn merge(&mut self, later: Tracker) {
        let Some(later_min) = later.min else {
            return;
        };
        match self.min {
            Some(min) if later_min > min => {}
            Some(min) if later_min == min => self.optimal.extend(later.optimal),
            _ => *self = later,
        }
    }

    fn finish(self) -> Option<Placement> {
        let penalty = self.min?;
        let origin = *self.optimal.first()?;
        Some(Placement {
            origin,
            penalty,
            optimal: self.optimal,
        })
    }
}

/// Sum `terms` penalties for one origin, stopping once the sum exceeds `bound`.
fn total_penalty(terms: usize, bound: Option<f64>, term: impl Fn(usize) -> f64) -> f64 {
    let mut total = 0.0;
    for index in 0..terms {
        total += term(index);
        if bound.is_some_and(|bound| total > bound) {
            break;
        }
    }
    total
}

fn scan_column<F>(tracker: &mut Tracker, x: u32, max_y: u32, terms: usize, penalty: &F)
where
    F: Fn(usize, u32, u32) -> f64,
{
    for y in 0..=max_y {
        let total = total_penalty(terms, tracker.min, |index| penalty(index, x, y));
        tracker.offer((x, y), total);
    }
}

/// Exhaustive minimum-penalty search over origins `0..=max_x` × `0..=max_y`.
///
/// `penalty(term, x, y)` is the cost of term number `term` (`0..terms`) for
/// the origin `(x, y)`. It must never return a negative value.
///
/// # Examples
/// ```
/// # use cropwise::imaging::placement::search;
/// // Cheapest where x + y == 2; (0, 2) is scanned first.
/// let placement = search(2, 2, 1, |_, x, y| (x as f64 + y as f64 - 2.0).abs());
/// assert_eq!(placement.origin, (0, 2));
/// assert_eq!(placement.optimal, vec![(0, 2), (1, 1), (2, 0)]);
/// ```
pub fn search<F>(max_x: u32, max_y: u32, terms: usize, penalty: F) -> Placement
where
    F: Fn(usize, u32, u32) -> f64,
{
    let mut tracker = Tracker::default();
    for x in 0..=max_x {
        scan_column(&mut tracker, x, max_y, terms, &penalty);
    }
    finalize(tracker)
}

/// Same result as [`search`], computed with one rayon task per column.
pub fn search_par<F>(max_x: u32, max_y: u32, terms: usize, penalty: F) -> Placement
where
    F: Fn(usize, u32, u32) -> f64 + Sync,
{
    let columns: Vec<Tracker> = (0..=max_x)
        .into_par_iter()
        .map(|x| {
            let mut tracker = Tracker::default();
            scan_column(&mut tracker, x, max_y, terms, &penalty);
            tracker
        })
        .collect();

    let mut tracker = Tracker::default();
    for column in columns {
        tracker.merge(column);
    }
    finalize(tracker)
}

// The grid always has at least the (0, 0) candidate, so a tracker that saw
// the whole grid is never empty.
fn finalize(tracker: Tracker) -> Placement {
    tracker.finish().unwrap_or(Placement {
        origin: (0, 0),
        penalty: 0.0,
        optimal: vec![(0, 0)],
    })
}

/// Origin that centers `window` in `source`, rounding toward the top-left.
pub fn center_origin(source: Dimensions, window: Dimensions) -> (u32, u32) {
    (
        source.width.saturating_sub(window.width) / 2,
        source.height.saturating_sub(window.height) / 2,
    )
}

/// Search for the origin of `window` that loses the least of `areas`.
///
/// `window` must fit inside `source`.
pub fn search_areas(source: Dimensions, window: Dimensions, areas: &[Area]) -> Placement {
    let max_x = source.width.saturating_sub(window.width);
    let max_y = source.height.saturating_sub(window.height);
    let penalty = |index: usize, x: u32, y: u32| areas[index].penalty(&CropBox::at(x, y, window));

    let work = (max_x as u64 + 1) * (max_y as u64 + 1) * areas.len() as u64;
    trace!(work, max_x, max_y, areas = areas.len(), "placement search");

    if work >= PARALLEL_WORK_THRESHOLD {
        search_par(max_x, max_y, areas.len(), penalty)
    } else {
        search(max_x, max_y, areas.len(), penalty)
    }
}

/// Choose the crop box of size `window` for `source`.
///
/// Centered when `areas` is empty, otherwise the first minimum-penalty
/// placement.
pub fn find_crop_window(source: Dimensions, window: Dimensions, areas: &[Area]) -> CropBox {
    if areas.is_empty() {
        let (x, y) = center_origin(source, window);
        return CropBox::at(x, y, window);
    }

    let placement = search_areas(source, window, areas);
    debug!(
        x = placement.origin.0,
        y = placement.origin.1,
        penalty = placement.penalty,
        ties = placement.optimal.len(),
        "crop placement chosen"
    );
    CropBox::at(placement.origin.0, placement.origin.1, window)
}
