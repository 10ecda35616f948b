//! Pure calculation functions for adjustment dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Every real-to-integer conversion truncates toward zero, and the source
//! ratio is always the real-valued `width / height`.

use super::backend::Dimensions;
use super::params::AdjustmentRequest;

/// Calculate the size for a fit adjustment: scale to fit within the
/// requested bounds, preserving the aspect ratio, never cropping.
///
/// With only one of `width`/`height` requested, the other side follows the
/// ratio and is then bounded by the matching `max_*`, shrinking both sides
/// if it overflows.
///
/// # Examples
/// ```
/// # use cropwise::imaging::{AdjustmentRequest, Dimensions, calculate_fit};
/// let source = Dimensions::new(800, 400);
/// let request = AdjustmentRequest::sized(300, 300);
/// assert_eq!(calculate_fit(source, &request), Dimensions::new(300, 150));
/// ```
pub fn calculate_fit(source: Dimensions, request: &AdjustmentRequest) -> Dimensions {
    let ratio = source.ratio();

    match (request.width, request.height) {
        (None, None) => source,
        (Some(width), None) => {
            // Constrain by width first, then by max_height.
            let height = (width as f64 / ratio) as u32;
            match request.max_height {
                Some(max_height) if height > max_height => {
                    Dimensions::new((max_height as f64 * ratio) as u32, max_height)
                }
                _ => Dimensions::new(width, height),
            }
        }
        (None, Some(height)) => {
            // Constrain by height first, then by max_width.
            let width = (height as f64 * ratio) as u32;
            match request.max_width {
                Some(max_width) if width > max_width => {
                    Dimensions::new(max_width, (max_width as f64 / ratio) as u32)
                }
                _ => Dimensions::new(width, height),
            }
        }
        (Some(width), Some(height)) => Dimensions::new(
            (width as f64).min(height as f64 * ratio) as u32,
            (height as f64).min(width as f64 / ratio) as u32,
        ),
    }
}

/// Calculate the size for a crop adjustment.
///
/// Each side is the first of (requested, max, source) that is set, clamped
/// to the source size. Crops never enlarge.
pub fn calculate_crop(source: Dimensions, request: &AdjustmentRequest) -> Dimensions {
    let width = request.width.or(request.max_width).unwrap_or(source.width);
    let height = request.height.or(request.max_height).unwrap_or(source.height);
    Dimensions::new(width.min(source.width), height.min(source.height))
}

/// Calculate the size for a fill adjustment.
///
/// Both sides requested: used exactly, whatever the source ratio. One side
/// requested: the other follows the source ratio and is clamped by the
/// matching `max_*`, without adjusting the requested side.
pub fn calculate_fill(source: Dimensions, request: &AdjustmentRequest) -> Dimensions {
    let ratio = source.ratio();

    match (request.width, request.height) {
        (None, None) => source,
        (Some(width), None) => {
            let height = (width as f64 / ratio) as u32;
            let height = request.max_height.map_or(height, |max| height.min(max));
            Dimensions::new(width, height)
        }
        (None, Some(height)) => {
            let width = (height as f64 * ratio) as u32;
            let width = request.max_width.map_or(width, |max| width.min(max));
            Dimensions::new(width, height)
        }
        (Some(width), Some(height)) => Dimensions::new(width, height),
    }
}

/// Replace a size with a zero side by the source size.
///
/// A degenerate result turns the adjustment into a no-op instead of an error.
pub fn guard_degenerate(source: Dimensions, calculated: Dimensions) -> Dimensions {
    if calculated.width == 0 || calculated.height == 0 {
        source
    } else {
        calculated
    }
}

/// Calculate the intermediate crop for a fill: the largest region of the
/// source with the target's aspect ratio.
///
/// A target wider than the source keeps the full source width and cuts the
/// height; otherwise the full height is kept and the width is cut.
///
/// # Examples
/// ```
/// # use cropwise::imaging::{Dimensions, calculate_fill_crop};
/// // 2:1 source, 3:1 target → full width, height 800 / 3
/// let crop = calculate_fill_crop(Dimensions::new(800, 400), Dimensions::new(300, 100));
/// assert_eq!(crop, Dimensions::new(800, 266));
/// ```
pub fn calculate_fill_crop(source: Dimensions, target: Dimensions) -> Dimensions {
    let source_ratio = source.ratio();
    let target_ratio = target.ratio();

    if target_ratio > source_ratio {
        Dimensions::new(source.width, (source.width as f64 / target_ratio) as u32)
    } else {
        Dimensions::new((source.height as f64 * target_ratio) as u32, source.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        width: Option<u32>,
        height: Option<u32>,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> AdjustmentRequest {
        AdjustmentRequest {
            width,
            height,
            max_width,
            max_height,
            areas: Vec::new(),
        }
    }

    // =========================================================================
    // calculate_fit tests
    // =========================================================================

    #[test]
    fn fit_without_constraints_keeps_source() {
        let source = Dimensions::new(640, 480);
        let req = request(None, None, Some(10), Some(10));
        assert_eq!(calculate_fit(source, &req), source);
    }

    #[test]
    fn fit_width_only() {
        // 800x400 (2:1), width 300 → height 150
        let req = request(Some(300), None, None, None);
        assert_eq!(
            calculate_fit(Dimensions::new(800, 400), &req),
            Dimensions::new(300, 150)
        );
    }

    #[test]
    fn fit_width_only_bounded_by_max_height() {
        // 400x800 (1:2), width 300 → height 600 > 400 → 200x400
        let req = request(Some(300), None, None, Some(400));
        assert_eq!(
            calculate_fit(Dimensions::new(400, 800), &req),
            Dimensions::new(200, 400)
        );
    }

    #[test]
    fn fit_width_only_under_max_height() {
        let req = request(Some(300), None, None, Some(1000));
        assert_eq!(
            calculate_fit(Dimensions::new(400, 800), &req),
            Dimensions::new(300, 600)
        );
    }

    #[test]
    fn fit_height_only_bounded_by_max_width() {
        // 800x400 (2:1), height 100 → width 200 > 150 → 150x75
        let req = request(None, Some(100), Some(150), None);
        assert_eq!(
            calculate_fit(Dimensions::new(800, 400), &req),
            Dimensions::new(150, 75)
        );
    }

    #[test]
    fn fit_both_sides_contains_within_box() {
        // 800x400 (2:1) into 300x300 → limited by width
        let req = request(Some(300), Some(300), None, None);
        assert_eq!(
            calculate_fit(Dimensions::new(800, 400), &req),
            Dimensions::new(300, 150)
        );
        // 400x800 (1:2) into 300x300 → limited by height
        assert_eq!(
            calculate_fit(Dimensions::new(400, 800), &req),
            Dimensions::new(150, 300)
        );
    }

    #[test]
    fn fit_ignores_max_when_both_sides_set() {
        let req = request(Some(300), Some(300), Some(10), Some(10));
        assert_eq!(
            calculate_fit(Dimensions::new(600, 400), &req),
            Dimensions::new(300, 200)
        );
    }

    #[test]
    fn fit_can_upscale() {
        let req = request(Some(1600), None, None, None);
        assert_eq!(
            calculate_fit(Dimensions::new(800, 400), &req),
            Dimensions::new(1600, 800)
        );
    }

    // =========================================================================
    // calculate_crop tests
    // =========================================================================

    #[test]
    fn crop_uses_requested_sizes() {
        let req = request(Some(300), Some(200), None, None);
        assert_eq!(
            calculate_crop(Dimensions::new(800, 600), &req),
            Dimensions::new(300, 200)
        );
    }

    #[test]
    fn crop_falls_back_to_max_then_source() {
        let req = request(None, Some(200), Some(500), None);
        assert_eq!(
            calculate_crop(Dimensions::new(800, 600), &req),
            Dimensions::new(500, 200)
        );
        let req = request(Some(300), None, None, None);
        assert_eq!(
            calculate_crop(Dimensions::new(800, 600), &req),
            Dimensions::new(300, 600)
        );
    }

    #[test]
    fn crop_never_exceeds_source() {
        let req = request(Some(1000), None, None, Some(900));
        assert_eq!(
            calculate_crop(Dimensions::new(800, 600), &req),
            Dimensions::new(800, 600)
        );
    }

    // =========================================================================
    // calculate_fill tests
    // =========================================================================

    #[test]
    fn fill_without_constraints_keeps_source() {
        let source = Dimensions::new(123, 45);
        assert_eq!(calculate_fill(source, &AdjustmentRequest::default()), source);
    }

    #[test]
    fn fill_both_sides_exact() {
        let req = request(Some(300), Some(300), None, None);
        assert_eq!(
            calculate_fill(Dimensions::new(800, 400), &req),
            Dimensions::new(300, 300)
        );
    }

    #[test]
    fn fill_width_only_clamped_by_max_height() {
        // 800x400, width 200 → height 100, clamped to 50; width untouched
        let req = request(Some(200), None, None, Some(50));
        assert_eq!(
            calculate_fill(Dimensions::new(800, 400), &req),
            Dimensions::new(200, 50)
        );
    }

    #[test]
    fn fill_height_only_clamped_by_max_width() {
        // 800x400, height 100 → width 200, clamped to 120; height untouched
        let req = request(None, Some(100), Some(120), None);
        assert_eq!(
            calculate_fill(Dimensions::new(800, 400), &req),
            Dimensions::new(120, 100)
        );
    }

    // =========================================================================
    // guard_degenerate / calculate_fill_crop tests
    // =========================================================================

    #[test]
    fn degenerate_sizes_fall_back_to_source() {
        let source = Dimensions::new(1000, 10);
        // width 50 on a 100:1 source truncates the height to 0
        let fitted = calculate_fit(source, &request(Some(50), None, None, None));
        assert_eq!(fitted, Dimensions::new(50, 0));
        assert_eq!(guard_degenerate(source, fitted), source);
        assert_eq!(
            guard_degenerate(source, Dimensions::new(5, 5)),
            Dimensions::new(5, 5)
        );
    }

    #[test]
    fn fill_crop_wider_target_cuts_height() {
        // source 2:1, target 3:1
        assert_eq!(
            calculate_fill_crop(Dimensions::new(800, 400), Dimensions::new(300, 100)),
            Dimensions::new(800, 266)
        );
    }

    #[test]
    fn fill_crop_narrower_target_cuts_width() {
        // source 2:1, target 1:1
        assert_eq!(
            calculate_fill_crop(Dimensions::new(800, 400), Dimensions::new(300, 300)),
            Dimensions::new(400, 400)
        );
    }

    #[test]
    fn fill_crop_same_ratio_keeps_source() {
        assert_eq!(
            calculate_fill_crop(Dimensions::new(800, 400), Dimensions::new(200, 100)),
            Dimensions::new(800, 400)
        );
    }
}
