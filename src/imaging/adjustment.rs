//! Adjustment strategies and their calculate/adjust lifecycle.
//!
//! | Kind | Size | Pixels |
//! |---|---|---|
//! | [`AdjustmentKind::Fit`] | [`calculate_fit`] | resize |
//! | [`AdjustmentKind::Crop`] | [`calculate_crop`] | [`find_crop_window`] + crop |
//! | [`AdjustmentKind::Fill`] | [`calculate_fill`] | crop to the target ratio, then fit |
//!
//! An [`Adjustment`] binds a kind to one source image and one request, and
//! moves through [`Stage::Unevaluated`] → [`Stage::SizeKnown`] →
//! [`Stage::Adjusted`]. The size and the adjusted image are computed once and
//! cached; later calls return the cached values.

use super::backend::{Dimensions, Raster, ResizeFilter};
use super::calculations::{
    calculate_crop, calculate_fill, calculate_fill_crop, calculate_fit, guard_degenerate,
};
use super::params::{AdjustmentRequest, ValidationError};
use super::placement::find_crop_window;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The built-in adjustment strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    /// Resize to fit within the requested bounds. Never crops.
    Fit,
    /// Crop to the requested size, keeping areas of interest where possible.
    Crop,
    /// Crop to the requested ratio, then resize to the requested size.
    Fill,
}

impl AdjustmentKind {
    pub const ALL: [AdjustmentKind; 3] = [Self::Fit, Self::Crop, Self::Fill];

    /// Registry key of this kind.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Crop => "crop",
            Self::Fill => "fill",
        }
    }

    /// Output size for a `source` image, without touching any pixels.
    ///
    /// A result with a zero side is replaced by `source`.
    pub fn calculate(self, source: Dimensions, request: &AdjustmentRequest) -> Dimensions {
        let calculated = match self {
            Self::Fit => calculate_fit(source, request),
            Self::Crop => calculate_crop(source, request),
            Self::Fill => calculate_fill(source, request),
        };
        let guarded = guard_degenerate(source, calculated);
        if guarded != calculated {
            debug!(
                adjustment = self.slug(),
                %source,
                %calculated,
                "degenerate size, keeping source dimensions"
            );
        }
        guarded
    }

    fn render<I: Raster>(self, image: &I, size: Dimensions, request: &AdjustmentRequest) -> I {
        let source = image.dimensions();
        match self {
            Self::Fit => image.resize(
                size.width,
                size.height,
                ResizeFilter::for_widths(source.width, size.width),
            ),
            Self::Crop => image.crop(find_crop_window(source, size, &request.areas)),
            Self::Fill => {
                let crop = calculate_fill_crop(source, size);
                let cropped = Adjustment::build(
                    Self::Crop,
                    image,
                    AdjustmentRequest::sized(crop.width, crop.height)
                        .with_areas(request.areas.clone()),
                )
                .into_adjusted();
                Adjustment::build(
                    Self::Fit,
                    &cropped,
                    AdjustmentRequest::sized(size.width, size.height),
                )
                .into_adjusted()
            }
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Where an [`Adjustment`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unevaluated,
    SizeKnown,
    Adjusted,
}

enum State<I> {
    Unevaluated,
    SizeKnown(Dimensions),
    Adjusted { size: Dimensions, image: I },
}

/// One adjustment of one image.
///
/// Borrows the source image; the adjusted image is a new value owned by the
/// adjustment until taken with [`Adjustment::into_adjusted`].
pub struct Adjustment<'a, I: Raster> {
    kind: AdjustmentKind,
    image: &'a I,
    request: AdjustmentRequest,
    state: State<I>,
}

impl<'a, I: Raster> Adjustment<'a, I> {
    /// Validate `request` and bind it to `image`.
    pub fn new(
        kind: AdjustmentKind,
        image: &'a I,
        request: AdjustmentRequest,
    ) -> Result<Self, ValidationError> {
        request.validate()?;
        Ok(Self::build(kind, image, request))
    }

    fn build(kind: AdjustmentKind, image: &'a I, request: AdjustmentRequest) -> Self {
        Self {
            kind,
            image,
            request,
            state: State::Unevaluated,
        }
    }

    pub fn kind(&self) -> AdjustmentKind {
        self.kind
    }

    pub fn request(&self) -> &AdjustmentRequest {
        &self.request
    }

    pub fn stage(&self) -> Stage {
        match self.state {
            State::Unevaluated => Stage::Unevaluated,
            State::SizeKnown(_) => Stage::SizeKnown,
            State::Adjusted { .. } => Stage::Adjusted,
        }
    }

    /// Size of the adjusted image. Computed on the first call only.
    pub fn calculate(&mut self) -> Dimensions {
        match self.state {
            State::SizeKnown(size) | State::Adjusted { size, .. } => size,
            State::Unevaluated => {
                let size = self.kind.calculate(self.image.dimensions(), &self.request);
                self.state = State::SizeKnown(size);
                size
            }
        }
    }

    /// The adjusted image. Calculates first if needed; produced once.
    pub fn adjust(&mut self) -> &I {
        let size = self.calculate();
        if let State::Unevaluated | State::SizeKnown(_) = self.state {
            let image = self.produce(size);
            self.state = State::Adjusted { size, image };
        }
        match &self.state {
            State::Adjusted { image, .. } => image,
            State::Unevaluated | State::SizeKnown(_) => self.image,
        }
    }

    /// Consume the adjustment and return the adjusted image.
    pub fn into_adjusted(mut self) -> I {
        let size = self.calculate();
        match std::mem::replace(&mut self.state, State::Unevaluated) {
            State::Adjusted { image, .. } => image,
            State::Unevaluated | State::SizeKnown(_) => self.produce(size),
        }
    }

    fn produce(&self, size: Dimensions) -> I {
        if size == self.image.dimensions() {
            self.image.copy()
        } else {
            self.kind.render(self.image, size, &self.request)
        }
    }
}
