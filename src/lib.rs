//! # Cropwise
//!
//! Named image adjustments that respect what matters in the picture. Callers
//! ask for a size and an adjustment (`fit`, `crop` or `fill`), optionally
//! marking weighted areas of interest; cropping strategies place their window
//! so the areas lose as little as possible.
//!
//! # Architecture: Size First, Pixels Second
//!
//! Every adjustment runs in two steps that can be used independently:
//!
//! ```text
//! 1. Calculate   source size + request  →  output size      (pure arithmetic)
//! 2. Adjust      source image + size    →  derived image    (crop / resize)
//! ```
//!
//! - **Cheap planning**: the output size is known without decoding pixels, so
//!   `cropwise calculate` only reads the image header.
//! - **Testability**: all dimension math and the crop placement search are
//!   pure functions; the pixel step runs against the [`imaging::Raster`]
//!   trait, which tests implement with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Adjustment kinds, dimension math, areas, crop placement search, registry, `image` crate backend |
//! | [`mime`] | Extension / MIME type resolution and output format lookup |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`batch`] | Parallel preset application over a directory with area sidecars |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Unknown Adjustments Fall Back to Fit
//!
//! Adjustment names come from URLs, config files and command lines. An
//! unknown name resolves to `fit` (logged at debug level) instead of failing,
//! so a typo yields a correctly sized image rather than no image. Malformed
//! *values* (zero sizes, empty areas, non-positive priorities) are still
//! rejected with a [`imaging::ValidationError`].
//!
//! ## Exhaustive Crop Placement
//!
//! The crop window is placed by trying every origin and summing the area
//! penalties. Sums stop early once they exceed the best total so far, and
//! large grids are split across rayon workers one column each. Among equal
//! totals the first origin in column-major scan order wins, so results are
//! reproducible whichever search runs.
//!
//! ## Zero Sizes Never Reach the Backend
//!
//! A calculation that rounds a side down to zero falls back to the source
//! size. The backend is never asked for an empty image.
//!
//! ## Config Over Stock Defaults
//!
//! A sparse user `config.toml` is merged over the stock defaults key by key,
//! so overriding one preset field keeps the rest. Unknown keys are errors.
//!
//! # Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events (`debug` for
//! fallbacks and chosen windows, `trace` for search statistics, `info` for
//! batch progress) and never installs a subscriber.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod mime;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
