//! CLI output formatting for all commands.
//!
//! # Size-First Display
//!
//! Every command reports what happened to an image's dimensions first, with
//! the adjustment that did it and the file paths as indented context lines.
//!
//! # Output Format
//!
//! ## Calculate
//!
//! ```text
//! photo.jpg
//!     fill: 4000x3000 → 300x100
//! ```
//!
//! ## Adjust
//!
//! ```text
//! photo.jpg → thumb.jpg
//!     fill: 4000x3000 → 300x100
//!     Areas: 2
//! ```
//!
//! ## Batch
//!
//! ```text
//! thumbnail (fill, 3 images)
//! 001 nested/square.png
//!     150x150 → 200x200
//! 002 tall.png
//!     100x200 → 200x200
//!     Areas: 1
//!
//! Adjusted 3 images → out/
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.

use crate::batch::{BatchEvent, BatchManifest};
use crate::imaging::{AdjustmentKind, Dimensions};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `original → adjusted`, marking unchanged sizes.
fn size_change(original: Dimensions, adjusted: Dimensions) -> String {
    if original == adjusted {
        format!("{} (unchanged)", original)
    } else {
        format!("{} → {}", original, adjusted)
    }
}

/// Context line for a non-empty set of areas.
fn areas_line(depth: usize, areas: usize) -> Option<String> {
    (areas > 0).then(|| format!("{}Areas: {}", indent(depth), areas))
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Calculate / adjust output
// ============================================================================

pub fn format_calculation(
    source: &Path,
    kind: AdjustmentKind,
    original: Dimensions,
    calculated: Dimensions,
) -> Vec<String> {
    vec![
        source.display().to_string(),
        format!("{}{}: {}", indent(1), kind, size_change(original, calculated)),
    ]
}

pub fn print_calculation(
    source: &Path,
    kind: AdjustmentKind,
    original: Dimensions,
    calculated: Dimensions,
) {
    for line in format_calculation(source, kind, original, calculated) {
        println!("{}", line);
    }
}

pub fn format_adjustment(
    source: &Path,
    output: &Path,
    kind: AdjustmentKind,
    original: Dimensions,
    adjusted: Dimensions,
    areas: usize,
) -> Vec<String> {
    let mut lines = vec![
        format!("{} → {}", source.display(), output.display()),
        format!("{}{}: {}", indent(1), kind, size_change(original, adjusted)),
    ];
    lines.extend(areas_line(1, areas));
    lines
}

pub fn print_adjustment(
    source: &Path,
    output: &Path,
    kind: AdjustmentKind,
    original: Dimensions,
    adjusted: Dimensions,
    areas: usize,
) {
    for line in format_adjustment(source, output, kind, original, adjusted, areas) {
        println!("{}", line);
    }
}

pub fn format_mime(value: &str, mime: &str) -> String {
    format!("{} → {}", value, mime)
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            preset,
            adjustment,
            image_count,
        } => vec![format!(
            "{} ({}, {})",
            preset,
            adjustment,
            plural(*image_count, "image")
        )],
        BatchEvent::ImageAdjusted {
            index,
            source,
            original,
            adjusted,
            areas,
            ..
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), source),
                format!("{}{}", indent(1), size_change(*original, *adjusted)),
            ];
            lines.extend(areas_line(1, *areas));
            lines
        }
    }
}

/// Closing summary after a batch.
pub fn format_batch_summary(manifest: &BatchManifest, output_dir: &Path) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Adjusted {} → {}/",
            plural(manifest.images.len(), "image"),
            output_dir.display().to_string().trim_end_matches('/')
        ),
    ]
}

pub fn print_batch_summary(manifest: &BatchManifest, output_dir: &Path) {
    for line in format_batch_summary(manifest, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
