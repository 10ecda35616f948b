//! Lookup of adjustments by name.
//!
//! A registry maps slugs (`"fit"`, `"crop"`, `"fill"`, plus any configured
//! aliases) to an [`AdjustmentKind`]. Unknown slugs resolve to the default
//! adjustment, [`DEFAULT_ADJUSTMENT`], instead of failing.
//!
//! The process-wide [`registry()`] holds only the built-in kinds and is
//! built once on first use. Registries with aliases are built at startup
//! (see [`AdjustmentRegistry::with_aliases`]) and only read afterwards.

use super::adjustment::{Adjustment, AdjustmentKind};
use super::backend::Raster;
use super::params::{AdjustmentRequest, ValidationError};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// Slug used when a lookup misses.
pub const DEFAULT_ADJUSTMENT: &str = "fit";

static DEFAULT_REGISTRY: LazyLock<AdjustmentRegistry> = LazyLock::new(AdjustmentRegistry::new);

/// The shared registry of built-in adjustments.
pub fn registry() -> &'static AdjustmentRegistry {
    &DEFAULT_REGISTRY
}

/// Build an adjustment by slug from the shared registry.
pub fn get_adjustment<'a, I: Raster>(
    slug: &str,
    image: &'a I,
    request: AdjustmentRequest,
) -> Result<Adjustment<'a, I>, ValidationError> {
    registry().get_adjustment(slug, image, request)
}

#[derive(Debug, Clone)]
pub struct AdjustmentRegistry {
    entries: BTreeMap<String, AdjustmentKind>,
}

impl AdjustmentRegistry {
    /// Registry with every built-in kind under its own slug.
    pub fn new() -> Self {
        let entries = AdjustmentKind::ALL
            .into_iter()
            .map(|kind| (kind.slug().to_string(), kind))
            .collect();
        Self { entries }
    }

    /// Built-in kinds plus `aliases` (alias → already registered slug).
    ///
    /// Aliases may point at other aliases as long as they are registered
    /// first; `BTreeMap` iteration is by alias name.
    pub fn with_aliases(aliases: &BTreeMap<String, String>) -> Result<Self, ValidationError> {
        let mut registry = Self::new();
        for (alias, target) in aliases {
            let kind = registry.entries.get(target).copied().ok_or_else(|| {
                ValidationError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                }
            })?;
            registry.register(alias.clone(), kind);
        }
        Ok(registry)
    }

    /// Add or replace `slug`.
    pub fn register(&mut self, slug: impl Into<String>, kind: AdjustmentKind) {
        self.entries.insert(slug.into(), kind);
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// Registered slugs in sorted order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Kind registered as `slug`, or the default kind.
    pub fn lookup(&self, slug: &str) -> AdjustmentKind {
        if let Some(kind) = self.entries.get(slug) {
            return *kind;
        }
        debug!(slug, default = DEFAULT_ADJUSTMENT, "unknown adjustment, using default");
        self.entries
            .get(DEFAULT_ADJUSTMENT)
            .copied()
            .unwrap_or(AdjustmentKind::Fit)
    }

    /// Build the adjustment registered as `slug` (or the default) for `image`.
    pub fn get_adjustment<'a, I: Raster>(
        &self,
        slug: &str,
        image: &'a I,
        request: AdjustmentRequest,
    ) -> Result<Adjustment<'a, I>, ValidationError> {
        Adjustment::new(self.lookup(slug), image, request)
    }
}

impl Default for AdjustmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
