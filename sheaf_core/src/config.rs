// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack-wide configuration.
//!
//! A [`StackConfig`] is chosen once when a [`SheafStack`] is created and is
//! shared unchanged by every sheet in it. It is plain data: nothing needs to be
//! torn down when the stack goes away.
//!
//! [`SheafStack`]: crate::sheet::SheafStack

use crate::geometry::GeometryConfig;

/// The edge sheets slide in from.
///
/// Chosen at the root and inherited by every nested sheet; individual sheets
/// cannot override it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    /// Sheets attach to the left edge.
    Left,
    /// Sheets attach to the right edge.
    #[default]
    Right,
}

impl Side {
    /// Returns a lowercase label, suitable for attributes and log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Configuration for a [`SheafStack`](crate::sheet::SheafStack).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackConfig {
    /// Edge every sheet in the stack attaches to.
    pub side: Side,
    /// Deepest open depth above which a [`DeepNesting`] advisory is emitted.
    ///
    /// [`DeepNesting`]: crate::sheet::DeepNesting
    pub safe_nesting_threshold: u32,
    /// Constants for the per-sheet geometry.
    pub geometry: GeometryConfig,
}

impl StackConfig {
    /// Default value of [`safe_nesting_threshold`](Self::safe_nesting_threshold).
    pub const DEFAULT_SAFE_NESTING_THRESHOLD: u32 = 10;

    /// Default configuration: right side, threshold 10, default geometry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            side: Side::Right,
            safe_nesting_threshold: Self::DEFAULT_SAFE_NESTING_THRESHOLD,
            geometry: GeometryConfig::new(),
        }
    }

    /// Returns a copy with the given side.
    #[must_use]
    pub const fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Returns a copy with the given safe-nesting threshold.
    #[must_use]
    pub const fn with_safe_nesting_threshold(mut self, threshold: u32) -> Self {
        self.safe_nesting_threshold = threshold;
        self
    }

    /// Returns a copy with the given geometry constants.
    #[must_use]
    pub const fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_side_is_right() {
        assert_eq!(Side::default(), Side::Right);
        assert_eq!(StackConfig::default().side, Side::Right);
    }

    #[test]
    fn builders_override_fields() {
        let config = StackConfig::new()
            .with_side(Side::Left)
            .with_safe_nesting_threshold(3);
        assert_eq!(config.side, Side::Left);
        assert_eq!(config.safe_nesting_threshold, 3);
        assert_eq!(config.geometry, GeometryConfig::new());
    }

    #[test]
    fn side_labels() {
        assert_eq!(Side::Left.as_str(), "left");
        assert_eq!(Side::Right.as_str(), "right");
    }
}
