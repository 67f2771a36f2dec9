// Copyright 2026 the Sheaf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-to-geometry mapping.
//!
//! [`sheet_geometry`] is a pure function of `(depth, deepest_open_depth,
//! offset)`. Ancestors of the deepest open sheet shrink horizontally by
//! [`scale_step`](GeometryConfig::scale_step) per level, never below
//! [`min_scale`](GeometryConfig::min_scale). Every sheet below the root level
//! is pushed down by its offset, which defaults to
//! `depth * offset_multiplier`.
//!
//! The output is deterministic: identical inputs produce identical values and
//! byte-identical strings, so callers may cache it per input triple.

use alloc::format;
use alloc::string::String;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Affine;

/// Easing curve of the geometry transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Slow start.
    EaseIn,
    /// Slow end.
    EaseOut,
    /// Slow start and end.
    #[default]
    EaseInOut,
}

impl Easing {
    /// Returns the CSS timing-function keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
        }
    }
}

/// Transition applied whenever a sheet's geometry changes.
///
/// Emitted with every geometry, so scale and offset changes animate instead of
/// jumping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Duration in milliseconds.
    pub duration_ms: u32,
    /// Easing curve.
    pub easing: Easing,
}

impl Transition {
    /// 300ms ease-in-out.
    pub const DEFAULT: Self = Self {
        duration_ms: 300,
        easing: Easing::EaseInOut,
    };
}

impl Default for Transition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {}ms {}", self.duration_ms, self.easing.as_css())
    }
}

/// Constants of the geometry mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryConfig {
    /// Horizontal scale lost per level between a sheet and the deepest open
    /// sheet.
    pub scale_step: f64,
    /// Lower bound of the horizontal scale.
    pub min_scale: f64,
    /// Default offset per depth level, in length units.
    pub offset_multiplier: f64,
    /// Added to the applied offset to get the `bottom` position.
    pub bottom_offset_base: f64,
    /// Transition accompanying every geometry.
    pub transition: Transition,
}

impl GeometryConfig {
    /// Default scale step (0.05).
    pub const DEFAULT_SCALE_STEP: f64 = 0.05;
    /// Default scale floor (0.5).
    pub const DEFAULT_MIN_SCALE: f64 = 0.5;
    /// Default offset multiplier (16).
    pub const DEFAULT_OFFSET_MULTIPLIER: f64 = 16.0;
    /// Default bottom offset base (8).
    pub const DEFAULT_BOTTOM_OFFSET_BASE: f64 = 8.0;

    /// Returns the default constants.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scale_step: Self::DEFAULT_SCALE_STEP,
            min_scale: Self::DEFAULT_MIN_SCALE,
            offset_multiplier: Self::DEFAULT_OFFSET_MULTIPLIER,
            bottom_offset_base: Self::DEFAULT_BOTTOM_OFFSET_BASE,
            transition: Transition::DEFAULT,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendering geometry of one sheet.
///
/// `None` fields are absent from the output, not zero: a sheet at the deepest
/// open depth has no scale, and a root-level sheet has neither translation nor
/// bottom offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetGeometry {
    /// Horizontal scale, present only when below 1.
    pub scale_x: Option<f64>,
    /// Vertical translation in length units, present only when depth > 0.
    pub translate_y: Option<f64>,
    /// `bottom` position in length units, present only when depth > 0.
    pub bottom: Option<f64>,
    /// Transition directive, always present.
    pub transition: Transition,
}

impl SheetGeometry {
    /// Geometry with no transform and no offset.
    #[must_use]
    pub const fn identity(transition: Transition) -> Self {
        Self {
            scale_x: None,
            translate_y: None,
            bottom: None,
            transition,
        }
    }

    /// Returns the CSS `transform` value, or `None` when there is nothing to
    /// transform.
    #[must_use]
    pub fn transform(&self) -> Option<String> {
        match (self.scale_x, self.translate_y) {
            (None, None) => None,
            (Some(s), None) => Some(format!("scaleX({})", css_number(s))),
            (None, Some(y)) => Some(format!("translateY({}px)", css_number(y))),
            (Some(s), Some(y)) => Some(format!(
                "scaleX({}) translateY({}px)",
                css_number(s),
                css_number(y)
            )),
        }
    }

    /// Returns the CSS `bottom` value, if any.
    #[must_use]
    pub fn bottom_css(&self) -> Option<String> {
        self.bottom.map(|b| format!("{}px", css_number(b)))
    }

    /// Returns the CSS `transition` value.
    #[must_use]
    pub fn transition_css(&self) -> String {
        format!("{}", self.transition)
    }

    /// Returns the transform as an affine map, for renderers that do not speak
    /// CSS.
    ///
    /// Matches the CSS order: scale is applied after the translation.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let scale = self.scale_x.unwrap_or(1.0);
        let y = self.translate_y.unwrap_or(0.0);
        Affine::scale_non_uniform(scale, 1.0) * Affine::translate((0.0, y))
    }
}

/// Returns the horizontal scale of a sheet at `depth` while
/// `deepest_open_depth` is the deepest open level.
///
/// Sheets at or below the deepest level get exactly 1.
#[must_use]
pub fn scale_for(depth: u32, deepest_open_depth: u32, config: &GeometryConfig) -> f64 {
    let levels = deepest_open_depth.saturating_sub(depth);
    if levels == 0 {
        return 1.0;
    }
    (1.0 - f64::from(levels) * config.scale_step).max(config.min_scale)
}

/// Returns the offset a sheet at `depth` gets when no override is set.
#[must_use]
pub fn default_offset(depth: u32, config: &GeometryConfig) -> f64 {
    f64::from(depth) * config.offset_multiplier
}

/// Maps a sheet's depth, the deepest open depth, and an optional offset
/// override to its rendering geometry.
#[must_use]
pub fn sheet_geometry(
    depth: u32,
    deepest_open_depth: u32,
    offset: Option<f64>,
    config: &GeometryConfig,
) -> SheetGeometry {
    let mut geometry = SheetGeometry::identity(config.transition);

    let scale = scale_for(depth, deepest_open_depth, config);
    if scale < 1.0 {
        geometry.scale_x = Some(scale);
    }

    if depth > 0 {
        let applied = offset.unwrap_or_else(|| default_offset(depth, config));
        geometry.translate_y = Some(applied);
        geometry.bottom = Some(applied + config.bottom_offset_base);
    }

    geometry
}

/// Rounds to 4 decimals so that float noise never reaches the output strings.
fn css_number(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn scale_at(levels: u32) -> f64 {
        scale_for(0, levels, &GeometryConfig::new())
    }

    #[test]
    fn deepest_sheet_is_unscaled() {
        let config = GeometryConfig::new();
        for depth in 0..20 {
            let g = sheet_geometry(depth, depth, None, &config);
            assert_eq!(g.scale_x, None, "depth {depth} should be unscaled");
        }
    }

    #[test]
    fn scale_law_and_floor() {
        assert!((scale_at(0) - 1.0).abs() < EPS);
        assert!((scale_at(1) - 0.95).abs() < EPS);
        assert!((scale_at(9) - 0.55).abs() < EPS);
        assert!((scale_at(10) - 0.5).abs() < EPS);
        assert!((scale_at(100) - 0.5).abs() < EPS);
        assert!(scale_at(u32::MAX) > 0.0, "floor must hold at any depth");
    }

    #[test]
    fn sheets_deeper_than_the_deepest_open_stay_unscaled() {
        let g = sheet_geometry(3, 1, None, &GeometryConfig::new());
        assert_eq!(g.scale_x, None);
    }

    #[test]
    fn root_level_has_no_offset() {
        let g = sheet_geometry(0, 4, None, &GeometryConfig::new());
        assert_eq!(g.translate_y, None);
        assert_eq!(g.bottom, None);
        assert_eq!(g.bottom_css(), None);
        assert_eq!(g.transition, Transition::DEFAULT);
    }

    #[test]
    fn default_offset_at_depth_two() {
        let g = sheet_geometry(2, 2, None, &GeometryConfig::new());
        assert_eq!(g.translate_y, Some(32.0));
        assert_eq!(g.bottom, Some(40.0));
        assert_eq!(g.transform().as_deref(), Some("translateY(32px)"));
        assert_eq!(g.bottom_css().as_deref(), Some("40px"));
    }

    #[test]
    fn explicit_offset_overrides_default() {
        let g = sheet_geometry(2, 2, Some(5.0), &GeometryConfig::new());
        assert_eq!(g.translate_y, Some(5.0));
        assert_eq!(g.bottom, Some(13.0));
    }

    #[test]
    fn explicit_offset_is_ignored_at_root_level() {
        let g = sheet_geometry(0, 0, Some(5.0), &GeometryConfig::new());
        assert_eq!(g.translate_y, None);
        assert_eq!(g.bottom, None);
    }

    #[test]
    fn transform_strings() {
        let config = GeometryConfig::new();
        assert_eq!(sheet_geometry(0, 0, None, &config).transform(), None);
        assert_eq!(
            sheet_geometry(0, 1, None, &config).transform().as_deref(),
            Some("scaleX(0.95)")
        );
        assert_eq!(
            sheet_geometry(1, 3, None, &config).transform().as_deref(),
            Some("scaleX(0.9) translateY(16px)")
        );
        assert_eq!(
            sheet_geometry(0, 9, None, &config).transform().as_deref(),
            Some("scaleX(0.55)")
        );
    }

    #[test]
    fn transition_css() {
        let g = sheet_geometry(0, 0, None, &GeometryConfig::new());
        assert_eq!(g.transition_css(), "all 300ms ease-in-out");
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let config = GeometryConfig::new();
        let a = sheet_geometry(3, 7, Some(12.5), &config);
        let b = sheet_geometry(3, 7, Some(12.5), &config);
        assert_eq!(a, b);
        assert_eq!(a.transform(), b.transform());
    }

    #[test]
    fn custom_constants() {
        let config = GeometryConfig {
            scale_step: 0.1,
            min_scale: 0.8,
            offset_multiplier: 10.0,
            bottom_offset_base: 0.0,
            transition: Transition {
                duration_ms: 150,
                easing: Easing::Linear,
            },
        };
        let g = sheet_geometry(1, 4, None, &config);
        assert_eq!(g.scale_x, Some(0.8));
        assert_eq!(g.translate_y, Some(10.0));
        assert_eq!(g.bottom, Some(10.0));
        assert_eq!(g.transition_css(), "all 150ms linear");
    }

    #[test]
    fn affine_matches_fields() {
        let g = sheet_geometry(1, 2, None, &GeometryConfig::new());
        let coeffs = g.to_affine().as_coeffs();
        assert!((coeffs[0] - 0.95).abs() < EPS, "x scale");
        assert!((coeffs[3] - 1.0).abs() < EPS, "y scale");
        assert!((coeffs[4] - 0.0).abs() < EPS, "x translation");
        assert!((coeffs[5] - 16.0).abs() < EPS, "y translation");
    }

    #[test]
    fn identity_affine() {
        let g = sheet_geometry(0, 0, None, &GeometryConfig::new());
        assert_eq!(g.to_affine(), Affine::IDENTITY);
    }
}
