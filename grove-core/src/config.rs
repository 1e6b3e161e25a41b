//! Growth configuration and its validation.
//!
//! [`GrowthParameters`] is the read-only bag threaded through a whole
//! simulation run. It is supplied by an outside collaborator (a config
//! file, a UI) and is never mutated once a tree starts growing. Per-tree
//! derived values live in [`TreeParameters`].

use crate::color::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected by [`GrowthParameters::validate`] or a tree constructor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{name}: range minimum {min} is greater than maximum {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must lie in [0, 1], got {value}")]
    NotUnit { name: &'static str, value: f64 },

    #[error("{name} must be at least {min}, got {value}")]
    BelowMinimum {
        name: &'static str,
        min: f64,
        value: f64,
    },
}

/// Darkening applied to the base color of a tree at scale 1. Larger trees
/// darken less: the factor is `100 + trunc(SCALE_SHADE / scale)`.
pub const SCALE_SHADE: f32 = 50.0;

/// Smallest scale whose stroke scale `(scale - 1) * 3 + 1` is not negative.
pub const MIN_SCALE: f32 = 2.0 / 3.0;

/// Physical, probabilistic and paint settings for branch growth.
///
/// Ranges are inclusive `(min, max)` pairs. The defaults reproduce the
/// tuned look of the default scene, including the asymmetric drag
/// multipliers and the age/top-out sampling ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParameters {
    pub gravity: f32,
    /// Per-axis velocity factors applied while a branch descends.
    pub down_damping: Vec2,
    /// Gravity multiplier while the velocity does not point down.
    pub ascending_drag: f32,
    /// Gravity multiplier while the velocity points down.
    pub descending_drag: f32,
    /// Number of history points after which a branch forks.
    pub branch_after_range: (u32, u32),
    pub branch_split: f32,
    pub branch_split_variance: f32,
    /// Speed factor range applied independently to each forked child.
    pub split_jitter: (f32, f32),
    /// A descending branch starts dying when a draw from `1..=p` hits 4.
    pub down_die_probability: u32,
    pub keep_central_probability: f32,
    pub start_branches_range: (u32, u32),
    /// A sample from this range below the generation kills the branch.
    pub age_death_range: (i32, i32),
    /// A descending branch below a height sampled from this range stops.
    pub top_out_range: (i32, i32),
    pub color: Color,
    pub painter_generations: u32,
    pub painter_thickness: f32,
    pub initial_velocity: Vec2,
    pub initial_velocity_variance: f32,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self {
            gravity: 0.06,
            down_damping: Vec2::new(0.92, 0.92),
            ascending_drag: 3.0,
            descending_drag: 1.0,
            branch_after_range: (10, 22),
            branch_split: 1.2,
            branch_split_variance: 0.8,
            split_jitter: (0.9, 1.1),
            down_die_probability: 20,
            keep_central_probability: 0.1,
            start_branches_range: (1, 3),
            age_death_range: (8, 20),
            top_out_range: (12, 40),
            color: Color::default(),
            painter_generations: 12,
            painter_thickness: 6.0,
            initial_velocity: Vec2::new(0.0, 5.0),
            initial_velocity_variance: 0.8,
        }
    }
}

impl GrowthParameters {
    /// Checks every precondition the growth step relies on.
    ///
    /// Nothing is clamped: the first violated contract is returned.
    pub fn validate(&self) -> Result<(), ParamError> {
        ordered("branch_after_range", self.branch_after_range)?;
        ordered("start_branches_range", self.start_branches_range)?;
        ordered("age_death_range", self.age_death_range)?;
        ordered("top_out_range", self.top_out_range)?;
        ordered("split_jitter", self.split_jitter)?;
        unit("keep_central_probability", self.keep_central_probability)?;
        positive("down_die_probability", self.down_die_probability as f64)?;
        positive("painter_generations", self.painter_generations as f64)?;
        non_negative("painter_thickness", self.painter_thickness)?;
        non_negative("initial_velocity_variance", self.initial_velocity_variance)?;
        Ok(())
    }
}

pub(crate) fn ordered<T: Into<f64> + PartialOrd + Copy>(
    name: &'static str,
    (min, max): (T, T),
) -> Result<(), ParamError> {
    if min > max {
        return Err(ParamError::InvertedRange {
            name,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

pub(crate) fn unit(name: &'static str, value: f32) -> Result<(), ParamError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ParamError::NotUnit {
            name,
            value: value as f64,
        });
    }
    Ok(())
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ParamError::NotPositive { name, value });
    }
    Ok(())
}

pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<(), ParamError> {
    if value.is_nan() || value < 0.0 {
        return Err(ParamError::Negative {
            name,
            value: value as f64,
        });
    }
    Ok(())
}

/// Per-tree copy of the growth parameters with values derived at construction.
///
/// ### Fields
/// - `growth` - The caller's parameters, copied so sibling trees never
///   observe each other.
/// - `scale` - Size factor of the tree (trees nearer the viewer are larger).
/// - `color` - Base color darkened for this tree's scale, hue kept.
/// - `depth` - Height of the tree's base location, used for draw ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeParameters {
    pub growth: GrowthParameters,
    pub scale: f32,
    pub color: Color,
    pub depth: f32,
}

impl TreeParameters {
    /// Validates `growth` and bakes in the per-tree values.
    ///
    /// ### Errors
    /// Returns [`ParamError`] if `growth` is invalid or `scale` is below
    /// [`MIN_SCALE`], where strokes would get a negative width.
    pub fn derive(growth: &GrowthParameters, base: Vec2, scale: f32) -> Result<Self, ParamError> {
        growth.validate()?;
        positive("scale", scale as f64)?;
        if stroke_scale_at(scale) < 0.0 {
            return Err(ParamError::BelowMinimum {
                name: "scale",
                min: MIN_SCALE as f64,
                value: scale as f64,
            });
        }

        // Factors of 100 and above darken in HSV value only, so the hue survives.
        let shade = 100 + (SCALE_SHADE / scale) as i32;
        Ok(Self {
            growth: growth.clone(),
            scale,
            color: growth.color.darker(shade),
            depth: base.y,
        })
    }

    /// Stroke scale factor: `(scale - 1) * 3 + 1`.
    pub fn stroke_scale(&self) -> f32 {
        stroke_scale_at(self.scale)
    }
}

fn stroke_scale_at(scale: f32) -> f32 {
    (scale - 1.0) * 3.0 + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GrowthParameters::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = GrowthParameters {
            branch_after_range: (9, 3),
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamError::InvertedRange {
                name: "branch_after_range",
                min: 9.0,
                max: 3.0,
            })
        );
    }

    #[test]
    fn keep_central_outside_unit_interval_is_rejected() {
        let params = GrowthParameters {
            keep_central_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamError::NotUnit {
                name: "keep_central_probability",
                ..
            })
        ));
    }

    #[test]
    fn zero_painter_generations_is_rejected() {
        let params = GrowthParameters {
            painter_generations: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamError::NotPositive { .. })
        ));
    }

    #[test]
    fn negative_thickness_is_rejected() {
        let params = GrowthParameters {
            painter_thickness: -2.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamError::Negative {
                name: "painter_thickness",
                value: -2.0,
            })
        );
    }

    #[test]
    fn derive_bakes_scale_depth_and_shade() {
        let growth = GrowthParameters::default();
        let derived = TreeParameters::derive(&growth, Vec2::new(10.0, -35.0), 2.0).unwrap();

        assert_eq!(derived.scale, 2.0);
        assert_eq!(derived.depth, -35.0);
        assert_eq!(derived.stroke_scale(), 4.0);
        // 100 + 50 / 2
        assert_eq!(derived.color, growth.color.darker(125));
        assert_eq!(derived.growth, growth);
    }

    #[test]
    fn derive_rejects_non_positive_scale() {
        let growth = GrowthParameters::default();
        assert!(TreeParameters::derive(&growth, Vec2::ZERO, 0.0).is_err());
    }

    #[test]
    fn tree_color_keeps_the_base_hue_across_landscape_scales() {
        let growth = GrowthParameters::default();
        let base = growth.color;

        for step in 0..=15 {
            let scale = 1.0 + 0.05 * step as f32;
            let color = TreeParameters::derive(&growth, Vec2::ZERO, scale).unwrap().color;
            let factor = 100.0 / (100 + (50.0 / scale) as i32) as f32;

            assert_ne!(color, Color::new(255, 255, 255), "scale {scale}");
            for (got, want) in [(color.r, base.r), (color.g, base.g), (color.b, base.b)] {
                assert!(got < want, "scale {scale}: {color:?} is not darker than {base:?}");
                assert!(
                    (got as f32 - want as f32 * factor).abs() <= 2.0,
                    "scale {scale}: {color:?} drifted from the hue of {base:?}"
                );
            }
        }
    }

    #[test]
    fn far_trees_are_darker_than_near_ones() {
        let growth = GrowthParameters::default();
        let far = TreeParameters::derive(&growth, Vec2::ZERO, 1.0).unwrap().color;
        let near = TreeParameters::derive(&growth, Vec2::ZERO, 1.75).unwrap().color;
        assert!(far.r < near.r && far.g < near.g && far.b < near.b);
    }

    #[test]
    fn derive_rejects_scales_with_negative_strokes() {
        let growth = GrowthParameters::default();
        assert!(matches!(
            TreeParameters::derive(&growth, Vec2::ZERO, 0.5),
            Err(ParamError::BelowMinimum { name: "scale", .. })
        ));

        let smallest = TreeParameters::derive(&growth, Vec2::ZERO, 0.67).unwrap();
        assert!(smallest.stroke_scale() >= 0.0);
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ParamError::NotPositive {
            name: "scale",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "scale must be positive, got -1");
    }
}
