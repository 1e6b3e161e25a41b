//! Several independently seeded trees placed along a ground strip.
//!
//! Each tree gets a depth `z` drawn from `[-depth_range, depth_range]`
//! (lower is nearer the viewer), a horizontal position kept at least
//! `min_spacing` away from the trees placed before it, and a scale that
//! grows quadratically as the tree comes nearer. Trees share no state, so
//! [`Landscape::grow_iterations`] grows them in parallel.

use crate::{
    bounds::Bounds,
    config::{GrowthParameters, ParamError, non_negative, positive},
    render::{self, DrawRecord},
    tree::Tree,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Seed stride between consecutive trees of one landscape.
const SEED_STRIDE: u64 = 7919;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeSettings {
    pub tree_count: usize,
    /// Half-height of the band base depths are drawn from.
    pub depth_range: f32,
    /// Minimum horizontal distance between two tree bases.
    pub min_spacing: f32,
    /// Half-width of the placement strip.
    pub spread: f32,
    /// Rightward shift of the strip per tree in the landscape.
    pub spread_per_tree: f32,
    pub origin_x: f32,
    /// Candidates tried per tree before spacing is given up.
    pub max_placement_attempts: usize,
}

impl Default for LandscapeSettings {
    fn default() -> Self {
        Self {
            tree_count: 3,
            depth_range: 80.0,
            min_spacing: 65.0,
            spread: 350.0,
            spread_per_tree: 150.0,
            origin_x: 10.0,
            max_placement_attempts: 1000,
        }
    }
}

impl LandscapeSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        positive("depth_range", self.depth_range as f64)?;
        positive("max_placement_attempts", self.max_placement_attempts as f64)?;
        non_negative("min_spacing", self.min_spacing)?;
        non_negative("spread", self.spread)?;
        non_negative("spread_per_tree", self.spread_per_tree)?;
        Ok(())
    }

    /// Scale of a tree whose base sits at depth `z`:
    /// `1 + 0.75 * ((depth_range - z) / (2 * depth_range))^2`.
    pub fn scale_at(&self, z: f32) -> f32 {
        1.0 + 0.75 * ((self.depth_range - z) / (2.0 * self.depth_range)).powi(2)
    }
}

/// Where one tree of a landscape grows, and from which seed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub base: Vec2,
    pub scale: f32,
    pub seed: u64,
}

/// Picks a base location, scale and seed for every tree.
///
/// ### Parameters
/// - `settings` - Validated landscape settings.
/// - `seed` - Landscape seed; tree `i` gets `seed + i * 7919`.
/// - `rng` - Random source for depths and horizontal positions.
///
/// ### Returns
/// One [`Placement`] per tree, in placement order.
pub fn plan(settings: &LandscapeSettings, seed: u64, rng: &mut impl Rng) -> Vec<Placement> {
    let n = settings.tree_count;
    let shift = settings.spread_per_tree * n as f32;
    let strip = (-settings.spread + shift)..=(settings.spread + shift);
    let mut placements: Vec<Placement> = Vec::with_capacity(n);

    for index in 0..n {
        let z = rng.random_range(-settings.depth_range..=settings.depth_range);
        let too_close = |x: f32, placed: &[Placement]| {
            placed
                .iter()
                .any(|p| (p.base.x - x).abs() < settings.min_spacing)
        };

        let mut x = settings.origin_x + rng.random_range(strip.clone());
        let mut attempts = 1;
        while too_close(x, &placements) && attempts < settings.max_placement_attempts {
            x = settings.origin_x + rng.random_range(strip.clone());
            attempts += 1;
        }
        if too_close(x, &placements) {
            tracing::warn!(
                index,
                attempts,
                min_spacing = settings.min_spacing,
                "no spaced location found, placing tree anyway"
            );
        }

        placements.push(Placement {
            base: Vec2::new(x, z),
            scale: settings.scale_at(z),
            seed: seed.wrapping_add(index as u64 * SEED_STRIDE),
        });
    }

    placements
}

/// A planned set of trees that grow independently.
#[derive(Debug, Clone)]
pub struct Landscape {
    placements: Vec<Placement>,
    trees: Vec<Tree>,
}

impl Landscape {
    /// Plans placements from `seed` and creates one tree per placement.
    ///
    /// ### Errors
    /// Returns [`ParamError`] if `growth` or `settings` fail validation.
    pub fn new(
        growth: &GrowthParameters,
        settings: &LandscapeSettings,
        seed: u64,
    ) -> Result<Self, ParamError> {
        settings.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let placements = plan(settings, seed, &mut rng);
        let trees = placements
            .iter()
            .map(|p| Tree::new(growth, p.base, p.scale, p.seed))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(trees = trees.len(), seed, "planned landscape");

        Ok(Self { placements, trees })
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [Tree] {
        &mut self.trees
    }

    /// Grows every tree by `steps` steps, one rayon task per tree.
    pub fn grow_iterations(&mut self, steps: usize) {
        self.trees
            .par_iter_mut()
            .for_each(|tree| tree.grow_iterations(steps));
    }

    /// Union of all tree bounds, `None` for an empty landscape.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut trees = self.trees.iter();
        let mut bounds = trees.next()?.bounds();
        for tree in trees {
            bounds.grow_to(&tree.bounds());
        }
        Some(bounds)
    }

    /// Records of every tree, farthest tree first.
    pub fn derive(&self) -> Vec<DrawRecord> {
        let mut per_tree: Vec<(f32, Vec<DrawRecord>)> = self
            .trees
            .par_iter()
            .map(|tree| (tree.params().depth, render::derive(tree)))
            .collect();
        per_tree.sort_by(|a, b| b.0.total_cmp(&a.0));
        per_tree.into_iter().flat_map(|(_, records)| records).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_grows_toward_the_viewer() {
        let s = LandscapeSettings::default();
        assert_eq!(s.scale_at(80.0), 1.0);
        assert_eq!(s.scale_at(-80.0), 1.75);
        assert!((s.scale_at(0.0) - 1.1875).abs() < 1e-6);
    }

    #[test]
    fn plan_keeps_trees_apart() {
        let settings = LandscapeSettings {
            tree_count: 6,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let placements = plan(&settings, 17, &mut rng);

        assert_eq!(placements.len(), 6);
        for (i, a) in placements.iter().enumerate() {
            assert!(a.base.y.abs() <= settings.depth_range);
            assert_eq!(a.scale, settings.scale_at(a.base.y));
            for b in &placements[i + 1..] {
                assert!((a.base.x - b.base.x).abs() >= settings.min_spacing);
            }
        }
    }

    #[test]
    fn strip_shifts_right_with_the_tree_count() {
        for tree_count in [1, 3, 8] {
            let settings = LandscapeSettings {
                tree_count,
                ..Default::default()
            };
            let shift = settings.spread_per_tree * tree_count as f32;
            let lo = settings.origin_x - settings.spread + shift - 1e-3;
            let hi = settings.origin_x + settings.spread + shift + 1e-3;

            let mut rng = ChaCha8Rng::seed_from_u64(tree_count as u64);
            for p in plan(&settings, 0, &mut rng) {
                assert!((lo..=hi).contains(&p.base.x), "{} outside [{lo}, {hi}]", p.base.x);
            }
        }
    }

    #[test]
    fn plan_gives_up_on_spacing_when_the_strip_is_full() {
        let settings = LandscapeSettings {
            tree_count: 4,
            spread: 1.0,
            spread_per_tree: 0.0,
            max_placement_attempts: 10,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let placements = plan(&settings, 3, &mut rng);
        assert_eq!(placements.len(), 4);
    }

    #[test]
    fn tree_seeds_follow_the_stride() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placements = plan(&LandscapeSettings::default(), 100, &mut rng);
        let seeds: Vec<u64> = placements.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, vec![100, 100 + 7919, 100 + 2 * 7919]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = LandscapeSettings {
            depth_range: 0.0,
            ..Default::default()
        };
        assert!(Landscape::new(&GrowthParameters::default(), &settings, 1).is_err());
    }

    #[test]
    fn parallel_growth_matches_sequential_growth() {
        let growth = GrowthParameters::default();
        let mut landscape = Landscape::new(&growth, &LandscapeSettings::default(), 42).unwrap();
        landscape.grow_iterations(90);

        for (placement, grown) in landscape.placements().iter().zip(landscape.trees()) {
            let mut alone = Tree::new(&growth, placement.base, placement.scale, placement.seed).unwrap();
            alone.grow_iterations(90);
            assert_eq!(alone.nodes(), grown.nodes());
        }
    }

    #[test]
    fn same_seed_same_landscape() {
        let growth = GrowthParameters::default();
        let settings = LandscapeSettings::default();
        let a = Landscape::new(&growth, &settings, 5).unwrap();
        let b = Landscape::new(&growth, &settings, 5).unwrap();
        assert_eq!(a.placements(), b.placements());
    }

    #[test]
    fn derive_paints_far_trees_first() {
        let mut landscape =
            Landscape::new(&GrowthParameters::default(), &LandscapeSettings::default(), 9).unwrap();
        landscape.grow_iterations(30);

        let records = landscape.derive();
        let total: usize = landscape.trees().iter().map(Tree::len).sum();
        assert_eq!(records.len(), total);
        for pair in records.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
    }

    #[test]
    fn bounds_cover_all_trees() {
        let mut landscape =
            Landscape::new(&GrowthParameters::default(), &LandscapeSettings::default(), 12).unwrap();
        landscape.grow_iterations(40);
        let bounds = landscape.bounds().unwrap();

        for tree in landscape.trees() {
            let b = tree.bounds();
            assert!(bounds.contains(b.min) && bounds.contains(b.max));
        }
    }
}
