use crate::{
    bounds::Bounds,
    branch::Branch,
    config::{GrowthParameters, ParamError, TreeParameters},
    types::{BranchId, ROOT},
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One simulated tree: an arena of branches, its parameters and its random source.
///
/// `nodes[ROOT]` is the trunk. A branch is only ever referenced by its
/// parent's `children` list, so the arena forms a strict ownership tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Branch>,
    params: TreeParameters,
    rng: ChaCha8Rng,
}

impl Tree {
    /// Creates a tree seeded from `seed`.
    pub fn new(
        growth: &GrowthParameters,
        base_location: Vec2,
        scale: f32,
        seed: u64,
    ) -> Result<Self, ParamError> {
        Self::with_rng(growth, base_location, scale, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a tree that draws all of its randomness from `rng`.
    ///
    /// The trunk starts at `base_location` with the configured initial
    /// velocity plus a uniform per-axis variance, times `scale`. When the
    /// sampled start count `k` is above one, the trunk becomes an inert
    /// dead container of generation `-1` holding `2 * ceil(k / 2)`
    /// generation-0 trunks, exactly `k` of them alive.
    ///
    /// ### Errors
    /// Returns [`ParamError`] when `growth` fails validation or `scale` is
    /// not positive.
    pub fn with_rng(
        growth: &GrowthParameters,
        base_location: Vec2,
        scale: f32,
        mut rng: ChaCha8Rng,
    ) -> Result<Self, ParamError> {
        let params = TreeParameters::derive(growth, base_location, scale)?;

        let variance = growth.initial_velocity_variance;
        let jitter = Vec2::new(
            rng.random_range(-1.0..=1.0f32) * variance,
            rng.random_range(-1.0..=1.0f32) * variance,
        );
        let velocity = (growth.initial_velocity + jitter) * scale;
        let trunk = Branch::new(base_location, velocity, 0, growth, &mut rng);

        let mut tree = Self {
            nodes: vec![trunk],
            params,
            rng,
        };

        let (lo, hi) = growth.start_branches_range;
        let start_count = tree.rng.random_range(lo..=hi);
        if start_count > 1 {
            tree.nodes[ROOT].make_inert();
            for _ in 0..start_count / 2 {
                tree.fork(ROOT);
            }
            if start_count % 2 == 1 {
                let first = tree.nodes[ROOT].children[0];
                tree.nodes[first].kill();
                tree.fork(ROOT);
            }
        }

        tracing::debug!(
            start_count,
            trunks = tree.nodes[ROOT].children.len(),
            scale,
            "seeded tree at ({}, {})",
            base_location.x,
            base_location.y
        );

        Ok(tree)
    }

    fn fork(&mut self, id: BranchId) {
        let children = self.nodes[id].split(&self.params.growth, &mut self.rng);
        self.attach(id, children);
    }

    fn attach(&mut self, parent: BranchId, children: [Branch; 2]) {
        for child in children {
            let child_id = self.nodes.len();
            self.nodes.push(child);
            self.nodes[parent].children.push(child_id);
        }
    }

    /// Advances the whole tree by one step.
    pub fn grow(&mut self) {
        self.grow_branch(ROOT);
    }

    /// Runs [`Tree::grow`] `steps` times.
    pub fn grow_iterations(&mut self, steps: usize) {
        for _ in 0..steps {
            self.grow();
        }
    }

    /// Steps the children of `id` first, then `id` itself.
    ///
    /// Only the children present on entry are visited; a fork of `id`
    /// appends after the loop, so new branches start moving next step.
    fn grow_branch(&mut self, id: BranchId) {
        let existing = self.nodes[id].children.len();
        for i in 0..existing {
            let child = self.nodes[id].children[i];
            self.grow_branch(child);
        }

        if let Some(children) = self.nodes[id].step(&self.params.growth, &mut self.rng) {
            self.attach(id, children);
        }
    }

    pub fn root(&self) -> &Branch {
        &self.nodes[ROOT]
    }

    /// ### Panics
    /// Panics if `id` does not belong to this tree.
    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.nodes[id]
    }

    /// All branches, indexed by [`BranchId`]. Parents always precede children.
    pub fn nodes(&self) -> &[Branch] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn params(&self) -> &TreeParameters {
        &self.params
    }

    /// Number of branches that are still alive (including dying ones).
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|b| b.is_alive()).count()
    }

    pub fn max_generation(&self) -> i32 {
        self.nodes
            .iter()
            .map(Branch::generation)
            .max()
            .unwrap_or(-1)
    }

    /// Bounds of every position any branch has occupied.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.nodes.iter().flat_map(|b| b.history().iter().copied()))
            .unwrap_or_else(|| Bounds::point(self.root().position()))
    }
}
