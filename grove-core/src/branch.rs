//! A single branch of a growing tree and its per-step update rules.
//!
//! A [`Branch`] only knows about its own kinematic state. Recursion over
//! children is driven by [`crate::tree::Tree`], which owns every branch in
//! an arena and stores the ids returned by forks in `children`.

use crate::{config::GrowthParameters, types::BranchId};
use glam::Vec2;
use rand::Rng;

/// Lifecycle of a branch.
///
/// `Alive → Dying → Dead` or `Alive → Dead`; `Dead` is terminal.
/// A dying branch keeps moving but never forks again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchState {
    Alive,
    Dying,
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    position: Vec2,
    velocity: Vec2,
    generation: i32,
    state: BranchState,
    history: Vec<Vec2>,
    branch_after: u32,
    pub(crate) children: Vec<BranchId>,
}

impl Branch {
    /// Creates a live branch at `position` and samples its fork threshold.
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        generation: i32,
        params: &GrowthParameters,
        rng: &mut impl Rng,
    ) -> Self {
        let (lo, hi) = params.branch_after_range;
        Self {
            position,
            velocity,
            generation,
            state: BranchState::Alive,
            history: vec![position],
            branch_after: rng.random_range(lo..=hi),
            children: Vec::with_capacity(2),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn generation(&self) -> i32 {
        self.generation
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    /// `true` until the branch is dead; a dying branch still counts as alive.
    pub fn is_alive(&self) -> bool {
        self.state != BranchState::Dead
    }

    pub fn is_dying(&self) -> bool {
        self.state == BranchState::Dying
    }

    /// Every position this branch has occupied, oldest first. Never empty.
    pub fn history(&self) -> &[Vec2] {
        &self.history
    }

    pub fn branch_after(&self) -> u32 {
        self.branch_after
    }

    /// Ids of the forked children, in spawn order.
    pub fn children(&self) -> &[BranchId] {
        &self.children
    }

    pub(crate) fn kill(&mut self) {
        self.state = BranchState::Dead;
    }

    /// Turns the branch into the dead generation `-1` container that holds
    /// the trunks of a multi-trunk tree.
    pub(crate) fn make_inert(&mut self) {
        self.state = BranchState::Dead;
        self.generation = -1;
    }

    /// Advances this branch by one time step, ignoring its children.
    ///
    /// The order is: height check, age check, gravity and damping,
    /// integration, then the fork check. A branch that is dead, or dies in
    /// the first two checks, is left untouched.
    ///
    /// ### Parameters
    /// - `params` - Growth parameters of the owning tree.
    /// - `rng` - Random source of the owning tree.
    ///
    /// ### Returns
    /// The two new children if the branch forked during this step.
    pub fn step(&mut self, params: &GrowthParameters, rng: &mut impl Rng) -> Option<[Branch; 2]> {
        if self.state == BranchState::Dead {
            return None;
        }

        if self.velocity.y < 0.0 {
            let (lo, hi) = params.top_out_range;
            if self.position.y < rng.random_range(lo..=hi) as f32 {
                self.state = BranchState::Dead;
            }
        }

        if self.state != BranchState::Dead && self.history.len() > 3 {
            let (lo, hi) = params.age_death_range;
            if rng.random_range(lo..=hi) < self.generation {
                self.state = BranchState::Dead;
            }
        }

        if self.state == BranchState::Dead {
            return None;
        }

        self.apply_gravity(params, rng);

        self.position += self.velocity;
        self.history.push(self.position);

        if self.history.len() > self.branch_after as usize {
            let was_dying = self.state == BranchState::Dying;
            if params.keep_central_probability < rng.random::<f32>() {
                self.state = BranchState::Dead;
            }
            if was_dying {
                return None;
            }
            return Some(self.split(params, rng));
        }

        None
    }

    fn apply_gravity(&mut self, params: &GrowthParameters, rng: &mut impl Rng) {
        let weight = self.velocity.x.atan2(self.velocity.y).sin();
        let accel = params.gravity * weight.abs();
        let descending = self.velocity.y < 0.0;

        let drag = if descending {
            params.descending_drag
        } else {
            params.ascending_drag
        };
        self.velocity.y -= accel * drag;

        if descending {
            self.velocity *= params.down_damping;
            if self.state == BranchState::Alive
                && rng.random_range(1..=params.down_die_probability) == 4
            {
                self.state = BranchState::Dying;
            }
        }
    }

    /// Builds the two children of a fork at the current position.
    ///
    /// Each child direction is the current velocity pushed sideways by a
    /// randomized split offset, rescaled to the current speed times an
    /// independent jitter from `params.split_jitter`.
    ///
    /// ### Returns
    /// `[left, right]`, both of generation `self.generation + 1`.
    pub fn split(&self, params: &GrowthParameters, rng: &mut impl Rng) -> [Branch; 2] {
        let speed = self.velocity.length();

        let left = self.velocity - Vec2::new(split_offset(params, rng), 0.0);
        let right = self.velocity + Vec2::new(split_offset(params, rng), 0.0);

        let (lo, hi) = params.split_jitter;
        let left = left.normalize_or_zero() * speed * rng.random_range(lo..=hi);
        let right = right.normalize_or_zero() * speed * rng.random_range(lo..=hi);

        let generation = self.generation + 1;
        [
            Branch::new(self.position, left, generation, params, rng),
            Branch::new(self.position, right, generation, params, rng),
        ]
    }
}

fn split_offset(params: &GrowthParameters, rng: &mut impl Rng) -> f32 {
    params.branch_split * (1.0 + params.branch_split_variance * rng.random::<f32>() - 0.5)
}
