//! Render-attribute derivation: turns a simulated [`Tree`] into drawable records.
//!
//! Nothing here paints. Every branch becomes one [`DrawRecord`] holding a
//! polyline (its history, or the part not yet emitted), a fill color, an
//! outline color with its offset, and a stroke width. Records come out
//! depth-first with children before their parent, so a renderer that paints
//! them in order puts trunks on top of twigs.
//!
//! - [`derive`] is a pure function of the tree.
//! - [`IncrementalDeriver`] keeps one cursor per branch and emits only the
//!   history grown since its previous call, for progressive display.

use crate::{
    branch::Branch,
    color::Color,
    config::TreeParameters,
    tree::Tree,
    types::{BranchId, ROOT},
};
use glam::Vec2;
use serde::Serialize;

/// History length over which a generation-0 branch fades in.
pub const FADE_IN_POINTS: usize = 30;
const FADE_IN_CEILING: f32 = 126.0;
const BASE_INTENSITY: f32 = 17.0;
const INTENSITY_SPAN: f32 = 99.0;
const OUTLINE_DARKEN: i32 = 500;
const OUTLINE_OFFSET: f32 = 0.15;

/// Everything an external renderer needs to draw one branch.
///
/// ### Fields
/// - `branch` - Id of the branch in its tree.
/// - `generation` - Generation of the branch (`-1` for an inert root).
/// - `points` - Polyline in world coordinates, y up.
/// - `fill` - Stroke color of the polyline.
/// - `outline` - Color of the shadow stroke painted beneath the fill.
/// - `outline_offset` - Displacement of the shadow stroke from `points`.
/// - `pen_width` - Stroke width for both strokes.
/// - `depth` - Height of the tree's base; lower means nearer the viewer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawRecord {
    pub branch: BranchId,
    pub generation: i32,
    pub points: Vec<Vec2>,
    pub fill: Color,
    pub outline: Color,
    pub outline_offset: Vec2,
    pub pen_width: f32,
    pub depth: f32,
}

impl DrawRecord {
    /// A polyline needs at least two points to leave a mark.
    pub fn is_visible(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn outline_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(|&p| p + self.outline_offset)
    }
}

/// Stroke width of a branch of `generation`.
///
/// `max(0, G - generation) / G * painter_thickness * stroke_scale`, where
/// `G` is `painter_generations`; branches at or past `G` get width zero.
pub fn pen_width(generation: i32, params: &TreeParameters) -> f32 {
    let gens = params.growth.painter_generations as f32;
    let remaining = (gens - generation as f32).max(0.0);
    remaining / gens * params.growth.painter_thickness * params.stroke_scale()
}

/// Color intensity in `0..=127`-ish units; higher renders closer to the base color.
///
/// A generation-0 branch with fewer than [`FADE_IN_POINTS`] points ramps
/// up linearly from zero. Every other branch gets a fixed baseline plus a
/// share that shrinks to nothing as `generation` reaches
/// `painter_generations`.
///
/// ### Parameters
/// - `generation` - Generation of the branch.
/// - `history_len` - Number of points in the branch's history.
/// - `painter_generations` - Generation count over which the color fades.
pub fn intensity(generation: i32, history_len: usize, painter_generations: u32) -> f32 {
    if generation == 0 && history_len < FADE_IN_POINTS {
        return FADE_IN_CEILING / FADE_IN_POINTS as f32 * history_len as f32;
    }
    let gens = painter_generations as f32;
    BASE_INTENSITY + INTENSITY_SPAN * (gens - generation as f32).max(0.0) / gens
}

/// [`Color::darker`] factor for an intensity: `trunc(85 + (127 - intensity) * 4)`.
pub fn shade_factor(intensity: f32) -> i32 {
    (85.0 + (127.0 - intensity) * 4.0) as i32
}

fn record(id: BranchId, branch: &Branch, params: &TreeParameters, start: usize) -> DrawRecord {
    let history = branch.history();
    let start = start.min(history.len());

    let pen_width = pen_width(branch.generation(), params);
    let intensity = intensity(
        branch.generation(),
        history.len(),
        params.growth.painter_generations,
    );
    let fill = params.color.darker(shade_factor(intensity));

    DrawRecord {
        branch: id,
        generation: branch.generation(),
        points: history[start..].to_vec(),
        fill,
        outline: fill.darker(OUTLINE_DARKEN),
        outline_offset: Vec2::new(OUTLINE_OFFSET, -OUTLINE_OFFSET) * pen_width,
        pen_width,
        depth: params.depth,
    }
}

/// Calls `f` for every branch below `id`, children before parents.
fn visit(tree: &Tree, id: BranchId, f: &mut impl FnMut(BranchId, &Branch)) {
    let branch = tree.branch(id);
    for &child in branch.children() {
        visit(tree, child, f);
    }
    f(id, branch);
}

/// Derives one record per branch of `tree` from its full history.
pub fn derive(tree: &Tree) -> Vec<DrawRecord> {
    let mut out = Vec::with_capacity(tree.len());
    visit(tree, ROOT, &mut |id, branch| {
        out.push(record(id, branch, tree.params(), 0));
    });
    out
}

/// Derives records for the history grown since the previous call.
///
/// Holds, per [`BranchId`], the index of the last point already emitted.
/// Each chunk starts at that point so consecutive chunks join up; a branch
/// that did not move yields a single-point (invisible) record. Use one
/// deriver per tree.
#[derive(Debug, Default, Clone)]
pub struct IncrementalDeriver {
    emitted: Vec<usize>,
}

impl IncrementalDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first point the next call will emit for `id`.
    pub fn cursor(&self, id: BranchId) -> usize {
        self.emitted.get(id).copied().unwrap_or(0)
    }

    /// Forgets all cursors; the next call emits full histories.
    pub fn reset(&mut self) {
        self.emitted.clear();
    }

    /// Emits the unseen suffix of every branch and advances the cursors.
    pub fn derive(&mut self, tree: &Tree) -> Vec<DrawRecord> {
        if self.emitted.len() < tree.len() {
            self.emitted.resize(tree.len(), 0);
        }

        let emitted = &mut self.emitted;
        let mut out = Vec::with_capacity(tree.len());
        visit(tree, ROOT, &mut |id, branch| {
            out.push(record(id, branch, tree.params(), emitted[id]));
            emitted[id] = branch.history().len().saturating_sub(1);
        });
        out
    }
}
