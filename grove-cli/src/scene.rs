//! Headless driver: grows a landscape and collects its draw records.

use grove_core::{
    bounds::Bounds,
    landscape::{Landscape, Placement},
    render::{self, DrawRecord, IncrementalDeriver},
};
use serde::Serialize;
use std::time::Instant;

/// Records emitted for one tree after `step` growth steps.
#[derive(Debug, Serialize)]
pub struct Frame {
    pub step: usize,
    pub live_branches: usize,
    pub records: Vec<DrawRecord>,
}

#[derive(Debug, Serialize)]
pub struct TreeOutput {
    pub placement: Placement,
    pub depth: f32,
    pub frames: Vec<Frame>,
}

/// The JSON document written at the end of a run.
#[derive(Debug, Serialize)]
pub struct SceneOutput {
    pub seed: u64,
    pub steps: usize,
    pub view_box: Option<Bounds>,
    /// Farthest tree first, the order they should be painted in.
    pub trees: Vec<TreeOutput>,
}

fn visible(records: Vec<DrawRecord>) -> Vec<DrawRecord> {
    records.into_iter().filter(DrawRecord::is_visible).collect()
}

/// Grows every tree `steps` steps.
///
/// With `every == 0` the trees grow in parallel and each yields a single
/// frame of full histories. Otherwise each tree grows in chunks of `every`
/// steps and each chunk yields a frame holding only the newly grown
/// segments.
pub fn grow(landscape: &mut Landscape, steps: usize, every: usize) -> Vec<TreeOutput> {
    if every == 0 {
        let started = Instant::now();
        landscape.grow_iterations(steps);
        tracing::info!(steps, elapsed = ?started.elapsed(), "grew landscape");

        return landscape
            .placements()
            .iter()
            .zip(landscape.trees())
            .map(|(placement, tree)| TreeOutput {
                placement: *placement,
                depth: tree.params().depth,
                frames: vec![Frame {
                    step: steps,
                    live_branches: tree.live_count(),
                    records: visible(render::derive(tree)),
                }],
            })
            .collect();
    }

    let placements = landscape.placements().to_vec();
    let mut out = Vec::with_capacity(placements.len());

    for (index, (placement, tree)) in placements.iter().zip(landscape.trees_mut()).enumerate() {
        let mut deriver = IncrementalDeriver::new();
        let mut frames = Vec::new();
        let mut done = 0;

        while done < steps {
            let chunk = every.min(steps - done);

            let started = Instant::now();
            tree.grow_iterations(chunk);
            let grow_time = started.elapsed();

            let started = Instant::now();
            let records = visible(deriver.derive(tree));
            let derive_time = started.elapsed();

            done += chunk;
            tracing::debug!(
                tree = index,
                step = done,
                branches = tree.len(),
                grow = ?grow_time,
                derive = ?derive_time,
                "frame"
            );

            frames.push(Frame {
                step: done,
                live_branches: tree.live_count(),
                records,
            });
        }

        tracing::info!(
            tree = index,
            branches = tree.len(),
            live = tree.live_count(),
            frames = frames.len(),
            "tree finished"
        );

        out.push(TreeOutput {
            placement: *placement,
            depth: tree.params().depth,
            frames,
        });
    }

    out
}

/// Bounds of the whole landscape, padded and widened to `width:height`.
pub fn view_box(landscape: &Landscape, padding: f32, width: f32, height: f32) -> Option<Bounds> {
    let mut bounds = landscape.bounds()?;
    bounds.enlarge(padding);
    bounds.fix_aspect_ratio(width, height);
    Some(bounds)
}

/// Assembles the output document, trees ordered far to near.
pub fn assemble(seed: u64, steps: usize, view_box: Option<Bounds>, mut trees: Vec<TreeOutput>) -> SceneOutput {
    trees.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    SceneOutput {
        seed,
        steps,
        view_box,
        trees,
    }
}
