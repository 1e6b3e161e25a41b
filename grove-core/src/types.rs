pub use glam::Vec2;

/// Identifier for a branch in a [`crate::tree::Tree`].
///
/// This is an index into `Tree::nodes`, and is only meaningful within
/// the lifetime of a given `Tree` instance. Branches are never removed,
/// so an id stays valid for as long as its tree exists.
pub type BranchId = usize;

/// Id of the root branch of every tree.
pub const ROOT: BranchId = 0;
