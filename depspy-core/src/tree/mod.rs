//! Impact Trees
//!
//! An impact tree is the view the visualization draws: a bounded unfolding
//! of the impact graph from one root, in one direction. Trees are built
//! eagerly a few levels deep and then grown lazily as the user expands
//! nodes.

mod builder;
mod lazy;
mod node;

pub use builder::{OccurrenceCounter, TreeBuilder};
pub use lazy::expand_in_place;
pub use node::TreeNode;
