//! Content-deduplicated CSG tree and the algorithms that rewrite it.

mod csg_tree;
mod node;
mod simplify;
mod utils;

pub use csg_tree::CsgTree;
pub use node::{JoinOp, Node, NodeId, NodeList};
pub use simplify::simplify_node;
pub use utils::{build_infix_string, calc_surfaces, replace_and_simplify, simplify_from};
