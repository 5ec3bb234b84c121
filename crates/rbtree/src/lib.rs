mod arena;
mod error;
mod tree;

pub use arena::NodeId;
pub use error::Error;
pub use tree::{Iter, RbTree};
