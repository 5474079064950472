mod graph;
mod immediate;

pub use self::graph::*;
pub use self::immediate::*;
