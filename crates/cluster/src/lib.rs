pub mod config;
pub mod index;
pub mod node;
pub mod point;
pub mod query;
pub mod spatial;

pub use config::*;
pub use index::*;
pub use node::*;
pub use point::*;
pub use query::*;
