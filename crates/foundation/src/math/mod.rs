pub mod mercator;
pub mod precision;
pub mod vec;
pub mod zoom;

pub use mercator::*;
pub use precision::*;
pub use vec::*;
pub use zoom::*;
