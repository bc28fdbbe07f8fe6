pub mod debounce;
pub mod metrics;
pub mod telemetry;

pub use debounce::*;
pub use metrics::*;
pub use telemetry::*;
