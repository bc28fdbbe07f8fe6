pub mod controller;
pub mod expansion;
pub mod guard;
pub mod settings;
pub mod slot;
pub mod symbology;
pub mod viewport;

pub use controller::*;
pub use expansion::*;
pub use guard::*;
pub use settings::*;
pub use slot::*;
pub use viewport::*;
