pub mod analyze;
pub mod lines;
pub mod primitives;
pub mod targets;
pub mod util;

pub use analyze::*;
pub use lines::*;
pub use primitives::*;
pub use targets::*;
pub use util::*;
