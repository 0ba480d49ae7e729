pub mod response;
pub mod stats;
pub mod video;

pub use response::*;
pub use stats::*;
pub use video::*;
