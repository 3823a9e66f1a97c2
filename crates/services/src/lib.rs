pub mod refresher;
pub mod settlement;

pub use refresher::*;
pub use settlement::*;
