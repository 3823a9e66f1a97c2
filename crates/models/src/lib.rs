pub mod bet;
pub mod bookie;
pub mod error;
pub mod filter;
pub mod goal;
pub mod transaction;

pub use bet::*;
pub use bookie::*;
pub use error::*;
pub use filter::*;
pub use goal::*;
pub use transaction::*;
