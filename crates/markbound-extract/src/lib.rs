pub mod coerce;
pub mod engine;
pub mod error;
pub mod result;

pub use coerce::*;
pub use engine::*;
pub use error::*;
pub use result::*;
