pub mod classify;
pub mod error;
pub mod scanner;

pub use classify::*;
pub use error::*;
pub use scanner::*;
