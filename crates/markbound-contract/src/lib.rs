pub mod contract;
pub mod document;
pub mod schema;
pub mod validation;

pub use contract::*;
pub use document::*;
pub use schema::*;
pub use validation::*;
