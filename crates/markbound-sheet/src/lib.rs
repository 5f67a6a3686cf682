pub mod error;
pub mod workbook;
pub mod xlsx;

pub use error::*;
pub use workbook::*;
pub use xlsx::*;
