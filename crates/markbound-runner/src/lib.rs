pub mod collab;
pub mod dataset;
pub mod error;
pub mod log;
pub mod run;
pub mod session;
pub mod task;

pub use collab::*;
pub use dataset::*;
pub use error::*;
pub use log::*;
pub use run::*;
pub use session::*;
pub use task::*;
