pub mod coord;
pub mod mark;
pub mod path;
pub mod value;

pub use coord::*;
pub use mark::*;
pub use path::*;
pub use value::*;
