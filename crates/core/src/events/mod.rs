pub mod accessor;
pub mod event;
pub mod path;

pub use accessor::*;
pub use event::*;
pub use path::*;
