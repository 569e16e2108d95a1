pub mod entry;
pub mod time;

pub use entry::*;
pub use time::*;
