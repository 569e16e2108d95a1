pub mod config;
pub mod error;
pub mod file;
pub mod format;
pub mod noop;
pub mod traits;

pub use config::*;
pub use error::*;
pub use file::*;
pub use noop::*;
pub use traits::*;
