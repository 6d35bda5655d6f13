mod diff;
mod import;

pub use diff::*;
pub use import::*;
