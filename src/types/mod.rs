//! Type definitions for doctrack

mod error;
mod record;
mod report;

pub use error::*;
pub use record::*;
pub use report::*;
