pub mod customdata;
pub mod error;
pub mod journal;
pub mod math;
pub mod operations;
pub mod snapshot;
pub mod topology;

pub use error::{PolykernError, Result};
