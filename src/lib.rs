pub mod api;
pub mod banish;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod report;

pub use error::{Error, Result};
