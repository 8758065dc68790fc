pub mod app;
pub mod catalog;
pub mod cli;
pub mod cms;
pub mod config;
pub mod error;
pub mod matrix;
pub mod output;
pub mod store;
pub mod utils;

pub use error::{FetchFailed, MatrixError};

#[cfg(test)]
mod tests;
