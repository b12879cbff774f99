#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod page;
pub mod product;
pub mod sdk;
pub mod storage;
pub mod tracking;
pub mod utils;

pub use cli::app::{Cli, Command};
pub use error::TrackingError;
