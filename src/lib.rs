pub mod address;
pub mod aggregate;
pub mod balances;
pub mod chart;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod duration;
pub mod error;
pub mod format;
pub mod models;
pub mod pricing;
pub mod state;
pub mod view;

pub use error::{Error, Result};
