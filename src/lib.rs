pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod query;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::{router, AppState};
