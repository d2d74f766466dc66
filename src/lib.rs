pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod index_analysis;
pub mod integrity;
pub mod messages;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod photo;
pub mod response;
pub mod routes;
pub mod services;
pub mod statistics;
pub mod traits;
pub mod validation;

pub use config::Config;
pub use errors::ApiError;
pub use routes::{AppState, build_app};
