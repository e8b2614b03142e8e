pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod enrollment;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod notifications;

pub use db::create_pool;
