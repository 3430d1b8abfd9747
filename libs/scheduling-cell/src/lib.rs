pub mod handlers;
pub mod interval;
pub mod models;
pub mod provider;
pub mod router;
pub mod services;
