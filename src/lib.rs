pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod relay;
pub mod seed;
pub mod services;
pub mod state;
