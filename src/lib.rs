// src/lib.rs

pub mod analytics;
pub mod api;
pub mod app;
pub mod chat;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod render;
pub mod schema;
