// src/lib.rs
pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod scripts;
pub mod services;
