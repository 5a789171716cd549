// Sonarbot API library
// Module tree shared by the server binary and the integration tests

pub mod chain;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
