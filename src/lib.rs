pub mod config;
pub mod log;
pub mod models;
pub mod server;
pub mod translator;
pub mod upstream;
