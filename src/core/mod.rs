pub mod config;
pub mod format;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod quota;
pub mod scheduler;
pub mod subscription;
pub mod tracker;
