pub mod analytics;
pub mod usage;
