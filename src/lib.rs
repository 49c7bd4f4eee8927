pub mod config;
pub mod formatter;
pub mod input;
pub mod report;
pub mod runner;
