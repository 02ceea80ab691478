pub mod app;
pub mod check;
pub mod config;
pub mod logging;
pub mod notify;
pub mod report;
