// Common library for shared code across the scheduler and API

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod mailer;
pub mod matching;
pub mod models;
pub mod notify;
pub mod recommendations;
pub mod schedule;
pub mod scheduler;
pub mod store;
pub mod telemetry;
