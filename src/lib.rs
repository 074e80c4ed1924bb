pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod services;
pub mod shutdown;
pub mod sources;
pub mod storage;
