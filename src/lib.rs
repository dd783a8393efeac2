pub mod apis;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod swaps;
pub mod tokens;
pub mod utils;
