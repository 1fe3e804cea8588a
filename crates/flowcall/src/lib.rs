pub mod assembler;
pub mod client;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod models;
pub mod stream;
pub mod transport;
