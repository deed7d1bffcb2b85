pub mod ask;
pub mod config;
pub mod llm_client;
pub mod server;
