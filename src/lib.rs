pub mod anthropic_client;
pub mod app;
pub mod config;
pub mod consts;
pub mod errors;
pub mod handlers;
pub mod llm_client;
pub mod models;
pub mod pmc;
pub mod prompts;
pub mod pubmed;
pub mod screening;
pub mod service;
pub mod session;
pub mod tools;
