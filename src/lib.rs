pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod generation;
pub mod index;
pub mod profile;
pub mod prompt;
pub mod retriever;
