mod client;
mod config;

pub use client::QdrantRepository;
pub use config::QdrantConfig;
