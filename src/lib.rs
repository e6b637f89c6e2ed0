//! vdbbench: connection and index parameter configs for vector database
//! benchmarks.

pub mod cli;
pub mod config;
pub mod error;
pub mod milvus;
pub mod params;
pub mod secret;
pub mod types;
