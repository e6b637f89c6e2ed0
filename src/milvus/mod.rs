//! Milvus backend configuration.
//!
//! Provides the connection config, one index config per supported family,
//! and the registry mapping index families to their configs.

pub mod case_config;
pub mod db_config;
pub mod registry;

pub use case_config::{CaseConfig, IndexParam, MilvusIndexConfig, SearchParam};
pub use db_config::{DbConfigCommon, MilvusConfig};
pub use registry::build_case_config;

/// Backend name reported in rendered output.
pub const DB_NAME: &str = "Milvus";
