//! Database connectivity for the recipe services
//!
//! Currently MongoDB only: configuration loaded through `core_config::FromEnv`,
//! a connector that verifies the deployment is reachable, and a retry helper
//! used while establishing connections at startup.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
