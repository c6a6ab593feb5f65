//! Database lifecycle: connection factory, schema migrator, service facade.

mod error;
pub mod health;
pub mod migrate;
pub mod pool;
pub mod settings;
pub mod service;

pub use error::DatabaseError;
pub use migrate::migrate;
pub use pool::{Database, create, create_with};
pub use service::DatabaseService;
pub use settings::{ConnectionProfile, PoolSettings};
