//! Database layer
//!
//! Driver-abstracted persistence for the Kyozai backend. SQLite is the
//! default for single-binary deployment; MySQL is available for larger
//! installations. All coordination between concurrent writers happens
//! through the store's composite unique constraints and transactions, not
//! in-process locks.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
