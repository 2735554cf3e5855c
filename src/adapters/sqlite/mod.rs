pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::open_pool;
pub use migrations::{all_embedded_migrations, Migrator};
pub use store::SqliteStore;
