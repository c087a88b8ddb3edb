pub mod app_config;
pub mod database;
pub mod memory;

pub use database::{DbClient, PgDocumentStore};
pub use memory::InMemoryStore;
