pub mod error;
pub mod item_repo;

pub use item_repo::{ItemStore, PgItemRepo};

/// Schema migrations under `./migrations`, embedded at compile time.
///
/// Applied on startup; tests use it via `#[sqlx::test(migrator = "crate::repos::MIGRATOR")]`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
