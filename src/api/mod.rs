/*
 * Responsibility
 * - Entry point of the HTTP API (re-export routes())
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
