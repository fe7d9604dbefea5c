//! Product inventory service: CRUD over HTTP backed by PostgreSQL.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod schema;
#[cfg(test)]
mod test_support;
