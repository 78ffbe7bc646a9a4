//! nemascreen-db — PostgreSQL persistence for the screen database.
//!
//! One repository struct per aggregate, each holding a pool clone.
//! SQL stays in the repositories; the web layer and importers work in
//! terms of the entity types from nemascreen-common.

pub mod database;
pub mod strains;
pub mod clones;
pub mod library;
pub mod experiments;
pub mod scores;
pub mod import;

pub use database::Database;
