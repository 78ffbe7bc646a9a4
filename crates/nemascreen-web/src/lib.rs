//! nemascreen-web — Web GUI for the screen database.
//! Provides:
//!   - Experiment browsing with field-by-field filtering
//!   - Plate and well detail pages with image links
//!   - Manual score entry
//!   - Suppressor secondary reports and candidate selection
//!   - Strain, clone, and library browsing

pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod error;
