//! Tour review service: users attach a rating and a comment to a tour, and
//! read back every review for a tour together with its average rating.
pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;
