//! Licence wire models.

pub mod models;
