//! Core business logic for notebook.
//!
//! Services sit between the HTTP layer and the repositories. The note save
//! pipeline, activation codes and listing rules live here.

pub mod services;

pub use services::*;
