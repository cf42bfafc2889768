//! # Boxing24 Core
//!
//! Domain types and pure scheduling logic shared by the store and the API.
//! Nothing in this crate performs I/O; external collaborators are described
//! by the traits in [`services`].

pub mod availability;
pub mod errors;
pub mod models;
pub mod services;
