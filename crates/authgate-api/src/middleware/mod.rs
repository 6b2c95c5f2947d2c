//! Middleware layers.

pub mod guard;
pub mod logging;
