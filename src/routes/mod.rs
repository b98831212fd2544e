//! Service-level route handlers

pub mod health;
