//! Library exports for the video API
//!
//! This module exposes internal components for the binary and for testing.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod lister;
pub mod model;
pub mod route;
pub mod store;
