//! Development plans, sequential course access and certification tracking.
//!
//! The pure access rules live in [`access`]; [`db`] persists courses,
//! employees and their work, and [`api`] exposes both over HTTP.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod grading;
pub mod models;
pub mod store;
