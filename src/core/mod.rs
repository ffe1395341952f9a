//! Shared configuration and error plumbing.

pub mod config;
pub mod errors;
