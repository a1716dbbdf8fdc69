//! Scraperkit - media re-encoding and offline archive building
//!
//! This library crate exposes the CLI's configuration for integration testing.

pub mod config;
