//! AntenkaYume Core - Shared types library.
//!
//! This crate provides common types used across all AntenkaYume components:
//! - `storefront` - Public-facing shop (catalog, cart, wishlist)
//! - `admin` - Internal administration panel (dashboard stats, assistant)
//! - `cli` - Command-line tools for seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money coercion, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
