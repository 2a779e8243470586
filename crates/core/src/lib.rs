//! Auxilia Core - Shared domain library.
//!
//! This crate provides the types and pure business rules used across all
//! Auxilia components:
//! - `storefront` - Public-facing shop
//! - `admin` - Back-office for products, orders and users
//! - `cli` - Migrations, admin bootstrap and catalog seeding
//!
//! # Architecture
//!
//! The core crate performs no I/O: no database access, no HTTP. Everything
//! here can be unit tested without a running service.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`cart`] - Cart contents and the merge-on-login rule
//! - [`catalog`] - Catalog listing parameters and pagination
//! - [`account`] - Profile fields and checkout readiness
//! - [`password`] - Password policy and hashing
//! - [`slug`] - ASCII slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod password;
pub mod slug;
pub mod types;

pub use account::{FieldTooLong, ProfileFields, ShippingDetails};
pub use cart::Cart;
pub use catalog::{CatalogParams, CatalogQuery, Page, SortDirection, SortField};
pub use password::PasswordError;
pub use slug::slugify;
pub use types::*;
