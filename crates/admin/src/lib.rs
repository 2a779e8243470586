//! Auxilia Admin library.
//!
//! The back-office as a library, so handlers and rules can be tested
//! without starting the server.
//!
//! # Security
//!
//! This crate writes the catalog and manages customer accounts, including
//! password resets. Every route except `/login` and the health checks
//! requires an administrator session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
