//! HTTP surface for the asset catalog.
//!
//! Handlers stay thin: every unit conversion and custom field rule lives in
//! `ephany_core`, and this crate only wires it to requests, stores and the
//! calling client's unit preferences.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
