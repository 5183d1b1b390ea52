//! # Reconciliation server
//! This crate hosts the long-running reconciliation service. It is responsible for:
//! Polling the gate for payouts on behalf of every active user session.
//! Pulling completed orders from the P2P marketplace for every user with a marketplace token.
//! Matching those payouts against the users' completed marketplace transactions.
//! Exposing a small operator API for health checks, statistics and on-demand reconciliation.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/service-stats`: The statistics of the background loops.
//! * `/api/reconcile/{user_id}`: Runs the matcher for one user and returns the number of new matches.
//! * `/api/local_transactions`: Records a completed marketplace transaction.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;
