//! Wallet Hunter — polling worker that derives candidate addresses and
//! checks their ledger balance.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod generator;
pub mod ledger;
pub mod alerts;
pub mod engine;
pub mod dashboard;
