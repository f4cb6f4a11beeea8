//! Core engine — the generate → check → record polling loop.

pub mod stats;
pub mod worker;
