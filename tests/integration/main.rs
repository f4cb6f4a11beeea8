//! Integration tests for the wallet hunter.

mod control_api;
mod lifecycle;
mod mock_ledger;
