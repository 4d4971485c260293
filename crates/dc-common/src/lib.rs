//! Shared utilities for DepositCore services.

pub mod logging;
