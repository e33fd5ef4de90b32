//! Shared constants for end-to-end tests

/// How long to wait for the server to become ready before giving up.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// How long to wait between readiness polls.
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for the test client.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
