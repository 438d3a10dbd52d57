//! Tests for the Webex client.

#[cfg(test)]
mod client_tests;
