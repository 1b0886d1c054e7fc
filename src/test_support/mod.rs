//! Helpers shared by unit tests that talk to a local mock server.

pub mod socket_guard;
