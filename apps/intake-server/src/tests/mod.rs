//! Server unit and integration tests.
//!
//! Tests are organized into modules by feature area:
//! - `common` - Shared fakes and fixtures
//! - `lifecycle` - Client-facing token operations and their invariants
//! - `admin` - Send, bulk send, resend, listing and typed edits
//! - `http` - Router status codes, bodies and admin authentication

pub mod common;

mod http;
