//! Test infrastructure for the L2 bridge-domain manager
//!
//! Provides:
//! - An in-memory dataplane with call recording and fault injection
//! - Connection fixtures with resolved interface indices
//! - Test logging setup

mod fake_dataplane;
pub mod fixtures;

pub use fake_dataplane::{CallKind, DataplaneCall, FakeDataplane};
pub use fixtures::*;
