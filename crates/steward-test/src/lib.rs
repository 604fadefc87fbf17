//! Steward Test - shared test utilities.
//!
//! Add to a crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! steward-test.workspace = true
//! ```
//!
//! ```rust
//! use steward_test::principals;
//!
//! let [root, ops] = principals(["root", "ops"]);
//! assert_ne!(root, ops);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
