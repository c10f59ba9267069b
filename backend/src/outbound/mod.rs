//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **hosted**: reqwest-backed clients for the hosted authentication service
//!   and REST database
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod hosted;
