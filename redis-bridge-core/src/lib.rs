//! Shared core types for the `redis-bridge` compatibility layer
//!
//! This crate holds the pure, driver-agnostic pieces: the domain model every
//! converter targets, the caller-facing error taxonomy, command descriptors,
//! and configuration. It knows nothing about drivers, connections, or
//! execution contexts.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod config;
pub mod error;
pub mod types;

pub use command::{CommandDescriptor, CommandFrame};
pub use config::{BridgeConfig, DriverKind, SentinelConfig, Topology};
pub use error::{BridgeError, BridgeResult, DriverError, DriverResult};
pub use types::{
    GeoPoint, KeyKind, NodeDescriptor, NodeRole, ScoredMember, SlotRange, StreamEntry, StreamId,
    Value,
};
