//! Driver-agnostic command execution layer for Redis-compatible stores
//!
//! The layer sits between typed caller-facing operations and two incompatible
//! client back-ends, and keeps behavior uniform across three deployment
//! shapes (standalone, sentinel-monitored, cluster) and three execution
//! contexts (immediate, pipeline, transaction).
//!
//! Structure:
//! - [`driver`]: the back-end seam — a [`driver::Driver`] executes command
//!   frames and a [`driver::Reply`] lowers native replies into shared shapes
//! - [`convert`]: converters from raw replies to typed results, shared by
//!   both back-ends
//! - [`session`]: the per-connection runner that routes every call and owns
//!   the pipeline/transaction lifecycle
//! - [`deferred`]: placeholder results handed out while a batch is open
//! - [`client`]: one facade per deployment shape
//! - [`testing`]: an in-memory transport for exercising the stack without a
//!   server
//!
//! ```
//! use redis_bridge::driver::Resp2Driver;
//! use redis_bridge::testing::MemoryBackend;
//! use redis_bridge::{BridgeConfig, StandaloneClient};
//!
//! # fn main() -> redis_bridge::BridgeResult<()> {
//! let client = StandaloneClient::connect(
//!     Resp2Driver::new(MemoryBackend::new()),
//!     &BridgeConfig::default(),
//! )?;
//!
//! client.strings().set("greeting", "hello")?;
//! let stored = client.strings().get("greeting")?.immediate()?;
//! assert_eq!(stored.as_deref(), Some(b"hello".as_ref()));
//!
//! client.multi()?;
//! let pending = client.strings().incr("counter")?.deferred()?;
//! client.exec()?;
//! assert_eq!(pending.take()?, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod context;
pub mod convert;
pub mod deferred;
pub mod driver;
pub mod ops;
pub mod session;
pub mod testing;

#[cfg(test)]
pub(crate) mod test_util;

pub use client::{ClusterClient, SentinelClient, StandaloneClient};
pub use context::ExecMode;
pub use deferred::{Deferred, Outcome};
pub use session::Session;

pub use redis_bridge_core::{
    BridgeConfig, BridgeError, BridgeResult, CommandDescriptor, CommandFrame, DriverError,
    DriverKind, DriverResult, GeoPoint, KeyKind, NodeDescriptor, NodeRole, ScoredMember,
    SentinelConfig, SlotRange, StreamEntry, StreamId, Topology, Value,
};
