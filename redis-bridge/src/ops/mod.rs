//! Operations groups
//!
//! One cohesive group per domain area, each implemented once and shared by
//! every facade: a concrete method builds a command descriptor, an optional
//! executor and a converter, then submits the triple to the session. Support
//! for a (command, topology, context) combination is declared by whether the
//! method supplies an executor, never by a lookup table.

use crate::session::Session;
use parking_lot::Mutex;
use std::sync::Arc;

pub mod acl;
pub mod cluster;
pub mod geo;
pub mod hashes;
pub mod keys;
pub mod lists;
pub mod pubsub;
pub mod scripting;
pub mod sentinel;
pub mod server;
pub mod sets;
pub mod streams;
pub mod strings;
pub mod zsets;

pub use acl::AclOps;
pub use cluster::ClusterOps;
pub use geo::GeoOps;
pub use hashes::HashOps;
pub use keys::KeyOps;
pub use lists::ListOps;
pub use pubsub::PubSubOps;
pub use scripting::ScriptOps;
pub use sentinel::SentinelOps;
pub use server::ServerOps;
pub use sets::SetOps;
pub use streams::StreamOps;
pub use strings::StringOps;
pub use zsets::SortedSetOps;

/// Session handle shared between a facade and its operations groups
pub(crate) type SharedSession<D> = Arc<Mutex<Session<D>>>;
