//! Downstream driver boundary
//!
//! The [`Driver`] trait is the only point of contact with an underlying
//! client library. Each back-end keeps its own native reply model and adapts
//! it behind the [`Reply`] trait, which is the sole surface converters are
//! written against. Two back-ends are provided: [`resp2`] with a flat reply
//! model and [`resp3`] with native booleans, doubles and maps.
//!
//! Wire parsing, socket handling and pooling belong to the transport behind
//! each back-end, never to this layer.

use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandFrame, DriverKind, DriverResult, Value};

pub mod resp2;
pub mod resp3;

pub use resp2::{Resp2Driver, Resp2Reply, Resp2Transport};
pub use resp3::{Resp3Driver, Resp3Reply, Resp3Transport};

/// Native reply of one driver back-end
///
/// Conversion helpers are total over their declared domain: a nil reply maps
/// to `None`/empty through the converter combinators rather than panicking.
pub trait Reply: Sized + Send + 'static {
    /// Lossless mapping into the driver-agnostic domain value
    fn into_value(self) -> Value;

    /// Check for the driver's nil reply
    fn is_nil(&self) -> bool;

    /// Server-side error message, when the reply is an error
    fn error_message(&self) -> Option<&str>;

    /// Interpret as UTF-8 text
    fn into_text(self) -> BridgeResult<String>;

    /// Interpret as a signed integer
    fn into_integer(self) -> BridgeResult<i64>;

    /// Interpret as a floating point number
    fn into_double(self) -> BridgeResult<f64>;

    /// Interpret as a boolean
    fn into_boolean(self) -> BridgeResult<bool>;

    /// Interpret as binary data
    fn into_bytes(self) -> BridgeResult<Bytes>;

    /// Interpret as an ordered collection of replies
    fn into_array(self) -> BridgeResult<Vec<Self>>;

    /// Interpret as ordered key/value pairs
    ///
    /// Back-ends without a native map reply chunk a flat array two by two.
    fn into_pairs(self) -> BridgeResult<Vec<(Self, Self)>>;
}

/// What happened to a dispatched call
#[derive(Debug)]
pub enum Dispatch<R> {
    /// The driver executed the call and produced a native reply
    Replied(R),
    /// The driver queued the call in its open pipeline or transaction
    Buffered,
}

/// One underlying client library, adapted behind a uniform surface
///
/// A driver owns the batching state for pipelines and transactions: while a
/// batch is open, [`Driver::invoke`] buffers the call and reports
/// [`Dispatch::Buffered`]; the batch is executed as one ordered round trip by
/// the flush/commit calls.
pub trait Driver: Send + 'static {
    /// Native reply type of this back-end
    type Reply: Reply;

    /// Which back-end this is, for diagnostics
    fn kind(&self) -> DriverKind;

    /// Execute or buffer one call
    fn invoke(&mut self, frame: CommandFrame) -> DriverResult<Dispatch<Self::Reply>>;

    /// Start buffering calls for a pipeline
    fn open_pipeline(&mut self) -> DriverResult<()>;

    /// Execute the buffered pipeline, returning raw replies in send order
    fn flush_pipeline(&mut self) -> DriverResult<Vec<Self::Reply>>;

    /// Start buffering calls for a transaction
    fn open_transaction(&mut self) -> DriverResult<()>;

    /// Commit the transaction, returning raw replies in enqueue order
    fn commit_transaction(&mut self) -> DriverResult<Vec<Self::Reply>>;

    /// Abort the transaction and drop everything buffered
    fn discard_transaction(&mut self) -> DriverResult<()>;
}

/// Executor: one underlying driver call, or absent when the command is not
/// supported for the current (topology, context) combination
pub type Executor<D> =
    Box<dyn FnOnce(&mut D) -> DriverResult<Dispatch<<D as Driver>::Reply>> + Send>;

/// Build the common single-frame executor
pub fn invoke<D: Driver>(frame: CommandFrame) -> Executor<D> {
    Box::new(move |driver| driver.invoke(frame))
}
