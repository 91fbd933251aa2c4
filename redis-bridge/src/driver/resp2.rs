//! Flat-reply driver back-end
//!
//! This back-end models a classic client library: replies are simple strings,
//! errors, integers, bulk strings, nils and arrays, nothing richer. Booleans
//! come back as integers, doubles as bulk text, maps as flat arrays. The
//! transport behind it owns sockets, pooling and wire framing.

use super::{Dispatch, Driver, Reply};
use bytes::Bytes;
use redis_bridge_core::{
    BridgeError, BridgeResult, CommandFrame, DriverError, DriverKind, DriverResult, Value,
};

/// Native reply of the flat back-end
#[derive(Debug, Clone, PartialEq)]
pub enum Resp2Reply {
    /// Status line
    Simple(String),
    /// Server-side error
    Error(String),
    /// Signed integer
    Integer(i64),
    /// Binary-safe payload
    Bulk(Bytes),
    /// Missing value
    Nil,
    /// Ordered collection
    Array(Vec<Resp2Reply>),
}

impl Reply for Resp2Reply {
    fn into_value(self) -> Value {
        match self {
            Self::Simple(s) if s == "OK" => Value::Okay,
            Self::Simple(s) => Value::Text(s),
            Self::Error(e) => Value::Text(e),
            Self::Integer(i) => Value::Int(i),
            Self::Bulk(b) => Value::Bytes(b),
            Self::Nil => Value::Nil,
            Self::Array(items) => Value::Array(items.into_iter().map(Reply::into_value).collect()),
        }
    }

    fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    fn into_text(self) -> BridgeResult<String> {
        match self {
            Self::Simple(s) => Ok(s),
            Self::Bulk(b) => String::from_utf8(b.to_vec())
                .map_err(|e| BridgeError::Type(format!("invalid UTF-8: {e}"))),
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as text"
            ))),
        }
    }

    fn into_integer(self) -> BridgeResult<i64> {
        match self {
            Self::Integer(i) => Ok(i),
            Self::Bulk(_) => {
                let text = self.into_text()?;
                text.parse()
                    .map_err(|e| BridgeError::Type(format!("cannot parse integer: {e}")))
            }
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as integer"
            ))),
        }
    }

    fn into_double(self) -> BridgeResult<f64> {
        match self {
            Self::Integer(i) => Ok(i as f64),
            Self::Bulk(_) => {
                let text = self.into_text()?;
                text.parse()
                    .map_err(|e| BridgeError::Type(format!("cannot parse double: {e}")))
            }
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as double"
            ))),
        }
    }

    fn into_boolean(self) -> BridgeResult<bool> {
        // No native boolean in this reply model.
        match self {
            Self::Integer(0) => Ok(false),
            Self::Integer(1) => Ok(true),
            Self::Simple(s) if s == "OK" => Ok(true),
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as boolean"
            ))),
        }
    }

    fn into_bytes(self) -> BridgeResult<Bytes> {
        match self {
            Self::Bulk(b) => Ok(b),
            Self::Simple(s) => Ok(Bytes::from(s.into_bytes())),
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as bytes"
            ))),
        }
    }

    fn into_array(self) -> BridgeResult<Vec<Self>> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(BridgeError::Type(format!(
                "cannot read {other:?} as array"
            ))),
        }
    }

    fn into_pairs(self) -> BridgeResult<Vec<(Self, Self)>> {
        let items = self.into_array()?;
        if items.len() % 2 != 0 {
            return Err(BridgeError::Type(format!(
                "flat pair array has odd length {}",
                items.len()
            )));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Ok(pairs)
    }
}

/// Transport boundary of the flat back-end
///
/// Implementations own the physical link; batches are executed as one ordered
/// atomic round trip, mirroring the client library's pipeline/MULTI handling.
pub trait Resp2Transport: Send + 'static {
    /// Execute one call and return its reply
    fn exchange(&mut self, frame: &CommandFrame) -> DriverResult<Resp2Reply>;

    /// Execute a batch atomically, replies in frame order
    fn exchange_batch(&mut self, frames: &[CommandFrame]) -> DriverResult<Vec<Resp2Reply>>;
}

enum Batch {
    Pipeline(Vec<CommandFrame>),
    Transaction(Vec<CommandFrame>),
}

/// Driver adapter over a flat-reply transport
pub struct Resp2Driver<T: Resp2Transport> {
    transport: T,
    batch: Option<Batch>,
}

impl<T: Resp2Transport> Resp2Driver<T> {
    /// Wrap a connected transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            batch: None,
        }
    }
}

impl<T: Resp2Transport> Driver for Resp2Driver<T> {
    type Reply = Resp2Reply;

    fn kind(&self) -> DriverKind {
        DriverKind::Resp2
    }

    fn invoke(&mut self, frame: CommandFrame) -> DriverResult<Dispatch<Resp2Reply>> {
        match self.batch.as_mut() {
            Some(Batch::Pipeline(frames) | Batch::Transaction(frames)) => {
                frames.push(frame);
                Ok(Dispatch::Buffered)
            }
            None => self.transport.exchange(&frame).map(Dispatch::Replied),
        }
    }

    fn open_pipeline(&mut self) -> DriverResult<()> {
        if self.batch.is_some() {
            return Err(DriverError::Protocol(
                "a batch is already open on this connection".to_string(),
            ));
        }
        self.batch = Some(Batch::Pipeline(Vec::new()));
        Ok(())
    }

    fn flush_pipeline(&mut self) -> DriverResult<Vec<Resp2Reply>> {
        match self.batch.take() {
            Some(Batch::Pipeline(frames)) => {
                if frames.is_empty() {
                    return Ok(Vec::new());
                }
                self.transport.exchange_batch(&frames)
            }
            other => {
                self.batch = other;
                Err(DriverError::Protocol("no pipeline is open".to_string()))
            }
        }
    }

    fn open_transaction(&mut self) -> DriverResult<()> {
        if self.batch.is_some() {
            return Err(DriverError::Protocol(
                "a batch is already open on this connection".to_string(),
            ));
        }
        self.batch = Some(Batch::Transaction(Vec::new()));
        Ok(())
    }

    fn commit_transaction(&mut self) -> DriverResult<Vec<Resp2Reply>> {
        match self.batch.take() {
            Some(Batch::Transaction(frames)) => {
                if frames.is_empty() {
                    return Ok(Vec::new());
                }
                self.transport.exchange_batch(&frames)
            }
            other => {
                self.batch = other;
                Err(DriverError::Protocol("no transaction is open".to_string()))
            }
        }
    }

    fn discard_transaction(&mut self) -> DriverResult<()> {
        match self.batch.take() {
            Some(Batch::Transaction(_)) => Ok(()),
            other => {
                self.batch = other;
                Err(DriverError::Protocol("no transaction is open".to_string()))
            }
        }
    }
}
