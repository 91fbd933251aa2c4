//! Extended-reply driver back-end
//!
//! The second supported client library speaks a richer reply model: native
//! booleans, doubles, maps and sets. Its shapes are deliberately incompatible
//! with the flat back-end; the shared [`Reply`] surface is what keeps the
//! converter framework single-sourced across both.

use super::{Dispatch, Driver, Reply};
use bytes::Bytes;
use redis_bridge_core::{
    BridgeError, BridgeResult, CommandFrame, DriverError, DriverKind, DriverResult, Value,
};

/// Native reply of the extended back-end
#[derive(Debug, Clone, PartialEq)]
pub enum Resp3Reply {
    /// Status line
    Simple(String),
    /// Server-side error
    Error(String),
    /// Signed integer
    Integer(i64),
    /// Native double
    Double(f64),
    /// Native boolean
    Boolean(bool),
    /// Binary-safe payload
    Bulk(Bytes),
    /// Missing value
    Nil,
    /// Ordered collection
    Array(Vec<Resp3Reply>),
    /// Native map
    Map(Vec<(Resp3Reply, Resp3Reply)>),
    /// Unordered collection
    Set(Vec<Resp3Reply>),
}

impl Reply for Resp3Reply {
    fn into_value(self) -> Value {
        match self {
            Self::Simple(s) if s == "OK" => Value::Okay,
            Self::Simple(s) => Value::Text(s),
            Self::Error(e) => Value::Text(e),
            Self::Integer(i) => Value::Int(i),
            Self::Double(d) => Value::Double(d),
            Self::Boolean(b) => Value::Bool(b),
            Self::Bulk(b) => Value::Bytes(b),
            Self::Nil => Value::Nil,
            Self::Array(items) | Self::Set(items) => {
                Value::Array(items.into_iter().map(Reply::into_value).collect())
            }
            Self::Map(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_value(), v.into_value()))
                    .collect(),
            ),
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
            other => Err(BridgeError::Type(format!("cannot read {other:?} as text"))),
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
            Self::Double(d) => Ok(d),
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
        match self {
            Self::Boolean(b) => Ok(b),
            // Integer replies still show up for commands predating the
            // native boolean type.
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
            other => Err(BridgeError::Type(format!("cannot read {other:?} as bytes"))),
        }
    }

    fn into_array(self) -> BridgeResult<Vec<Self>> {
        match self {
            Self::Array(items) | Self::Set(items) => Ok(items),
            // A map flattens to the classic shape when asked for an array.
            Self::Map(pairs) => Ok(pairs
                .into_iter()
                .flat_map(|(k, v)| [k, v])
                .collect()),
            other => Err(BridgeError::Type(format!("cannot read {other:?} as array"))),
        }
    }

    fn into_pairs(self) -> BridgeResult<Vec<(Self, Self)>> {
        match self {
            Self::Map(pairs) => Ok(pairs),
            Self::Array(items) => {
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
            other => Err(BridgeError::Type(format!("cannot read {other:?} as pairs"))),
        }
    }
}

/// Transport boundary of the extended back-end
pub trait Resp3Transport: Send + 'static {
    /// Execute one call and return its reply
    fn exchange(&mut self, frame: &CommandFrame) -> DriverResult<Resp3Reply>;

    /// Execute a batch atomically, replies in frame order
    fn exchange_batch(&mut self, frames: &[CommandFrame]) -> DriverResult<Vec<Resp3Reply>>;
}

enum Batch {
    Pipeline(Vec<CommandFrame>),
    Transaction(Vec<CommandFrame>),
}

/// Driver adapter over an extended-reply transport
pub struct Resp3Driver<T: Resp3Transport> {
    transport: T,
    batch: Option<Batch>,
}

impl<T: Resp3Transport> Resp3Driver<T> {
    /// Wrap a connected transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            batch: None,
        }
    }
}

impl<T: Resp3Transport> Driver for Resp3Driver<T> {
    type Reply = Resp3Reply;

    fn kind(&self) -> DriverKind {
        DriverKind::Resp3
    }

    fn invoke(&mut self, frame: CommandFrame) -> DriverResult<Dispatch<Resp3Reply>> {
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

    fn flush_pipeline(&mut self) -> DriverResult<Vec<Resp3Reply>> {
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

    fn commit_transaction(&mut self) -> DriverResult<Vec<Resp3Reply>> {
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
