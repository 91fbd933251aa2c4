//! Driver-agnostic domain model
//!
//! These types are the target of every converter. They carry no behavior
//! beyond constructors and accessors; anything that parses driver replies
//! lives with the converter framework, not here.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A driver-agnostic command result
///
/// This is the type-erased shape used for ordered pipeline/transaction result
/// lists, where each position may hold a different kind of value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null / missing value
    Nil,
    /// Acknowledged status reply
    Okay,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Double(f64),
    /// Binary data
    Bytes(Bytes),
    /// Status or verbatim text
    Text(String),
    /// Ordered collection of values
    Array(Vec<Value>),
    /// Ordered key/value pairs
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Check if this is the null value
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// View as text when the value is textual
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Okay => Some("OK".to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Bytes(b) => String::from_utf8(b.to_vec()).ok(),
            _ => None,
        }
    }

    /// View as an integer when the value is numeric
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Okay
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::Array(vec![a.into(), b.into()])
    }
}

/// Identifier of one stream entry: milliseconds plus a sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    /// Millisecond component
    pub ms: u64,
    /// Sequence component within the same millisecond
    pub seq: u64,
}

impl StreamId {
    /// Create a stream id from its two components
    #[must_use]
    pub const fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for StreamId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ms, seq) = s
            .split_once('-')
            .ok_or_else(|| format!("malformed stream id: {s}"))?;
        let ms = ms
            .parse::<u64>()
            .map_err(|e| format!("malformed stream id {s}: {e}"))?;
        let seq = seq
            .parse::<u64>()
            .map_err(|e| format!("malformed stream id {s}: {e}"))?;
        Ok(Self { ms, seq })
    }
}

impl From<StreamId> for Value {
    fn from(id: StreamId) -> Self {
        Self::Text(id.to_string())
    }
}

/// One entry of a stream: id plus field/value pairs in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Entry identifier
    pub id: StreamId,
    /// Field/value pairs in the order the server reported them
    pub fields: Vec<(Bytes, Bytes)>,
}

impl StreamEntry {
    /// Create a stream entry
    #[must_use]
    pub const fn new(id: StreamId, fields: Vec<(Bytes, Bytes)>) -> Self {
        Self { id, fields }
    }
}

impl From<StreamEntry> for Value {
    fn from(entry: StreamEntry) -> Self {
        let fields = entry
            .fields
            .into_iter()
            .map(|(f, v)| (Value::Bytes(f), Value::Bytes(v)))
            .collect();
        Self::Array(vec![entry.id.into(), Value::Map(fields)])
    }
}

/// Sorted-set member together with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    /// Member payload
    pub member: Bytes,
    /// Score assigned to the member
    pub score: f64,
}

impl ScoredMember {
    /// Create a scored member
    #[must_use]
    pub const fn new(member: Bytes, score: f64) -> Self {
        Self { member, score }
    }
}

impl From<ScoredMember> for Value {
    fn from(m: ScoredMember) -> Self {
        Self::Array(vec![Value::Bytes(m.member), Value::Double(m.score)])
    }
}

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
}

impl GeoPoint {
    /// Create a coordinate pair
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<GeoPoint> for Value {
    fn from(p: GeoPoint) -> Self {
        Self::Array(vec![Value::Double(p.longitude), Value::Double(p.latitude)])
    }
}

/// Data type stored under a key, as reported by TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Key does not exist
    None,
    /// Plain string value
    String,
    /// List value
    List,
    /// Set value
    Set,
    /// Sorted-set value
    ZSet,
    /// Hash value
    Hash,
    /// Stream value
    Stream,
}

impl KeyKind {
    /// Parse the token the server replies with
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "none" => Some(Self::None),
            "string" => Some(Self::String),
            "list" => Some(Self::List),
            "set" => Some(Self::Set),
            "zset" => Some(Self::ZSet),
            "hash" => Some(Self::Hash),
            "stream" => Some(Self::Stream),
            _ => Option::None,
        }
    }

    /// Token used by the server for this kind
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::ZSet => "zset",
            Self::Hash => "hash",
            Self::Stream => "stream",
        }
    }
}

impl From<KeyKind> for Value {
    fn from(kind: KeyKind) -> Self {
        Self::Text(kind.token().to_string())
    }
}

/// Role of a node inside a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Primary node accepting writes
    Master,
    /// Replica of a master
    Replica,
}

/// Represents a hash-slot range in a sharded cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    /// Start of the slot range (inclusive)
    pub start: u16,
    /// End of the slot range (inclusive)
    pub end: u16,
}

impl SlotRange {
    /// Create a new slot range
    #[must_use]
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Check if a slot is within this range
    #[must_use]
    pub const fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }
}

impl From<SlotRange> for Value {
    fn from(range: SlotRange) -> Self {
        Self::Array(vec![
            Value::Int(i64::from(range.start)),
            Value::Int(i64::from(range.end)),
        ])
    }
}

/// Node descriptor in a sharded cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node ID
    pub id: String,
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Node role
    pub role: NodeRole,
    /// Slot ranges owned by this node
    pub slots: Vec<SlotRange>,
}

impl NodeDescriptor {
    /// Create a new node descriptor with no slots assigned
    #[must_use]
    pub const fn new(id: String, host: String, port: u16, role: NodeRole) -> Self {
        Self {
            id,
            host,
            port,
            role,
            slots: Vec::new(),
        }
    }

    /// Check if this node owns a given slot
    #[must_use]
    pub fn owns_slot(&self, slot: u16) -> bool {
        self.slots.iter().any(|range| range.contains(slot))
    }
}

impl From<NodeDescriptor> for Value {
    fn from(node: NodeDescriptor) -> Self {
        let slots = node
            .slots
            .into_iter()
            .map(|r| Value::Array(vec![Value::Int(i64::from(r.start)), Value::Int(i64::from(r.end))]))
            .collect();
        Self::Map(vec![
            (Value::from("id"), Value::Text(node.id)),
            (Value::from("host"), Value::Text(node.host)),
            (Value::from("port"), Value::Int(i64::from(node.port))),
            (
                Value::from("role"),
                Value::from(match node.role {
                    NodeRole::Master => "master",
                    NodeRole::Replica => "replica",
                }),
            ),
            (Value::from("slots"), Value::Array(slots)),
        ])
    }
}
