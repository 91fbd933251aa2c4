//! String operations
//!
//! The representative shape for every group in this module tree: each method
//! builds one [`CommandFrame`], one [`CommandDescriptor`], and picks a
//! converter; the session decides between immediate and deferred execution.

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};
use std::time::Duration;

/// Operations on plain string values
pub struct StringOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> StringOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Set `key` to `value`
    pub fn set(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<()>> {
        let frame = CommandFrame::new("SET").arg(key).arg(value);
        self.session
            .lock()
            .run(CommandDescriptor::new("SET"), Some(invoke(frame)), convert::status)
    }

    /// Set `key` to `value` with a time-to-live
    pub fn set_ex(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        ttl: Duration,
    ) -> BridgeResult<Outcome<()>> {
        let frame = CommandFrame::new("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg_int(ttl.as_secs() as i64);
        self.session
            .lock()
            .run(CommandDescriptor::new("SET"), Some(invoke(frame)), convert::status)
    }

    /// Set `key` only if it does not exist yet
    pub fn set_nx(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("SETNX").arg(key).arg(value);
        self.session.lock().run(
            CommandDescriptor::new("SETNX"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }

    /// Get the value of `key`
    pub fn get(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<Option<Bytes>>> {
        let frame = CommandFrame::new("GET").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("GET"),
            Some(invoke(frame)),
            convert::optional_binary,
        )
    }

    /// Get the values of several keys, position-aligned with the request
    pub fn mget<I, K>(&self, keys: I) -> BridgeResult<Outcome<Vec<Option<Bytes>>>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("MGET").args(keys);
        self.session.lock().run(
            CommandDescriptor::new("MGET"),
            Some(invoke(frame)),
            convert::optional_binaries,
        )
    }

    /// Append to the string at `key`, returning the new length
    pub fn append(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("APPEND").arg(key).arg(value);
        self.session.lock().run(
            CommandDescriptor::new("APPEND"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Length of the string at `key`
    pub fn strlen(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("STRLEN").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("STRLEN"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Increment the integer at `key` by one
    pub fn incr(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("INCR").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("INCR"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Increment the integer at `key` by `delta`
    pub fn incr_by(&self, key: impl Into<Vec<u8>>, delta: i64) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("INCRBY").arg(key).arg_int(delta);
        self.session.lock().run(
            CommandDescriptor::new("INCRBY"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Decrement the integer at `key` by one
    pub fn decr(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("DECR").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("DECR"),
            Some(invoke(frame)),
            convert::integer,
        )
    }
}
