//! Generic key-space operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame, KeyKind};
use std::time::Duration;

/// Operations that act on keys regardless of their value type
pub struct KeyOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> KeyOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Delete keys, returning how many existed
    pub fn del<I, K>(&self, keys: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("DEL").args(keys);
        self.session.lock().run(
            CommandDescriptor::new("DEL"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Check whether `key` exists
    pub fn exists(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("EXISTS").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("EXISTS"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }

    /// Set a time-to-live on `key`; false when the key does not exist
    pub fn expire(&self, key: impl Into<Vec<u8>>, ttl: Duration) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("EXPIRE")
            .arg(key)
            .arg_int(ttl.as_secs() as i64);
        self.session.lock().run(
            CommandDescriptor::new("EXPIRE"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }

    /// Remaining time-to-live in seconds; -1 without a ttl, -2 without a key
    pub fn ttl(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("TTL").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("TTL"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Clear the time-to-live on `key`
    pub fn persist(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("PERSIST").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("PERSIST"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }

    /// Value kind stored at `key`
    pub fn key_type(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<KeyKind>> {
        let frame = CommandFrame::new("TYPE").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("TYPE"),
            Some(invoke(frame)),
            convert::key_kind,
        )
    }

    /// Rename `key` to `target`
    pub fn rename(
        &self,
        key: impl Into<Vec<u8>>,
        target: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<()>> {
        let frame = CommandFrame::new("RENAME").arg(key).arg(target);
        self.session.lock().run(
            CommandDescriptor::new("RENAME"),
            Some(invoke(frame)),
            convert::status,
        )
    }

    /// Move `key` to another logical database
    ///
    /// A cluster has a single key space, so the call is rejected there.
    pub fn move_db(&self, key: impl Into<Vec<u8>>, db: i64) -> BridgeResult<Outcome<bool>> {
        let mut session = self.session.lock();
        let executor = (!session.topology().is_cluster())
            .then(|| invoke(CommandFrame::new("MOVE").arg(key).arg_int(db)));
        session.run(CommandDescriptor::new("MOVE"), executor, convert::boolean)
    }
}
