//! Set operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations on set values
pub struct SetOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> SetOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Add members to the set at `key`, returning how many were new
    pub fn sadd<I, M>(&self, key: impl Into<Vec<u8>>, members: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = M>,
        M: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("SADD").arg(key).args(members);
        self.session.lock().run(
            CommandDescriptor::new("SADD"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Remove members, returning how many existed
    pub fn srem<I, M>(&self, key: impl Into<Vec<u8>>, members: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = M>,
        M: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("SREM").arg(key).args(members);
        self.session.lock().run(
            CommandDescriptor::new("SREM"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Cardinality of the set at `key`
    pub fn scard(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("SCARD").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("SCARD"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Check membership of `member` in the set at `key`
    pub fn sismember(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("SISMEMBER").arg(key).arg(member);
        self.session.lock().run(
            CommandDescriptor::new("SISMEMBER"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }

    /// All members of the set at `key`
    pub fn smembers(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<Vec<Bytes>>> {
        let frame = CommandFrame::new("SMEMBERS").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("SMEMBERS"),
            Some(invoke(frame)),
            convert::binaries,
        )
    }
}
