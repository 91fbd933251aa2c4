//! Hash operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations on hash values
pub struct HashOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> HashOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Set fields on the hash at `key`, returning how many were created
    pub fn hset<I, F, V>(&self, key: impl Into<Vec<u8>>, fields: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let mut frame = CommandFrame::new("HSET").arg(key);
        for (field, value) in fields {
            frame = frame.arg(field).arg(value);
        }
        self.session.lock().run(
            CommandDescriptor::new("HSET"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Get one field of the hash at `key`
    pub fn hget(
        &self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<Option<Bytes>>> {
        let frame = CommandFrame::new("HGET").arg(key).arg(field);
        self.session.lock().run(
            CommandDescriptor::new("HGET"),
            Some(invoke(frame)),
            convert::optional_binary,
        )
    }

    /// Delete fields, returning how many existed
    pub fn hdel<I, F>(&self, key: impl Into<Vec<u8>>, fields: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = F>,
        F: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("HDEL").arg(key).args(fields);
        self.session.lock().run(
            CommandDescriptor::new("HDEL"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// All field/value pairs of the hash at `key`
    pub fn hgetall(
        &self,
        key: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<Vec<(Bytes, Bytes)>>> {
        let frame = CommandFrame::new("HGETALL").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("HGETALL"),
            Some(invoke(frame)),
            convert::binary_pairs,
        )
    }

    /// Number of fields in the hash at `key`
    pub fn hlen(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("HLEN").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("HLEN"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Values of several fields, position-aligned with the request
    pub fn hmget<I, F>(
        &self,
        key: impl Into<Vec<u8>>,
        fields: I,
    ) -> BridgeResult<Outcome<Vec<Option<Bytes>>>>
    where
        I: IntoIterator<Item = F>,
        F: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("HMGET").arg(key).args(fields);
        self.session.lock().run(
            CommandDescriptor::new("HMGET"),
            Some(invoke(frame)),
            convert::optional_binaries,
        )
    }

    /// Check whether `field` exists on the hash at `key`
    pub fn hexists(
        &self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<bool>> {
        let frame = CommandFrame::new("HEXISTS").arg(key).arg(field);
        self.session.lock().run(
            CommandDescriptor::new("HEXISTS"),
            Some(invoke(frame)),
            convert::boolean,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;
    use crate::test_util::{scripted_session, shared};

    #[test]
    fn hgetall_pairs_a_flat_reply() {
        let session = shared(scripted_session(vec![Resp2Reply::Array(vec![
            Resp2Reply::Bulk(Bytes::from_static(b"f")),
            Resp2Reply::Bulk(Bytes::from_static(b"v")),
        ])]));
        let hashes = HashOps::new(session);
        let pairs = hashes.hgetall("h").unwrap().immediate().unwrap();
        assert_eq!(
            pairs,
            vec![(Bytes::from_static(b"f"), Bytes::from_static(b"v"))]
        );
    }
}
