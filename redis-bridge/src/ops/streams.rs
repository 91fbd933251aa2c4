//! Stream operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame, StreamEntry, StreamId};

/// Operations on stream values
pub struct StreamOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> StreamOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Append an entry with auto-assigned id, returning the id
    pub fn xadd<I, F, V>(
        &self,
        key: impl Into<Vec<u8>>,
        fields: I,
    ) -> BridgeResult<Outcome<StreamId>>
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let mut frame = CommandFrame::new("XADD").arg(key).arg("*");
        for (field, value) in fields {
            frame = frame.arg(field).arg(value);
        }
        self.session.lock().run(
            CommandDescriptor::new("XADD"),
            Some(invoke(frame)),
            convert::stream_id,
        )
    }

    /// Number of entries in the stream at `key`
    pub fn xlen(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("XLEN").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("XLEN"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Entries with ids in `[start, end]`; `-`/`+` are the open bounds
    pub fn xrange(
        &self,
        key: impl Into<Vec<u8>>,
        start: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
        count: Option<i64>,
    ) -> BridgeResult<Outcome<Vec<StreamEntry>>> {
        let mut frame = CommandFrame::new("XRANGE").arg(key).arg(start).arg(end);
        if let Some(count) = count {
            frame = frame.arg("COUNT").arg_int(count);
        }
        self.session.lock().run(
            CommandDescriptor::new("XRANGE"),
            Some(invoke(frame)),
            convert::stream_entries,
        )
    }

    /// Delete entries by id, returning how many existed
    pub fn xdel<I>(&self, key: impl Into<Vec<u8>>, ids: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = StreamId>,
    {
        let mut frame = CommandFrame::new("XDEL").arg(key);
        for id in ids {
            frame = frame.arg(id.to_string());
        }
        self.session.lock().run(
            CommandDescriptor::new("XDEL"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Acknowledge pending entries for a consumer group
    pub fn xack<I>(
        &self,
        key: impl Into<Vec<u8>>,
        group: impl Into<Vec<u8>>,
        ids: I,
    ) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = StreamId>,
    {
        let mut frame = CommandFrame::new("XACK").arg(key).arg(group);
        for id in ids {
            frame = frame.arg(id.to_string());
        }
        self.session.lock().run(
            CommandDescriptor::new("XACK"),
            Some(invoke(frame)),
            convert::integer,
        )
    }
}
