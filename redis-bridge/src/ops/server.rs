//! Server and connection operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations on the server itself
pub struct ServerOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> ServerOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Liveness probe; returns the server's pong
    pub fn ping(&self) -> BridgeResult<Outcome<String>> {
        let frame = CommandFrame::new("PING");
        self.session.lock().run(
            CommandDescriptor::new("PING"),
            Some(invoke(frame)),
            convert::text,
        )
    }

    /// Round-trip a payload unchanged
    pub fn echo(&self, message: impl Into<Vec<u8>>) -> BridgeResult<Outcome<Bytes>> {
        let frame = CommandFrame::new("ECHO").arg(message);
        self.session.lock().run(
            CommandDescriptor::new("ECHO"),
            Some(invoke(frame)),
            convert::binary,
        )
    }

    /// Server statistics report, optionally restricted to one section
    pub fn info(&self, section: Option<&str>) -> BridgeResult<Outcome<String>> {
        let mut frame = CommandFrame::new("INFO");
        if let Some(section) = section {
            frame = frame.arg(section);
        }
        self.session.lock().run(
            CommandDescriptor::new("INFO"),
            Some(invoke(frame)),
            convert::text,
        )
    }

    /// Number of keys in the selected database
    pub fn dbsize(&self) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("DBSIZE");
        self.session.lock().run(
            CommandDescriptor::new("DBSIZE"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Drop every key in the selected database
    pub fn flushdb(&self) -> BridgeResult<Outcome<()>> {
        let frame = CommandFrame::new("FLUSHDB");
        self.session.lock().run(
            CommandDescriptor::new("FLUSHDB"),
            Some(invoke(frame)),
            convert::status,
        )
    }

    /// Server clock as seconds and microseconds
    pub fn time(&self) -> BridgeResult<Outcome<(i64, i64)>> {
        let frame = CommandFrame::new("TIME");
        self.session.lock().run(
            CommandDescriptor::new("TIME"),
            Some(invoke(frame)),
            convert::time_pair,
        )
    }

    /// Configuration parameters matching a glob pattern
    pub fn config_get(&self, pattern: &str) -> BridgeResult<Outcome<Vec<(String, String)>>> {
        let frame = CommandFrame::new("CONFIG").arg("GET").arg(pattern);
        self.session.lock().run(
            CommandDescriptor::with_sub("CONFIG", "GET"),
            Some(invoke(frame)),
            convert::text_pairs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;
    use crate::test_util::{scripted_session, shared};

    #[test]
    fn time_decodes_both_clock_parts() {
        let session = shared(scripted_session(vec![Resp2Reply::Array(vec![
            Resp2Reply::Bulk(Bytes::from_static(b"1690000000")),
            Resp2Reply::Bulk(Bytes::from_static(b"12345")),
        ])]));
        let server = ServerOps::new(session);
        let (secs, micros) = server.time().unwrap().immediate().unwrap();
        assert_eq!(secs, 1_690_000_000);
        assert_eq!(micros, 12_345);
    }
}
