//! List operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use bytes::Bytes;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};
use std::time::Duration;

/// Operations on list values
pub struct ListOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> ListOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Push values onto the head, returning the new length
    pub fn lpush<I, V>(&self, key: impl Into<Vec<u8>>, values: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("LPUSH").arg(key).args(values);
        self.session.lock().run(
            CommandDescriptor::new("LPUSH"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Push values onto the tail, returning the new length
    pub fn rpush<I, V>(&self, key: impl Into<Vec<u8>>, values: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("RPUSH").arg(key).args(values);
        self.session.lock().run(
            CommandDescriptor::new("RPUSH"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Pop from the head
    pub fn lpop(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<Option<Bytes>>> {
        let frame = CommandFrame::new("LPOP").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("LPOP"),
            Some(invoke(frame)),
            convert::optional_binary,
        )
    }

    /// Pop from the tail
    pub fn rpop(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<Option<Bytes>>> {
        let frame = CommandFrame::new("RPOP").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("RPOP"),
            Some(invoke(frame)),
            convert::optional_binary,
        )
    }

    /// Length of the list at `key`
    pub fn llen(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("LLEN").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("LLEN"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Elements in index range `[start, stop]`
    pub fn lrange(
        &self,
        key: impl Into<Vec<u8>>,
        start: i64,
        stop: i64,
    ) -> BridgeResult<Outcome<Vec<Bytes>>> {
        let frame = CommandFrame::new("LRANGE")
            .arg(key)
            .arg_int(start)
            .arg_int(stop);
        self.session.lock().run(
            CommandDescriptor::new("LRANGE"),
            Some(invoke(frame)),
            convert::binaries,
        )
    }

    /// Blocking head pop, returning the source key and the value
    ///
    /// Blocking holds the connection, so the call is only available in the
    /// normal execution context; a pipeline or transaction rejects it.
    pub fn blpop(
        &self,
        key: impl Into<Vec<u8>>,
        timeout: Duration,
    ) -> BridgeResult<Outcome<Option<(Bytes, Bytes)>>> {
        let mut session = self.session.lock();
        let executor = (!session.mode().is_deferred()).then(|| {
            invoke(
                CommandFrame::new("BLPOP")
                    .arg(key)
                    .arg_int(timeout.as_secs() as i64),
            )
        });
        session.run(CommandDescriptor::new("BLPOP"), executor, |reply| {
            convert::option_of(|reply| {
                let mut items = convert::binaries(reply)?;
                if items.len() != 2 {
                    return Err(redis_bridge_core::BridgeError::Type(format!(
                        "blocking pop reply has {} elements, expected 2",
                        items.len()
                    )));
                }
                let value = items.pop().unwrap_or_default();
                let source = items.pop().unwrap_or_default();
                Ok((source, value))
            })(reply)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;
    use crate::test_util::{scripted_session, shared};
    use redis_bridge_core::BridgeError;

    #[test]
    fn blpop_is_rejected_inside_a_pipeline() {
        let session = shared(scripted_session(vec![]));
        session.lock().open_pipeline().unwrap();
        let lists = ListOps::new(session);
        let err = lists.blpop("q", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BridgeError::NotSupportedInPipeline { .. }));
    }

    #[test]
    fn blpop_decodes_source_and_value() {
        let session = shared(scripted_session(vec![Resp2Reply::Array(vec![
            Resp2Reply::Bulk(Bytes::from_static(b"q")),
            Resp2Reply::Bulk(Bytes::from_static(b"job-1")),
        ])]));
        let lists = ListOps::new(session);
        let popped = lists
            .blpop("q", Duration::from_secs(1))
            .unwrap()
            .immediate()
            .unwrap();
        assert_eq!(
            popped,
            Some((Bytes::from_static(b"q"), Bytes::from_static(b"job-1")))
        );
    }
}
