//! Sorted-set operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame, ScoredMember};

/// Operations on sorted-set values
pub struct SortedSetOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> SortedSetOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Add scored members, returning how many were new
    pub fn zadd<I, M>(&self, key: impl Into<Vec<u8>>, members: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = (f64, M)>,
        M: Into<Vec<u8>>,
    {
        let mut frame = CommandFrame::new("ZADD").arg(key);
        for (score, member) in members {
            frame = frame.arg_float(score).arg(member);
        }
        self.session.lock().run(
            CommandDescriptor::new("ZADD"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Score of `member`, if present
    pub fn zscore(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<Option<f64>>> {
        let frame = CommandFrame::new("ZSCORE").arg(key).arg(member);
        self.session.lock().run(
            CommandDescriptor::new("ZSCORE"),
            Some(invoke(frame)),
            convert::optional_float,
        )
    }

    /// Increment the score of `member`, returning the new score
    pub fn zincr_by(
        &self,
        key: impl Into<Vec<u8>>,
        delta: f64,
        member: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<f64>> {
        let frame = CommandFrame::new("ZINCRBY")
            .arg(key)
            .arg_float(delta)
            .arg(member);
        self.session.lock().run(
            CommandDescriptor::new("ZINCRBY"),
            Some(invoke(frame)),
            convert::float,
        )
    }

    /// Cardinality of the sorted set at `key`
    pub fn zcard(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("ZCARD").arg(key);
        self.session.lock().run(
            CommandDescriptor::new("ZCARD"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Ascending rank of `member`, if present
    pub fn zrank(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<Option<i64>>> {
        let frame = CommandFrame::new("ZRANK").arg(key).arg(member);
        self.session.lock().run(
            CommandDescriptor::new("ZRANK"),
            Some(invoke(frame)),
            convert::option_of(convert::integer),
        )
    }

    /// Members in rank range `[start, stop]`, each with its score
    pub fn zrange_with_scores(
        &self,
        key: impl Into<Vec<u8>>,
        start: i64,
        stop: i64,
    ) -> BridgeResult<Outcome<Vec<ScoredMember>>> {
        let frame = CommandFrame::new("ZRANGE")
            .arg(key)
            .arg_int(start)
            .arg_int(stop)
            .arg("WITHSCORES");
        self.session.lock().run(
            CommandDescriptor::new("ZRANGE"),
            Some(invoke(frame)),
            convert::scored_members,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;
    use crate::test_util::{scripted_session, shared};
    use bytes::Bytes;

    #[test]
    fn zrange_with_scores_pairs_members_and_scores() {
        let session = shared(scripted_session(vec![Resp2Reply::Array(vec![
            Resp2Reply::Bulk(Bytes::from_static(b"a")),
            Resp2Reply::Bulk(Bytes::from_static(b"1.5")),
        ])]));
        let zsets = SortedSetOps::new(session);
        let members = zsets
            .zrange_with_scores("board", 0, -1)
            .unwrap()
            .immediate()
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member, Bytes::from_static(b"a"));
        assert!((members[0].score - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zrank_maps_nil_to_none() {
        let session = shared(scripted_session(vec![Resp2Reply::Nil]));
        let zsets = SortedSetOps::new(session);
        assert_eq!(zsets.zrank("board", "x").unwrap().immediate().unwrap(), None);
    }
}
