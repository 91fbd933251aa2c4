//! Shared test fixtures: a scripted driver and session constructors.

use crate::driver::{Dispatch, Driver, Resp2Reply};
use crate::ops::SharedSession;
use crate::session::Session;
use parking_lot::Mutex;
use redis_bridge_core::{CommandFrame, DriverError, DriverKind, DriverResult, Topology};
use std::collections::VecDeque;
use std::sync::Arc;

/// Scripted driver: immediate replies are popped in order; batches replay
/// the scripted batch outcome.
pub(crate) struct ScriptDriver {
    replies: VecDeque<Resp2Reply>,
    batch: Option<Vec<CommandFrame>>,
    batch_replies: Option<DriverResult<Vec<Resp2Reply>>>,
}

impl ScriptDriver {
    pub(crate) fn new(replies: Vec<Resp2Reply>) -> Self {
        Self {
            replies: replies.into(),
            batch: None,
            batch_replies: None,
        }
    }

    pub(crate) fn with_batch(replies: DriverResult<Vec<Resp2Reply>>) -> Self {
        Self {
            replies: VecDeque::new(),
            batch: None,
            batch_replies: Some(replies),
        }
    }
}

impl Driver for ScriptDriver {
    type Reply = Resp2Reply;

    fn kind(&self) -> DriverKind {
        DriverKind::Resp2
    }

    fn invoke(&mut self, frame: CommandFrame) -> DriverResult<Dispatch<Resp2Reply>> {
        if let Some(batch) = self.batch.as_mut() {
            batch.push(frame);
            return Ok(Dispatch::Buffered);
        }
        self.replies
            .pop_front()
            .map(Dispatch::Replied)
            .ok_or_else(|| DriverError::Connection("script exhausted".to_string()))
    }

    fn open_pipeline(&mut self) -> DriverResult<()> {
        self.batch = Some(Vec::new());
        Ok(())
    }

    fn flush_pipeline(&mut self) -> DriverResult<Vec<Resp2Reply>> {
        self.batch = None;
        self.batch_replies.take().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn open_transaction(&mut self) -> DriverResult<()> {
        self.batch = Some(Vec::new());
        Ok(())
    }

    fn commit_transaction(&mut self) -> DriverResult<Vec<Resp2Reply>> {
        self.batch = None;
        self.batch_replies.take().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn discard_transaction(&mut self) -> DriverResult<()> {
        self.batch = None;
        Ok(())
    }
}

/// Standalone session over a scripted driver
pub(crate) fn scripted_session(replies: Vec<Resp2Reply>) -> Session<ScriptDriver> {
    Session::new(ScriptDriver::new(replies), Topology::Standalone)
}

/// Session over a scripted driver with an explicit topology
pub(crate) fn scripted_session_on(
    topology: Topology,
    replies: Vec<Resp2Reply>,
) -> Session<ScriptDriver> {
    Session::new(ScriptDriver::new(replies), topology)
}

/// Wrap a session in the handle the operations groups expect
pub(crate) fn shared<D: Driver>(session: Session<D>) -> SharedSession<D> {
    Arc::new(Mutex::new(session))
}
