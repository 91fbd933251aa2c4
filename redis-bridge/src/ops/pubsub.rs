//! Publish/subscribe operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations on the publish/subscribe machinery
pub struct PubSubOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> PubSubOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Publish a message, returning how many subscribers received it
    pub fn publish(
        &self,
        channel: impl Into<Vec<u8>>,
        message: impl Into<Vec<u8>>,
    ) -> BridgeResult<Outcome<i64>> {
        let frame = CommandFrame::new("PUBLISH").arg(channel).arg(message);
        self.session.lock().run(
            CommandDescriptor::new("PUBLISH"),
            Some(invoke(frame)),
            convert::integer,
        )
    }

    /// Active channels, optionally filtered by a glob pattern
    pub fn channels(&self, pattern: Option<&str>) -> BridgeResult<Outcome<Vec<String>>> {
        let mut frame = CommandFrame::new("PUBSUB").arg("CHANNELS");
        if let Some(pattern) = pattern {
            frame = frame.arg(pattern);
        }
        self.session.lock().run(
            CommandDescriptor::with_sub("PUBSUB", "CHANNELS"),
            Some(invoke(frame)),
            convert::texts,
        )
    }

    /// Subscriber counts for the named channels
    pub fn numsub<I, C>(&self, channels: I) -> BridgeResult<Outcome<Vec<(String, i64)>>>
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("PUBSUB").arg("NUMSUB").args(channels);
        self.session.lock().run(
            CommandDescriptor::with_sub("PUBSUB", "NUMSUB"),
            Some(invoke(frame)),
            convert::pairs_of(convert::text, convert::integer),
        )
    }

    /// Enter subscriber mode on this connection
    ///
    /// Subscribing flips the connection into a push protocol that the
    /// request/reply runner cannot service, so the call is rejected in every
    /// topology and context; a dedicated connection outside this layer is the
    /// supported route.
    pub fn subscribe(&self, _channel: impl Into<Vec<u8>>) -> BridgeResult<Outcome<()>> {
        self.session
            .lock()
            .run(CommandDescriptor::new("SUBSCRIBE"), None, convert::status)
    }
}
