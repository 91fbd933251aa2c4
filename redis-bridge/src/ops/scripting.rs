//! Server-side scripting operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame, Value};

/// Operations for Lua scripting
pub struct ScriptOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> ScriptOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Evaluate a script; the reply keeps its raw shape
    pub fn eval<I, K>(&self, script: impl Into<Vec<u8>>, keys: I) -> BridgeResult<Outcome<Value>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let keys: Vec<Vec<u8>> = keys.into_iter().map(Into::into).collect();
        let frame = CommandFrame::new("EVAL")
            .arg(script)
            .arg_int(keys.len() as i64)
            .args(keys);
        self.session.lock().run(
            CommandDescriptor::new("EVAL"),
            Some(invoke(frame)),
            convert::raw,
        )
    }

    /// Evaluate a script by its cached digest
    pub fn evalsha<I, K>(&self, digest: impl Into<Vec<u8>>, keys: I) -> BridgeResult<Outcome<Value>>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let keys: Vec<Vec<u8>> = keys.into_iter().map(Into::into).collect();
        let frame = CommandFrame::new("EVALSHA")
            .arg(digest)
            .arg_int(keys.len() as i64)
            .args(keys);
        self.session.lock().run(
            CommandDescriptor::new("EVALSHA"),
            Some(invoke(frame)),
            convert::raw,
        )
    }

    /// Load a script into the server cache, returning its digest
    pub fn script_load(&self, script: impl Into<Vec<u8>>) -> BridgeResult<Outcome<String>> {
        let frame = CommandFrame::new("SCRIPT").arg("LOAD").arg(script);
        self.session.lock().run(
            CommandDescriptor::with_sub("SCRIPT", "LOAD"),
            Some(invoke(frame)),
            convert::text,
        )
    }

    /// Check which digests are cached, aligned with the request
    pub fn script_exists<I, S>(&self, digests: I) -> BridgeResult<Outcome<Vec<bool>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("SCRIPT").arg("EXISTS").args(digests);
        self.session.lock().run(
            CommandDescriptor::with_sub("SCRIPT", "EXISTS"),
            Some(invoke(frame)),
            convert::list_of(convert::boolean),
        )
    }
}
