//! Sentinel monitoring operations
//!
//! Available only on a sentinel deployment; the other facades expose the
//! group but every call reports itself unsupported.

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver, Executor};
use crate::ops::SharedSession;
use crate::session::Session;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations against a sentinel quorum
pub struct SentinelOps<D: Driver> {
    session: SharedSession<D>,
}

fn on_sentinel<D: Driver>(session: &Session<D>, frame: CommandFrame) -> Option<Executor<D>> {
    session.topology().is_sentinel().then(|| invoke(frame))
}

impl<D: Driver> SentinelOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Property tables of every monitored master
    pub fn masters(&self) -> BridgeResult<Outcome<Vec<Vec<(String, String)>>>> {
        let mut session = self.session.lock();
        let executor = on_sentinel(&session, CommandFrame::new("SENTINEL").arg("MASTERS"));
        session.run(
            CommandDescriptor::with_sub("SENTINEL", "MASTERS"),
            executor,
            convert::list_of(convert::text_pairs),
        )
    }

    /// Current address of the named master, if it is monitored
    pub fn master_addr(&self, name: &str) -> BridgeResult<Outcome<Option<(String, String)>>> {
        let mut session = self.session.lock();
        let executor = on_sentinel(
            &session,
            CommandFrame::new("SENTINEL")
                .arg("GET-MASTER-ADDR-BY-NAME")
                .arg(name),
        );
        session.run(
            CommandDescriptor::with_sub("SENTINEL", "GET-MASTER-ADDR-BY-NAME"),
            executor,
            convert::option_of(|reply| {
                let mut parts = convert::texts(reply)?;
                if parts.len() != 2 {
                    return Err(redis_bridge_core::BridgeError::Type(format!(
                        "address reply has {} parts, expected 2",
                        parts.len()
                    )));
                }
                let port = parts.pop().unwrap_or_default();
                let host = parts.pop().unwrap_or_default();
                Ok((host, port))
            }),
        )
    }

    /// Property tables of the sentinels watching the named master
    pub fn sentinels(&self, name: &str) -> BridgeResult<Outcome<Vec<Vec<(String, String)>>>> {
        let mut session = self.session.lock();
        let executor = on_sentinel(
            &session,
            CommandFrame::new("SENTINEL").arg("SENTINELS").arg(name),
        );
        session.run(
            CommandDescriptor::with_sub("SENTINEL", "SENTINELS"),
            executor,
            convert::list_of(convert::text_pairs),
        )
    }
}
