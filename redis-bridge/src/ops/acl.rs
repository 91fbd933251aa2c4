//! Access-control list operations

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver};
use crate::ops::SharedSession;
use redis_bridge_core::{BridgeResult, CommandDescriptor, CommandFrame};

/// Operations on server access-control lists
pub struct AclOps<D: Driver> {
    session: SharedSession<D>,
}

impl<D: Driver> AclOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Name of the authenticated user on this connection
    pub fn whoami(&self) -> BridgeResult<Outcome<String>> {
        let frame = CommandFrame::new("ACL").arg("WHOAMI");
        self.session.lock().run(
            CommandDescriptor::with_sub("ACL", "WHOAMI"),
            Some(invoke(frame)),
            convert::text,
        )
    }

    /// Rule lines of every configured user
    pub fn list(&self) -> BridgeResult<Outcome<Vec<String>>> {
        let frame = CommandFrame::new("ACL").arg("LIST");
        self.session.lock().run(
            CommandDescriptor::with_sub("ACL", "LIST"),
            Some(invoke(frame)),
            convert::texts,
        )
    }

    /// Known command categories
    pub fn cat(&self) -> BridgeResult<Outcome<Vec<String>>> {
        let frame = CommandFrame::new("ACL").arg("CAT");
        self.session.lock().run(
            CommandDescriptor::with_sub("ACL", "CAT"),
            Some(invoke(frame)),
            convert::texts,
        )
    }

    /// Create or update a user with the given rule tokens
    pub fn setuser<I, R>(&self, user: &str, rules: I) -> BridgeResult<Outcome<()>>
    where
        I: IntoIterator<Item = R>,
        R: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("ACL").arg("SETUSER").arg(user).args(rules);
        self.session.lock().run(
            CommandDescriptor::with_sub("ACL", "SETUSER"),
            Some(invoke(frame)),
            convert::status,
        )
    }

    /// Delete users, returning how many existed
    pub fn deluser<I, U>(&self, users: I) -> BridgeResult<Outcome<i64>>
    where
        I: IntoIterator<Item = U>,
        U: Into<Vec<u8>>,
    {
        let frame = CommandFrame::new("ACL").arg("DELUSER").args(users);
        self.session.lock().run(
            CommandDescriptor::with_sub("ACL", "DELUSER"),
            Some(invoke(frame)),
            convert::integer,
        )
    }
}
