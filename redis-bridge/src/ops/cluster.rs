//! Cluster management operations
//!
//! Every method here supplies an executor only when the session was built for
//! a cluster deployment; standalone and sentinel facades expose the same
//! group but each call reports itself unsupported.

use crate::convert;
use crate::deferred::Outcome;
use crate::driver::{invoke, Driver, Executor};
use crate::ops::SharedSession;
use crate::session::Session;
use redis_bridge_core::{
    BridgeResult, CommandDescriptor, CommandFrame, NodeDescriptor, SlotRange,
};

/// Operations on cluster topology and slot assignment
pub struct ClusterOps<D: Driver> {
    session: SharedSession<D>,
}

fn on_cluster<D: Driver>(session: &Session<D>, frame: CommandFrame) -> Option<Executor<D>> {
    session.topology().is_cluster().then(|| invoke(frame))
}

impl<D: Driver> ClusterOps<D> {
    pub(crate) fn new(session: SharedSession<D>) -> Self {
        Self { session }
    }

    /// Descriptors of every known node
    pub fn nodes(&self) -> BridgeResult<Outcome<Vec<NodeDescriptor>>> {
        let mut session = self.session.lock();
        let executor = on_cluster(&session, CommandFrame::new("CLUSTER").arg("NODES"));
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "NODES"),
            executor,
            convert::cluster_nodes,
        )
    }

    /// Slot ranges and the nodes serving them
    pub fn slots(&self) -> BridgeResult<Outcome<Vec<SlotRange>>> {
        let mut session = self.session.lock();
        let executor = on_cluster(&session, CommandFrame::new("CLUSTER").arg("SLOTS"));
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "SLOTS"),
            executor,
            convert::slot_ranges,
        )
    }

    /// Human-readable cluster state report
    pub fn info(&self) -> BridgeResult<Outcome<String>> {
        let mut session = self.session.lock();
        let executor = on_cluster(&session, CommandFrame::new("CLUSTER").arg("INFO"));
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "INFO"),
            executor,
            convert::text,
        )
    }

    /// Hash slot a key maps to
    pub fn key_slot(&self, key: impl Into<Vec<u8>>) -> BridgeResult<Outcome<i64>> {
        let mut session = self.session.lock();
        let executor = on_cluster(
            &session,
            CommandFrame::new("CLUSTER").arg("KEYSLOT").arg(key),
        );
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "KEYSLOT"),
            executor,
            convert::integer,
        )
    }

    /// Introduce a node to the cluster
    pub fn meet(&self, host: &str, port: u16) -> BridgeResult<Outcome<()>> {
        let mut session = self.session.lock();
        let executor = on_cluster(
            &session,
            CommandFrame::new("CLUSTER")
                .arg("MEET")
                .arg(host)
                .arg_int(i64::from(port)),
        );
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "MEET"),
            executor,
            convert::status,
        )
    }

    /// Remove a node from the cluster view
    pub fn forget(&self, node_id: &str) -> BridgeResult<Outcome<()>> {
        let mut session = self.session.lock();
        let executor = on_cluster(
            &session,
            CommandFrame::new("CLUSTER").arg("FORGET").arg(node_id),
        );
        session.run(
            CommandDescriptor::with_sub("CLUSTER", "FORGET"),
            executor,
            convert::status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;
    use crate::test_util::{scripted_session, scripted_session_on, shared};
    use bytes::Bytes;
    use redis_bridge_core::{BridgeError, NodeRole, Topology};

    #[test]
    fn cluster_calls_are_rejected_off_cluster() {
        let session = shared(scripted_session(vec![]));
        let cluster = ClusterOps::new(session);
        let err = cluster.nodes().unwrap_err();
        match err {
            BridgeError::NotSupported { command, topology } => {
                assert_eq!(command.to_string(), "CLUSTER NODES");
                assert_eq!(topology, Topology::Standalone);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nodes_parses_the_bulk_report() {
        let report = "\
07c3 10.0.0.1:7000@17000 myself,master - 0 0 1 connected 0-5460\n\
a9f1 10.0.0.2:7001@17001 slave 07c3 0 1690000000 2 connected\n";
        let session = shared(scripted_session_on(
            Topology::Cluster,
            vec![Resp2Reply::Bulk(Bytes::copy_from_slice(report.as_bytes()))],
        ));
        let cluster = ClusterOps::new(session);
        let nodes = cluster.nodes().unwrap().immediate().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "07c3");
        assert_eq!(nodes[0].role, NodeRole::Master);
        assert!(nodes[0].owns_slot(5000));
        assert_eq!(nodes[1].role, NodeRole::Replica);
    }
}
