//! Per-topology client facades
//!
//! One facade per deployment shape, all generic over the driver back-end and
//! all exposing the same operations groups; what differs is which calls carry
//! an executor. The facade owns the session, hands a shared handle to every
//! group, and exposes the pipeline/transaction control surface directly.

use crate::context::ExecMode;
use crate::convert;
use crate::driver::{invoke, Driver};
use crate::ops::{
    AclOps, ClusterOps, GeoOps, HashOps, KeyOps, ListOps, PubSubOps, ScriptOps, SentinelOps,
    ServerOps, SetOps, SharedSession, SortedSetOps, StreamOps, StringOps,
};
use crate::session::Session;
use parking_lot::Mutex;
use redis_bridge_core::{
    BridgeConfig, BridgeError, BridgeResult, CommandDescriptor, CommandFrame, Topology, Value,
};
use std::sync::Arc;
use tracing::info;

/// Session plus one instance of every operations group
struct ClientCore<D: Driver> {
    session: SharedSession<D>,
    keys: KeyOps<D>,
    strings: StringOps<D>,
    hashes: HashOps<D>,
    sets: SetOps<D>,
    zsets: SortedSetOps<D>,
    lists: ListOps<D>,
    streams: StreamOps<D>,
    geo: GeoOps<D>,
    scripting: ScriptOps<D>,
    pubsub: PubSubOps<D>,
    server: ServerOps<D>,
    acl: AclOps<D>,
    cluster: ClusterOps<D>,
    sentinel: SentinelOps<D>,
}

impl<D: Driver> ClientCore<D> {
    fn new(driver: D, topology: Topology) -> Self {
        let session: SharedSession<D> = Arc::new(Mutex::new(Session::new(driver, topology)));
        Self {
            keys: KeyOps::new(session.clone()),
            strings: StringOps::new(session.clone()),
            hashes: HashOps::new(session.clone()),
            sets: SetOps::new(session.clone()),
            zsets: SortedSetOps::new(session.clone()),
            lists: ListOps::new(session.clone()),
            streams: StreamOps::new(session.clone()),
            geo: GeoOps::new(session.clone()),
            scripting: ScriptOps::new(session.clone()),
            pubsub: PubSubOps::new(session.clone()),
            server: ServerOps::new(session.clone()),
            acl: AclOps::new(session.clone()),
            cluster: ClusterOps::new(session.clone()),
            sentinel: SentinelOps::new(session.clone()),
            session,
        }
    }

    fn watch_frame<I, K>(&self, name: &'static str, keys: Option<I>) -> BridgeResult<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let mut session = self.session.lock();
        let executor = session.mode().is_normal().then(|| {
            let mut frame = CommandFrame::new(name);
            if let Some(keys) = keys {
                frame = frame.args(keys);
            }
            invoke(frame)
        });
        session.run(CommandDescriptor::new(name), executor, convert::status)?;
        Ok(())
    }
}

macro_rules! facade_surface {
    ($client:ident) => {
        impl<D: Driver> $client<D> {
            /// Generic key-space operations
            #[must_use]
            pub fn keys(&self) -> &KeyOps<D> {
                &self.core.keys
            }

            /// String operations
            #[must_use]
            pub fn strings(&self) -> &StringOps<D> {
                &self.core.strings
            }

            /// Hash operations
            #[must_use]
            pub fn hashes(&self) -> &HashOps<D> {
                &self.core.hashes
            }

            /// Set operations
            #[must_use]
            pub fn sets(&self) -> &SetOps<D> {
                &self.core.sets
            }

            /// Sorted-set operations
            #[must_use]
            pub fn sorted_sets(&self) -> &SortedSetOps<D> {
                &self.core.zsets
            }

            /// List operations
            #[must_use]
            pub fn lists(&self) -> &ListOps<D> {
                &self.core.lists
            }

            /// Stream operations
            #[must_use]
            pub fn streams(&self) -> &StreamOps<D> {
                &self.core.streams
            }

            /// Geospatial operations
            #[must_use]
            pub fn geo(&self) -> &GeoOps<D> {
                &self.core.geo
            }

            /// Server-side scripting operations
            #[must_use]
            pub fn scripting(&self) -> &ScriptOps<D> {
                &self.core.scripting
            }

            /// Publish/subscribe operations
            #[must_use]
            pub fn pubsub(&self) -> &PubSubOps<D> {
                &self.core.pubsub
            }

            /// Server and connection operations
            #[must_use]
            pub fn server(&self) -> &ServerOps<D> {
                &self.core.server
            }

            /// Access-control list operations
            #[must_use]
            pub fn acl(&self) -> &AclOps<D> {
                &self.core.acl
            }

            /// Cluster management operations
            #[must_use]
            pub fn cluster(&self) -> &ClusterOps<D> {
                &self.core.cluster
            }

            /// Sentinel monitoring operations
            #[must_use]
            pub fn sentinel(&self) -> &SentinelOps<D> {
                &self.core.sentinel
            }

            /// Topology this facade was built for
            #[must_use]
            pub fn topology(&self) -> Topology {
                self.core.session.lock().topology()
            }

            /// Current execution context of the underlying connection
            #[must_use]
            pub fn mode(&self) -> ExecMode {
                self.core.session.lock().mode()
            }

            /// Start buffering commands into a pipeline
            pub fn open_pipeline(&self) -> BridgeResult<()> {
                self.core.session.lock().open_pipeline()
            }

            /// Send the buffered pipeline and resolve every deferred result
            pub fn sync(&self) -> BridgeResult<Vec<Value>> {
                self.core.session.lock().sync()
            }

            /// Start a transaction
            pub fn multi(&self) -> BridgeResult<()> {
                self.core.session.lock().open_transaction()
            }

            /// Commit the open transaction, resolving deferred results in order
            pub fn exec(&self) -> BridgeResult<Vec<Value>> {
                self.core.session.lock().commit()
            }

            /// Abort the open transaction
            pub fn discard(&self) -> BridgeResult<()> {
                self.core.session.lock().discard()
            }

            /// Watch keys for optimistic locking of the next transaction
            pub fn watch<I, K>(&self, keys: I) -> BridgeResult<()>
            where
                I: IntoIterator<Item = K>,
                K: Into<Vec<u8>>,
            {
                self.core.watch_frame("WATCH", Some(keys))
            }

            /// Drop every watched key
            pub fn unwatch(&self) -> BridgeResult<()> {
                self.core
                    .watch_frame::<[&str; 0], &str>("UNWATCH", None)
            }

            /// Abort any open batch and drop queued results
            ///
            /// Safe to call at any point and any number of times.
            pub fn close(&self) {
                self.core.session.lock().close();
            }
        }
    };
}

/// Facade for a single standalone server
pub struct StandaloneClient<D: Driver> {
    core: ClientCore<D>,
}

impl<D: Driver> StandaloneClient<D> {
    /// Build a facade over a connected driver
    pub fn connect(driver: D, config: &BridgeConfig) -> BridgeResult<Self> {
        let endpoints = config.parse_endpoints();
        if endpoints.is_empty() {
            return Err(BridgeError::Config(format!(
                "no endpoints in connection string {:?}",
                config.connection_string
            )));
        }
        info!(
            endpoint = %format!("{}:{}", endpoints[0].0, endpoints[0].1),
            driver = %config.driver,
            "standalone facade ready"
        );
        Ok(Self {
            core: ClientCore::new(driver, Topology::Standalone),
        })
    }
}

facade_surface!(StandaloneClient);

/// Facade for a sentinel-monitored deployment
pub struct SentinelClient<D: Driver> {
    core: ClientCore<D>,
}

impl<D: Driver> SentinelClient<D> {
    /// Build a facade over a driver connected to the resolved master
    ///
    /// Requires sentinel settings in the configuration.
    pub fn connect(driver: D, config: &BridgeConfig) -> BridgeResult<Self> {
        let Some(sentinel) = config.sentinel.as_ref() else {
            return Err(BridgeError::Config(
                "sentinel topology requires sentinel settings".to_string(),
            ));
        };
        if sentinel.sentinels.is_empty() {
            return Err(BridgeError::Config(format!(
                "no sentinel endpoints configured for master {:?}",
                sentinel.master_name
            )));
        }
        info!(
            master = %sentinel.master_name,
            sentinels = sentinel.sentinels.len(),
            driver = %config.driver,
            "sentinel facade ready"
        );
        Ok(Self {
            core: ClientCore::new(driver, Topology::Sentinel),
        })
    }
}

facade_surface!(SentinelClient);

/// Facade for a sharded cluster
pub struct ClusterClient<D: Driver> {
    core: ClientCore<D>,
}

impl<D: Driver> ClusterClient<D> {
    /// Build a facade over a cluster-aware driver
    pub fn connect(driver: D, config: &BridgeConfig) -> BridgeResult<Self> {
        let endpoints = config.parse_endpoints();
        if endpoints.is_empty() {
            return Err(BridgeError::Config(format!(
                "no endpoints in connection string {:?}",
                config.connection_string
            )));
        }
        info!(
            endpoints = endpoints.len(),
            driver = %config.driver,
            "cluster facade ready"
        );
        Ok(Self {
            core: ClientCore::new(driver, Topology::Cluster),
        })
    }
}

facade_surface!(ClusterClient);
