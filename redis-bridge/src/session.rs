//! Per-connection command runner and lifecycle state machine
//!
//! A [`Session`] owns one driver, the connection's [`ExecMode`], and the FIFO
//! result queue used while a pipeline or transaction is open. Every
//! operations-group method funnels through [`Session::run`] with a command
//! descriptor, an optional executor, and a converter; the session decides
//! between immediate evaluation and deferral, and selects the error kind when
//! the executor is absent.

use crate::context::ExecMode;
use crate::deferred::{Deferred, Outcome, ResultQueue};
use crate::driver::{Dispatch, Driver, Executor, Reply};
use redis_bridge_core::{
    BridgeError, BridgeResult, CommandDescriptor, DriverError, Topology, Value,
};
use tracing::{debug, warn};

/// One logical connection: driver, execution context, and result queue
pub struct Session<D: Driver> {
    driver: D,
    topology: Topology,
    mode: ExecMode,
    queue: ResultQueue<D::Reply>,
}

impl<D: Driver> Session<D> {
    /// Create a session over a connected driver
    pub fn new(driver: D, topology: Topology) -> Self {
        Self {
            driver,
            topology,
            mode: ExecMode::Normal,
            queue: ResultQueue::new(),
        }
    }

    /// Topology this session's facade was built for
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Current execution context
    #[must_use]
    pub const fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Check if a pipeline is open
    #[must_use]
    pub const fn is_pipeline(&self) -> bool {
        self.mode.is_pipeline()
    }

    /// Check if a transaction is open
    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        self.mode.is_transaction()
    }

    /// Submit one command for execution
    ///
    /// With no executor the call is rejected with the error kind selected by
    /// the current execution context. Otherwise the executor runs once: in
    /// normal mode its reply is converted and returned immediately; in a
    /// pipeline or transaction the driver buffers the call and a deferred
    /// handle is returned, resolved in submission order by `sync`/`commit`.
    pub fn run<T, C>(
        &mut self,
        command: CommandDescriptor,
        executor: Option<Executor<D>>,
        convert: C,
    ) -> BridgeResult<Outcome<T>>
    where
        T: Into<Value> + Clone + Send + 'static,
        C: FnOnce(D::Reply) -> BridgeResult<T> + Send + 'static,
    {
        let Some(executor) = executor else {
            let err = self.unsupported(command);
            warn!(command = %command, topology = %self.topology, mode = %self.mode, "rejecting unsupported command");
            return Err(err);
        };

        debug!(command = %command, mode = %self.mode, "dispatching");
        let dispatched = executor(&mut self.driver)
            .map_err(|source| BridgeError::Execution { command, source })?;

        match (self.mode, dispatched) {
            (ExecMode::Normal, Dispatch::Replied(raw)) => {
                if let Some(message) = raw.error_message() {
                    return Err(BridgeError::Execution {
                        command,
                        source: DriverError::Server(message.to_string()),
                    });
                }
                convert(raw).map(Outcome::Immediate)
            }
            (ExecMode::Normal, Dispatch::Buffered) => Err(BridgeError::InvalidState(format!(
                "driver buffered {command} outside a pipeline or transaction"
            ))),
            (_, Dispatch::Buffered) => {
                let handle = Deferred::unresolved();
                let slot = handle.clone();
                self.queue.push(
                    command,
                    Box::new(move |raw| match raw {
                        Some(raw) => {
                            if let Some(message) = raw.error_message() {
                                // The handle and the positional report carry
                                // the same error kind.
                                let server = |message: &str| BridgeError::Execution {
                                    command,
                                    source: DriverError::Server(message.to_string()),
                                };
                                slot.fill(Err(server(message)));
                                return Err(server(message));
                            }
                            match convert(raw) {
                                Ok(value) => {
                                    let erased: Value = value.clone().into();
                                    slot.fill(Ok(value));
                                    Ok(erased)
                                }
                                Err(err) => {
                                    let reported = BridgeError::Type(err.to_string());
                                    slot.fill(Err(err));
                                    Err(reported)
                                }
                            }
                        }
                        None => {
                            slot.cancel();
                            Err(BridgeError::Discarded)
                        }
                    }),
                );
                Ok(Outcome::Deferred(handle))
            }
            (_, Dispatch::Replied(_)) => Err(BridgeError::InvalidState(format!(
                "driver replied to {command} inside an open {} batch",
                self.mode
            ))),
        }
    }

    /// Open a pipeline; fails unless the session is in normal mode
    pub fn open_pipeline(&mut self) -> BridgeResult<()> {
        self.require_normal("open a pipeline")?;
        self.driver.open_pipeline().map_err(BridgeError::Driver)?;
        self.mode = ExecMode::Pipeline;
        debug!("pipeline opened");
        Ok(())
    }

    /// Flush the open pipeline and resolve every deferred result in order
    pub fn sync(&mut self) -> BridgeResult<Vec<Value>> {
        if !self.mode.is_pipeline() {
            return Err(BridgeError::InvalidState(format!(
                "cannot sync: session is in {} mode",
                self.mode
            )));
        }
        self.mode = ExecMode::Normal;
        debug!(queued = self.queue.len(), "flushing pipeline");
        match self.driver.flush_pipeline() {
            Ok(raws) => self.queue.resolve_all(raws),
            Err(source) => {
                warn!(error = %source, "pipeline flush failed; dropping queued results");
                self.queue.cancel_all();
                Err(BridgeError::Driver(source))
            }
        }
    }

    /// Open a transaction; fails unless the session is in normal mode
    pub fn open_transaction(&mut self) -> BridgeResult<()> {
        self.require_normal("open a transaction")?;
        self.driver
            .open_transaction()
            .map_err(BridgeError::Driver)?;
        self.mode = ExecMode::Transaction;
        debug!("transaction opened");
        Ok(())
    }

    /// Commit the open transaction
    ///
    /// The returned list mirrors the caller's command sequence: position `i`
    /// holds converter `i` applied to the i-th raw result of the commit.
    /// Commit is all-or-nothing: when the underlying commit fails the queue
    /// is cleared and the failure is surfaced, never a partial resolution.
    pub fn commit(&mut self) -> BridgeResult<Vec<Value>> {
        if !self.mode.is_transaction() {
            return Err(BridgeError::InvalidState(format!(
                "cannot commit: session is in {} mode",
                self.mode
            )));
        }
        self.mode = ExecMode::Normal;
        debug!(queued = self.queue.len(), "committing transaction");
        match self.driver.commit_transaction() {
            Ok(raws) => self.queue.resolve_all(raws),
            Err(source) => {
                warn!(error = %source, "commit failed; dropping queued results");
                self.queue.cancel_all();
                Err(BridgeError::CommitFailed { source })
            }
        }
    }

    /// Abort the open transaction without resolving anything
    pub fn discard(&mut self) -> BridgeResult<()> {
        if !self.mode.is_transaction() {
            return Err(BridgeError::InvalidState(format!(
                "cannot discard: session is in {} mode",
                self.mode
            )));
        }
        self.mode = ExecMode::Normal;
        self.driver
            .discard_transaction()
            .map_err(BridgeError::Driver)?;
        self.queue.cancel_all();
        debug!("transaction discarded");
        Ok(())
    }

    /// Idempotent cleanup: abort any open batch and drop queued results
    ///
    /// Safe to call after `commit`, after `discard`, and repeatedly; a second
    /// call is a guaranteed no-op.
    pub fn close(&mut self) {
        match self.mode {
            ExecMode::Normal => {}
            ExecMode::Pipeline => {
                let _ = self.driver.flush_pipeline();
            }
            ExecMode::Transaction => {
                let _ = self.driver.discard_transaction();
            }
        }
        self.mode = ExecMode::Normal;
        self.queue.cancel_all();
    }

    fn require_normal(&self, action: &str) -> BridgeResult<()> {
        if self.mode.is_normal() {
            Ok(())
        } else {
            Err(BridgeError::InvalidState(format!(
                "cannot {action}: session is already in {} mode",
                self.mode
            )))
        }
    }

    fn unsupported(&self, command: CommandDescriptor) -> BridgeError {
        let topology = self.topology;
        match self.mode {
            ExecMode::Normal => BridgeError::NotSupported { command, topology },
            ExecMode::Pipeline => BridgeError::NotSupportedInPipeline { command, topology },
            ExecMode::Transaction => BridgeError::NotSupportedInTransaction { command, topology },
        }
    }
}
