//! Error taxonomy for bridge operations
//!
//! Two distinct kinds are kept apart on purpose: [`DriverError`] is a runtime
//! failure raised at the driver boundary (network, protocol, server reply),
//! while [`BridgeError`] is the caller-facing taxonomy. "Not implemented for
//! this combination" and "the call itself failed" are separate variants so
//! callers can pattern-match without inspecting messages.

use crate::command::CommandDescriptor;
use crate::config::Topology;
use std::io;
use thiserror::Error;

/// Result type for caller-facing bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Result type for calls into an underlying driver
pub type DriverResult<T> = Result<T, DriverError>;

/// Failure raised by an underlying driver call
#[derive(Error, Debug)]
pub enum DriverError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Reply violated the driver's native protocol expectations
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server returned an error reply
    #[error("server error: {0}")]
    Server(String),

    /// Connection-level failure
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation timed out
    #[error("operation timed out")]
    Timeout,
}

/// Caller-facing error for the compatibility layer
#[derive(Error, Debug)]
pub enum BridgeError {
    /// No executor was declared for the command in immediate mode
    #[error("command {command} is not supported on {topology} topology")]
    NotSupported {
        /// Command that was rejected
        command: CommandDescriptor,
        /// Topology the facade was built for
        topology: Topology,
    },

    /// No executor was declared for the command inside an open pipeline
    #[error("command {command} is not supported in a pipeline on {topology} topology")]
    NotSupportedInPipeline {
        /// Command that was rejected
        command: CommandDescriptor,
        /// Topology the facade was built for
        topology: Topology,
    },

    /// No executor was declared for the command inside an open transaction
    #[error("command {command} is not supported in a transaction on {topology} topology")]
    NotSupportedInTransaction {
        /// Command that was rejected
        command: CommandDescriptor,
        /// Topology the facade was built for
        topology: Topology,
    },

    /// The executor was present but the underlying driver call failed
    #[error("command {command} failed: {source}")]
    Execution {
        /// Command whose driver call failed
        command: CommandDescriptor,
        /// Original driver failure
        #[source]
        source: DriverError,
    },

    /// The underlying transaction commit itself failed
    #[error("transaction commit failed: {source}")]
    CommitFailed {
        /// Original driver failure
        #[source]
        source: DriverError,
    },

    /// Commit returned a different number of raw results than were queued
    #[error("transaction returned {returned} results for {queued} queued commands")]
    CommitMismatch {
        /// Commands queued before commit
        queued: usize,
        /// Raw results the driver handed back
        returned: usize,
    },

    /// Driver failure outside a single command dispatch (lifecycle calls)
    #[error("driver error: {0}")]
    Driver(#[source] DriverError),

    /// Lifecycle call made in the wrong execution context
    #[error("invalid connection state: {0}")]
    InvalidState(String),

    /// A converter could not map the raw reply to the requested domain type
    #[error("type conversion failed: {0}")]
    Type(String),

    /// A deferred result was read before commit/sync resolved it
    #[error("deferred result is not resolved yet")]
    Unresolved,

    /// A deferred result was read after the transaction was discarded
    #[error("deferred result was discarded before resolution")]
    Discarded,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BridgeError {
    /// Check whether this error is one of the unsupported-command kinds
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::NotSupported { .. }
                | Self::NotSupportedInPipeline { .. }
                | Self::NotSupportedInTransaction { .. }
        )
    }

    /// Command descriptor attached to the error, when there is one
    #[must_use]
    pub const fn command(&self) -> Option<CommandDescriptor> {
        match self {
            Self::NotSupported { command, .. }
            | Self::NotSupportedInPipeline { command, .. }
            | Self::NotSupportedInTransaction { command, .. }
            | Self::Execution { command, .. } => Some(*command),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_names_command_and_topology() {
        let err = BridgeError::NotSupportedInTransaction {
            command: CommandDescriptor::with_sub("CLUSTER", "NODES"),
            topology: Topology::Cluster,
        };
        let msg = err.to_string();
        assert!(msg.contains("CLUSTER NODES"));
        assert!(msg.contains("cluster"));
        assert!(msg.contains("transaction"));
    }

    #[test]
    fn execution_error_keeps_original_cause() {
        let err = BridgeError::Execution {
            command: CommandDescriptor::new("GET"),
            source: DriverError::Server("WRONGTYPE".to_string()),
        };
        assert!(err.to_string().contains("GET"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("WRONGTYPE"));
    }

    #[test]
    fn unsupported_kinds_are_distinguishable() {
        let cmd = CommandDescriptor::new("BLPOP");
        let err = BridgeError::NotSupportedInPipeline {
            command: cmd,
            topology: Topology::Standalone,
        };
        assert!(err.is_unsupported());
        assert_eq!(err.command(), Some(cmd));
        assert!(!matches!(err, BridgeError::NotSupported { .. }));
    }
}
