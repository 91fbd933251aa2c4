//! Per-connection execution context

use std::fmt;

/// Execution context a connection is currently in
///
/// Exactly one mode is active at a time; transitions are caller-driven via
/// the session's lifecycle calls and always cycle back to [`ExecMode::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Commands execute immediately and return realized results
    #[default]
    Normal,
    /// Commands are buffered and resolved by `sync`
    Pipeline,
    /// Commands are buffered and resolved by `commit`
    Transaction,
}

impl ExecMode {
    /// Check if commands are currently evaluated immediately
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if a pipeline is open
    #[must_use]
    pub const fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline)
    }

    /// Check if a transaction is open
    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction)
    }

    /// Check if results are deferred until a later flush
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        !self.is_normal()
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Pipeline => "pipeline",
            Self::Transaction => "transaction",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_predicate_holds_per_mode() {
        for (mode, normal, pipeline, transaction) in [
            (ExecMode::Normal, true, false, false),
            (ExecMode::Pipeline, false, true, false),
            (ExecMode::Transaction, false, false, true),
        ] {
            assert_eq!(mode.is_normal(), normal);
            assert_eq!(mode.is_pipeline(), pipeline);
            assert_eq!(mode.is_transaction(), transaction);
            assert_eq!(mode.is_deferred(), !normal);
        }
    }
}
