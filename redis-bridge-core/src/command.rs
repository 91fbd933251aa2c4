//! Command descriptors and reified driver calls

use bytes::Bytes;
use std::fmt;

/// Driver-agnostic identifier of a logical operation
///
/// Used for error reporting and support declarations only; it never reaches
/// the wire. Identity is value-based: two descriptors with equal name and
/// sub-command are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandDescriptor {
    name: &'static str,
    sub: Option<&'static str>,
}

impl CommandDescriptor {
    /// Create a descriptor for a plain command
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, sub: None }
    }

    /// Create a descriptor for a command with a sub-command
    #[must_use]
    pub const fn with_sub(name: &'static str, sub: &'static str) -> Self {
        Self {
            name,
            sub: Some(sub),
        }
    }

    /// Command name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Optional sub-command
    #[must_use]
    pub const fn sub(&self) -> Option<&'static str> {
        self.sub
    }
}

impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub {
            Some(sub) => write!(f, "{} {}", self.name, sub),
            None => f.write_str(self.name),
        }
    }
}

/// One reified driver call: command name plus raw arguments
///
/// Built by operations groups and handed to the configured driver. Arguments
/// are kept as [`Bytes`] so binary-safe keys and values survive untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    name: &'static str,
    args: Vec<Bytes>,
}

impl CommandFrame {
    /// Start a frame for the given command name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append one raw argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Vec<u8>>) -> Self {
        self.args.push(Bytes::from(arg.into()));
        self
    }

    /// Append an integer argument in its textual form
    #[must_use]
    pub fn arg_int(self, arg: i64) -> Self {
        self.arg(arg.to_string())
    }

    /// Append a float argument in its textual form
    #[must_use]
    pub fn arg_float(self, arg: f64) -> Self {
        self.arg(arg.to_string())
    }

    /// Append every item of an iterator as raw arguments
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        for arg in args {
            self.args.push(Bytes::from(arg.into()));
        }
        self
    }

    /// Command name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw arguments in order
    #[must_use]
    pub fn arg_slice(&self) -> &[Bytes] {
        &self.args
    }

    /// Argument at `index`, as UTF-8 text
    #[must_use]
    pub fn arg_text(&self, index: usize) -> Option<String> {
        self.args
            .get(index)
            .map(|a| String::from_utf8_lossy(a).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_display_includes_sub_command() {
        assert_eq!(CommandDescriptor::new("GET").to_string(), "GET");
        assert_eq!(
            CommandDescriptor::with_sub("SCRIPT", "LOAD").to_string(),
            "SCRIPT LOAD"
        );
    }

    #[test]
    fn descriptor_identity_is_value_based() {
        let a = CommandDescriptor::with_sub("CLUSTER", "INFO");
        let b = CommandDescriptor::with_sub("CLUSTER", "INFO");
        assert_eq!(a, b);
        assert_ne!(a, CommandDescriptor::new("CLUSTER"));
    }

    #[test]
    fn frame_collects_mixed_arguments() {
        let frame = CommandFrame::new("SET")
            .arg("key")
            .arg(b"binary\x00value".to_vec())
            .arg_int(42);
        assert_eq!(frame.name(), "SET");
        assert_eq!(frame.arg_slice().len(), 3);
        assert_eq!(frame.arg_text(2).as_deref(), Some("42"));
    }
}
