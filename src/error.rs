/// Crate-level error types for oas-combine diagnostics.
use std::path::PathBuf;

/// All errors in oas-combine carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, pointer, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as oas_combine::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The project configuration file exists but cannot be parsed.
    #[error("invalid config {}: {source}", path.display())]
    ConfigInvalid {
        /// Path to the malformed config file.
        path: PathBuf,
        /// The wrapped TOML deserialization error.
        source: toml::de::Error,
    },

    /// A node id was used with a tree that did not issue it.
    #[error("node {index} does not belong to this document")]
    DanglingNode {
        /// Arena index carried by the id.
        index: usize,
    },

    /// YAML content does not match the shape the schema catalog declares.
    #[error("cannot parse {}: {reason}", path.display())]
    Deserialize {
        /// File (or stream label) that failed to parse.
        path: PathBuf,
        /// Description of the parse failure, including the offending key path.
        reason: String,
    },

    /// A file or stream could not be read.
    #[error("cannot read {}: {source}", path.display())]
    InputRead {
        /// Path to the unreadable file, or `-` for standard input.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A pointer segment or field name has no matching target.
    #[error("unresolvable location `{selector}`: {reason}")]
    LocationUnresolvable {
        /// Why the location could not be used.
        reason: &'static str,
        /// The field name, map key, or sequence index that failed.
        selector: String,
    },

    /// Serialized output could not be written.
    #[error("cannot write {}: {source}", path.display())]
    OutputWrite {
        /// Path to the output file, or `-` for standard output.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// Remote documents reference each other in a loop.
    #[error("reference cycle detected: {}", chain.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    ReferenceCycle {
        /// Ordered chain of document paths forming the cycle.
        chain: Vec<PathBuf>,
    },

    /// Resolving one specific `$ref` failed.
    #[error("cannot resolve `{reference}` in {}: {source}", document.display())]
    ReferenceResolution {
        /// Document whose reference was being resolved.
        document: PathBuf,
        /// The reference path as written in the document.
        reference: String,
        /// The underlying failure.
        source: Box<Error>,
    },

    /// YAML serialization failed.
    #[error("yaml serialize: {0}")]
    Serialize(
        /// The wrapped YAML serialization error.
        #[from]
        serde_yaml::Error,
    ),

    /// The discovery walk reached a node that is not a record, map, or sequence.
    #[error("unsupported node kind: {kind}")]
    UnsupportedNodeKind {
        /// Name of the node kind that was encountered.
        kind: &'static str,
    },
}

impl Error {
    /// Wrap this error with the reference and document it was raised for.
    pub fn while_resolving(self, reference: &str, document: PathBuf) -> Self {
        return Self::ReferenceResolution {
            document,
            reference: reference.to_string(),
            source: Box::new(self),
        };
    }

    /// Build a `LocationUnresolvable` for a selector rendered with `Display`.
    pub fn unresolvable(selector: impl std::fmt::Display, reason: &'static str) -> Self {
        return Self::LocationUnresolvable {
            reason,
            selector: selector.to_string(),
        };
    }
}
