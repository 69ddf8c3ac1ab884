use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripts and agents driving `decycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedNode,
    UnknownStrategy,
    ExternalToolFailed,
    GraphLoadFailed,
    TempStorageFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedNode => "E1001",
            Self::UnknownStrategy => "E2001",
            Self::ExternalToolFailed => "E3001",
            Self::GraphLoadFailed => "E4001",
            Self::TempStorageFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedNode => "Dependency node has no resolvable key",
            Self::UnknownStrategy => "Unknown cycle-breaking strategy",
            Self::ExternalToolFailed => "External tool failed",
            Self::GraphLoadFailed => "Graph edge list could not be loaded",
            Self::TempStorageFailed => "Temporary storage failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedNode => {
                Some("Every record needs a non-empty `key` or `package.key` field.")
            }
            Self::UnknownStrategy => Some(
                "Use one of: dfs, mfas, pagerank, trueskill, socialagony, ensembling, all.",
            ),
            Self::ExternalToolFailed => {
                Some("Check that the tool is installed and on PATH, or pass --input FILE.")
            }
            Self::GraphLoadFailed => {
                Some("Each line must hold exactly two whitespace-separated node ids.")
            }
            Self::TempStorageFailed => Some("Check free space and permissions of the temp dir."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index path from the root list down to one node of a dependency forest.
///
/// `[2, 0]` is the first dependency of the third root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(pub Vec<usize>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "]")
    }
}

/// 1-based line number inside an input file; displays as `:N` or nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineNo(pub Option<usize>);

impl fmt::Display for LineNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, ":{line}"),
            None => Ok(()),
        }
    }
}

/// Errors surfaced by extraction, loading, sources and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DecycleError {
    /// A forest node has neither `package.key` nor `key`.
    #[error("{}: node at {path} has no resolvable key", ErrorCode::MalformedNode.code())]
    MalformedNode {
        /// Position of the offending node.
        path: NodePath,
    },

    /// The requested strategy name is not recognised or not registered.
    #[error("{}: unknown strategy '{name}'", ErrorCode::UnknownStrategy.code())]
    UnknownStrategy {
        /// The name as requested.
        name: String,
    },

    /// An external collaborator failed, timed out, or produced unparsable output.
    #[error("{}: {tool}: {reason}", ErrorCode::ExternalToolFailed.code())]
    ExternalTool {
        /// Program name or input file that failed.
        tool: String,
        /// What went wrong.
        reason: String,
    },

    /// An edge-list file is missing, unreadable, or malformed.
    #[error("{}: {}{line}: {reason}", ErrorCode::GraphLoadFailed.code(), .path.display())]
    GraphLoad {
        /// File being loaded.
        path: PathBuf,
        /// Line the failure is tied to, if any.
        line: LineNo,
        /// What went wrong.
        reason: String,
    },

    /// Scratch-file handling failed.
    #[error("{}: {context}: {source}", ErrorCode::TempStorageFailed.code())]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DecycleError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedNode { .. } => ErrorCode::MalformedNode,
            Self::UnknownStrategy { .. } => ErrorCode::UnknownStrategy,
            Self::ExternalTool { .. } => ErrorCode::ExternalToolFailed,
            Self::GraphLoad { .. } => ErrorCode::GraphLoadFailed,
            Self::Io { .. } => ErrorCode::TempStorageFailed,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    pub(crate) fn external(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::MalformedNode,
            ErrorCode::UnknownStrategy,
            ErrorCode::ExternalToolFailed,
            ErrorCode::GraphLoadFailed,
            ErrorCode::TempStorageFailed,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::GraphLoadFailed.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn malformed_node_display_includes_path() {
        let err = DecycleError::MalformedNode {
            path: NodePath(vec![0, 3, 1]),
        };
        assert_eq!(err.to_string(), "E1001: node at [0, 3, 1] has no resolvable key");
        assert_eq!(err.code(), ErrorCode::MalformedNode);
    }

    #[test]
    fn graph_load_display_includes_file_and_line() {
        let err = DecycleError::GraphLoad {
            path: PathBuf::from("edges.txt"),
            line: LineNo(Some(7)),
            reason: "expected 2 fields, found 3".to_string(),
        };
        assert_eq!(err.to_string(), "E4001: edges.txt:7: expected 2 fields, found 3");

        let missing = DecycleError::GraphLoad {
            path: PathBuf::from("gone.txt"),
            line: LineNo(None),
            reason: "not found".to_string(),
        };
        assert_eq!(missing.to_string(), "E4001: gone.txt: not found");
    }
}
