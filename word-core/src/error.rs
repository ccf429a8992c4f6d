use std::fmt;

/// A single recoverable compile-time failure, tied to the source line it was
/// raised against. All variants are collected by the driver and never abort
/// compilation on their own; `Display` renders the line-prefixed message the
/// driver appends to its composite error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax {
        line: String,
    },
    UnknownMnemonic {
        mnemonic: String,
    },
    InvalidOperands {
        mnemonic: String,
        tuple: String,
    },
    IntegerRange {
        text: String,
    },
    UndefinedRegisterOrPort {
        text: String,
    },
    IllegalIdentifier {
        name: String,
    },
    DuplicateLabel {
        name: String,
    },
    DuplicateMacro {
        name: String,
    },
    DirectiveArity {
        directive: String,
        expected: usize,
        got: usize,
    },
    UnknownDirective {
        directive: String,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax { line } => write!(f, "syntax error: `{line}`"),
            ErrorKind::UnknownMnemonic { mnemonic } => {
                write!(f, "unknown mnemonic `{mnemonic}`")
            }
            ErrorKind::InvalidOperands { mnemonic, tuple } => {
                write!(f, "invalid operand combination for `{mnemonic}`: {tuple}")
            }
            ErrorKind::IntegerRange { text } => {
                write!(f, "`{text}` does not fit in a signed 32-bit integer")
            }
            ErrorKind::UndefinedRegisterOrPort { text } => {
                write!(f, "`{text}` is not a defined register or port")
            }
            ErrorKind::IllegalIdentifier { name } => {
                write!(f, "`{name}` is not a legal identifier here")
            }
            ErrorKind::DuplicateLabel { name } => {
                write!(f, "label `{name}` is already defined")
            }
            ErrorKind::DuplicateMacro { name } => {
                write!(f, "`{name}` is already defined")
            }
            ErrorKind::DirectiveArity {
                directive,
                expected,
                got,
            } => write!(
                f,
                "`{directive}` expects {expected} argument(s), got {got}"
            ),
            ErrorKind::UnknownDirective { directive } => {
                write!(f, "unknown directive `#{directive}`")
            }
        }
    }
}

/// A line-tagged error, formatted the way the driver's composite message
/// expects: `Error: <line>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub kind: ErrorKind,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}: {}", self.line, self.kind)
    }
}
