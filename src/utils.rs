use std::fmt;
use std::io;
use thiserror::Error;

/// Which declared symbol list an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSet {
    Variables,
    Terminals,
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSet::Variables => write!(f, "variables"),
            SymbolSet::Terminals => write!(f, "terminals"),
        }
    }
}

/// Where an undeclared symbol was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRole {
    /// The start symbol line
    Start,
    /// The left-hand side of a production
    Head,
    /// A symbol inside a right-hand side
    Body,
}

impl fmt::Display for SymbolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolRole::Start => write!(f, "start symbol"),
            SymbolRole::Head => write!(f, "production head"),
            SymbolRole::Body => write!(f, "right-hand side symbol"),
        }
    }
}

/// Custom error types for grammar loading and derivation
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed grammar: {0}")]
    Structure(String),

    #[error("No {set} declared (or an empty entry in the {set} list)")]
    EmptySet { set: SymbolSet },

    #[error("{}", undeclared_message(.symbol, .role, .line))]
    Undeclared {
        symbol: String,
        role: SymbolRole,
        line: Option<usize>,
    },

    #[error("Symbols declared as both variable and terminal: {}", .symbols.join(", "))]
    Collision { symbols: Vec<String> },

    #[error("Line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Invalid selection `{input}`: expected a number between 1 and {count}")]
    InvalidSelection { input: String, count: usize },

    #[error("Variable `{variable}` has no productions")]
    NoAlternatives { variable: String },

    #[error("Derivation did not terminate within {limit} steps")]
    StepLimit { limit: usize },
}

fn undeclared_message(symbol: &str, role: &SymbolRole, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("Line {}: undeclared {} `{}`", line, role, symbol),
        None => format!("Undeclared {} `{}`", role, symbol),
    }
}

/// Coarse classification of a [`GrammarError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Structural,
    EmptySet,
    UndeclaredSymbol,
    SymbolCollision,
    Format,
    InvalidSelection,
    NoAlternatives,
    StepLimit,
}

impl GrammarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrammarError::Io(_) => ErrorKind::Io,
            GrammarError::Structure(_) => ErrorKind::Structural,
            GrammarError::EmptySet { .. } => ErrorKind::EmptySet,
            GrammarError::Undeclared { .. } => ErrorKind::UndeclaredSymbol,
            GrammarError::Collision { .. } => ErrorKind::SymbolCollision,
            GrammarError::Format { .. } => ErrorKind::Format,
            GrammarError::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            GrammarError::NoAlternatives { .. } => ErrorKind::NoAlternatives,
            GrammarError::StepLimit { .. } => ErrorKind::StepLimit,
        }
    }

    /// Source line the error points at, when there is one
    pub fn line(&self) -> Option<usize> {
        match self {
            GrammarError::Undeclared { line, .. } => *line,
            GrammarError::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Trait extension for Option<T> to convert to GrammarError
pub trait OptionExt<T> {
    fn ok_or_structure<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_structure<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::Structure(f()))
    }
}
