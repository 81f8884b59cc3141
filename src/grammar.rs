use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::utils::{GrammarError, OptionExt, Result, SymbolRole, SymbolSet};

/// Right-hand side token for the empty production
pub const EPSILON: &str = "epsilon";

const VARIABLE_LABELS: &[&str] = &["variaveis", "variáveis", "variables"];
const START_LABELS: &[&str] = &["inicial", "start"];
const TERMINAL_LABELS: &[&str] = &["terminais", "terminals"];

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^:\s]+)\s*:(.*)$").expect("header pattern is valid")
});

static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(producoes|produções|productions)\s*:?\s*$")
        .expect("marker pattern is valid")
});

/// A grammar symbol, either a variable (non-terminal) or a terminal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    /// A symbol that is expanded by productions
    Variable(String),
    /// A symbol that appears in generated strings
    Terminal(String),
}

impl Symbol {
    pub fn as_str(&self) -> &str {
        match self {
            Symbol::Variable(name) | Symbol::Terminal(name) => name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Symbol::Variable(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alternative of a variable. An empty symbol list is the epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Production {
    /// The sequence of symbols this alternative rewrites to
    pub symbols: Vec<Symbol>,
}

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Production { symbols }
    }

    pub fn epsilon() -> Self {
        Production::default()
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_epsilon() {
            return f.write_str(EPSILON);
        }
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// A validated context-free grammar
///
/// Built once by [`Grammar::parse`], [`Grammar::from_file`] or
/// [`GrammarBuilder`], and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grammar {
    variables: Vec<String>,
    terminals: Vec<String>,
    start: String,
    productions: HashMap<String, Vec<Production>>,
}

impl Grammar {
    /// Parse and validate a grammar description.
    ///
    /// The expected layout is:
    ///
    /// ```text
    /// variaveis: S,A
    /// inicial: S
    /// terminais: a,b
    /// producoes
    /// S: aA
    /// A: b
    /// A: epsilon
    /// ```
    ///
    /// Validation stops at the first violated rule.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, line))
            .collect();

        if lines.len() < 5 {
            return Err(GrammarError::Structure(format!(
                "expected variables, start and terminals lines, a productions marker \
                 and at least one production, found {} non-blank lines",
                lines.len()
            )));
        }

        let variables = header_value(lines[0], VARIABLE_LABELS)?;
        let start = header_value(lines[1], START_LABELS)?;
        let terminals = header_value(lines[2], TERMINAL_LABELS)?;
        let (marker_line, marker) = lines[3];
        if !MARKER_REGEX.is_match(marker) {
            return Err(GrammarError::Structure(format!(
                "line {}: expected the `producoes` marker",
                marker_line
            )));
        }

        let mut grammar = Grammar::declare(
            split_symbols(variables),
            start.trim(),
            split_symbols(terminals),
            Some(lines[1].0),
        )?;

        for &(number, line) in &lines[4..] {
            let (head, body) = split_production(number, line)?;
            grammar.add_production(number, head, body)?;
        }

        debug!(
            variables = grammar.variables.len(),
            terminals = grammar.terminals.len(),
            productions = grammar.rule_count(),
            "loaded grammar"
        );
        Ok(grammar)
    }

    /// Read and parse a grammar description from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "reading grammar file");
        Self::parse(&text)
    }

    /// Checks the declared sets (non-empty, start declared, disjoint)
    fn declare(
        variables: Option<Vec<String>>,
        start: &str,
        terminals: Option<Vec<String>>,
        start_line: Option<usize>,
    ) -> Result<Self> {
        let variables = variables.ok_or(GrammarError::EmptySet {
            set: SymbolSet::Variables,
        })?;

        if !variables.iter().any(|v| v == start) {
            return Err(GrammarError::Undeclared {
                symbol: start.to_string(),
                role: SymbolRole::Start,
                line: start_line,
            });
        }

        let terminals = terminals.ok_or(GrammarError::EmptySet {
            set: SymbolSet::Terminals,
        })?;

        let overlap: Vec<String> = variables
            .iter()
            .filter(|v| terminals.contains(v))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(GrammarError::Collision { symbols: overlap });
        }

        Ok(Grammar {
            variables,
            terminals,
            start: start.to_string(),
            productions: HashMap::new(),
        })
    }

    /// Validate one `head: body` pair and append it to the head's alternatives
    fn add_production(&mut self, line: usize, head: &str, body: &str) -> Result<()> {
        if !self.is_variable(head) {
            return Err(GrammarError::Undeclared {
                symbol: head.to_string(),
                role: SymbolRole::Head,
                line: Some(line),
            });
        }

        if body.contains('|') {
            return Err(GrammarError::Format {
                line,
                reason: "alternatives must be written one per line".to_string(),
            });
        }

        let production = if body == EPSILON {
            Production::epsilon()
        } else {
            let symbols = self.tokenize(body).map_err(|symbol| GrammarError::Undeclared {
                symbol,
                role: SymbolRole::Body,
                line: Some(line),
            })?;
            Production::new(symbols)
        };

        self.productions
            .entry(head.to_string())
            .or_default()
            .push(production);
        Ok(())
    }

    /// Split a right-hand side into declared symbols, longest match first.
    ///
    /// On failure returns the first character no declared symbol starts with.
    fn tokenize(&self, body: &str) -> std::result::Result<Vec<Symbol>, String> {
        let mut symbols = Vec::new();
        let mut rest = body;

        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            let symbol = self.longest_symbol(rest).ok_or_else(|| c.to_string())?;
            rest = &rest[symbol.as_str().len()..];
            symbols.push(symbol);
        }

        Ok(symbols)
    }

    fn longest_symbol(&self, input: &str) -> Option<Symbol> {
        let variables = self.variables.iter().map(|v| (v, true));
        let terminals = self.terminals.iter().map(|t| (t, false));
        variables
            .chain(terminals)
            .filter(|(name, _)| input.starts_with(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, is_variable)| {
                if is_variable {
                    Symbol::Variable(name.clone())
                } else {
                    Symbol::Terminal(name.clone())
                }
            })
    }

    /// The ordered alternatives of a variable; empty if it has none
    pub fn alternatives(&self, variable: &str) -> &[Production] {
        self.productions
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if the grammar declares a specific variable
    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Check if the grammar declares a specific terminal
    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.iter().any(|t| t == name)
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    /// Get the start symbol
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Get a reference to the grammar's productions, keyed by variable
    pub fn rules(&self) -> &HashMap<String, Vec<Production>> {
        &self.productions
    }

    /// Total number of alternatives across all variables
    pub fn rule_count(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }
}

impl fmt::Display for Grammar {
    /// Renders the grammar back into the description format
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "variaveis: {}", self.variables.join(","))?;
        writeln!(f, "inicial: {}", self.start)?;
        writeln!(f, "terminais: {}", self.terminals.join(","))?;
        writeln!(f, "producoes")?;
        for variable in &self.variables {
            for production in self.alternatives(variable) {
                writeln!(f, "{}: {}", variable, production)?;
            }
        }
        Ok(())
    }
}

fn header_value<'a>((number, line): (usize, &'a str), labels: &[&str]) -> Result<&'a str> {
    let captures = HEADER_REGEX.captures(line).ok_or_structure(|| {
        format!("line {}: expected `{}: ...`", number, labels[0])
    })?;
    let label = captures.get(1).map_or("", |m| m.as_str()).to_lowercase();
    if !labels.contains(&label.as_str()) {
        return Err(GrammarError::Structure(format!(
            "line {}: expected `{}: ...`, found `{}:`",
            number, labels[0], label
        )));
    }
    Ok(captures.get(2).map_or("", |m| m.as_str()))
}

/// Comma separated symbols; `None` when the list or any entry is empty
fn split_symbols(value: &str) -> Option<Vec<String>> {
    if value.trim().is_empty() {
        return None;
    }
    let mut symbols: Vec<String> = Vec::new();
    for symbol in value.split(',').map(str::trim) {
        if symbol.is_empty() {
            return None;
        }
        if !symbols.iter().any(|s| s == symbol) {
            symbols.push(symbol.to_string());
        }
    }
    Some(symbols)
}

fn split_production(line: usize, text: &str) -> Result<(&str, &str)> {
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(head), Some(body), None) => {
            let body = body.trim();
            if body.is_empty() {
                return Err(GrammarError::Format {
                    line,
                    reason: format!("empty right-hand side, write `{}` instead", EPSILON),
                });
            }
            Ok((head.trim(), body))
        }
        _ => Err(GrammarError::Format {
            line,
            reason: "expected `<variable>: <right-hand side>`".to_string(),
        }),
    }
}

/// Builder for constructing Grammar instances in code
///
/// `build` applies the same validation as [`Grammar::parse`]; rule `n`
/// (1-based, in insertion order) is reported as line `n`.
pub struct GrammarBuilder {
    start: String,
    variables: Vec<String>,
    terminals: Vec<String>,
    rules: Vec<(String, String)>,
}

impl GrammarBuilder {
    /// Create a new grammar builder with the given start symbol
    pub fn new(start: &str) -> Self {
        GrammarBuilder {
            start: start.to_string(),
            variables: Vec::new(),
            terminals: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn variables(mut self, variables: &[&str]) -> Self {
        self.variables.extend(variables.iter().map(|v| v.to_string()));
        self
    }

    pub fn terminals(mut self, terminals: &[&str]) -> Self {
        self.terminals.extend(terminals.iter().map(|t| t.to_string()));
        self
    }

    /// Add one alternative, written the way it would appear after `head:`
    pub fn add_rule(mut self, head: &str, body: &str) -> Self {
        self.rules.push((head.to_string(), body.to_string()));
        self
    }

    /// Validate and build the grammar
    pub fn build(self) -> Result<Grammar> {
        let variables = non_empty(self.variables);
        let terminals = non_empty(self.terminals);
        let mut grammar = Grammar::declare(variables, &self.start, terminals, None)?;
        for (index, (head, body)) in self.rules.iter().enumerate() {
            let body = body.trim();
            if body.is_empty() {
                return Err(GrammarError::Format {
                    line: index + 1,
                    reason: format!("empty right-hand side, write `{}` instead", EPSILON),
                });
            }
            grammar.add_production(index + 1, head.trim(), body)?;
        }
        Ok(grammar)
    }
}

fn non_empty(symbols: Vec<String>) -> Option<Vec<String>> {
    let trimmed: Vec<String> = symbols.iter().map(|s| s.trim().to_string()).collect();
    if trimmed.is_empty() || trimmed.iter().any(String::is_empty) {
        None
    } else {
        Some(trimmed)
    }
}
