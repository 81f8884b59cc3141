//! Exhaustive enumeration of a grammar's strings by leftmost derivation.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::derivation::{Derivation, GeneratedString};
use crate::grammar::Grammar;

/// How successors are placed on the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontierOrder {
    /// Successors go to the front, so the first alternative is followed first
    #[default]
    LeftmostFirst,
    /// Plain FIFO: strings come out in order of derivation length
    BreadthFirst,
}

/// Configuration options for enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of substitutions a derivation may take
    pub max_depth: usize,
    pub order: FrontierOrder,
}

impl EngineConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 10;
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            order: FrontierOrder::default(),
        }
    }
}

/// Lazily enumerates distinct terminal strings of a grammar.
///
/// Each engine owns its frontier and the set of strings it already
/// produced. Create a new engine (or call [`reset`](Self::reset)) to start
/// over.
#[derive(Debug)]
pub struct DerivationEngine<'g> {
    grammar: &'g Grammar,
    config: EngineConfig,
    frontier: VecDeque<Derivation>,
    generated: HashSet<String>,
}

impl<'g> DerivationEngine<'g> {
    pub fn new(grammar: &'g Grammar, max_depth: usize) -> Self {
        Self::with_config(
            grammar,
            EngineConfig {
                max_depth,
                ..EngineConfig::default()
            },
        )
    }

    pub fn with_config(grammar: &'g Grammar, config: EngineConfig) -> Self {
        debug!(
            start = grammar.start_symbol(),
            max_depth = config.max_depth,
            order = ?config.order,
            "new derivation engine"
        );
        let mut engine = DerivationEngine {
            grammar,
            config,
            frontier: VecDeque::new(),
            generated: HashSet::new(),
        };
        engine.reset();
        engine
    }

    /// Forget everything produced so far and reseed the frontier
    pub fn reset(&mut self) {
        self.generated.clear();
        self.frontier.clear();
        self.frontier
            .push_back(Derivation::new(self.grammar.start_symbol()));
    }

    /// The next string not yet produced, or `None` once exhausted
    pub fn next_string(&mut self) -> Option<GeneratedString> {
        while let Some(derivation) = self.frontier.pop_front() {
            if derivation.step_count() > self.config.max_depth {
                trace!(form = %derivation.current(), "depth bound reached, dropping path");
                continue;
            }

            let leftmost = derivation
                .current()
                .leftmost_variable()
                .map(|(index, variable)| (index, variable.to_string()));
            match leftmost {
                Some((index, variable)) => self.expand(&derivation, index, &variable),
                None => {
                    let generated = GeneratedString::from_derivation(derivation);
                    if self.generated.insert(generated.text.clone()) {
                        return Some(generated);
                    }
                    trace!(text = %generated.text, "duplicate string suppressed");
                }
            }
        }

        debug!(count = self.generated.len(), "enumeration exhausted");
        None
    }

    fn expand(&mut self, derivation: &Derivation, index: usize, variable: &str) {
        let grammar = self.grammar;
        let alternatives = grammar.alternatives(variable);
        if alternatives.is_empty() {
            trace!(variable, "no productions, dropping path");
            return;
        }

        let successors = alternatives
            .iter()
            .map(|production| derivation.extended(derivation.current().substitute(index, production)));

        match self.config.order {
            // reversed so the first alternative ends up at the very front
            FrontierOrder::LeftmostFirst => {
                for successor in successors.rev() {
                    self.frontier.push_front(successor);
                }
            }
            FrontierOrder::BreadthFirst => self.frontier.extend(successors),
        }
        trace!(pending = self.frontier.len(), "frontier expanded");
    }

    /// True once the frontier is empty and no further string can appear
    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    /// How many distinct strings have been produced since the last reset
    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }
}

impl Iterator for DerivationEngine<'_> {
    type Item = GeneratedString;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_string()
    }
}
