//! Cfg-Gen derives strings from context-free grammars.
//!
//! A grammar description is parsed and validated into a [`Grammar`]. Strings
//! can then be enumerated exhaustively with a [`DerivationEngine`], or derived
//! one step at a time with an [`InteractiveWalker`] where the caller picks
//! every alternative. Every derivation is leftmost.
//!
//! # Example
//!
//! ```rust
//! use cfg_gen::{DerivationEngine, Grammar};
//!
//! let grammar = Grammar::parse(
//!     "variaveis: S,A\ninicial: S\nterminais: a,b\nproducoes\nS: Aa\nA: b\n",
//! )
//! .unwrap();
//!
//! let mut engine = DerivationEngine::new(&grammar, 10);
//! let generated = engine.next_string().unwrap();
//! assert_eq!(generated.text, "ba");
//! assert_eq!(generated.derivation.trace(), ["S", "Aa", "ba"]);
//! assert!(engine.next_string().is_none());
//! ```

pub mod derivation;
pub mod engine;
pub mod grammar;
pub mod utils;
pub mod walker;

pub use derivation::{Derivation, GeneratedString, SententialForm};
pub use engine::{DerivationEngine, EngineConfig, FrontierOrder};
pub use grammar::{EPSILON, Grammar, GrammarBuilder, Production, Symbol};
pub use utils::{ErrorKind, GrammarError, Result};
pub use walker::{
    ChoiceProvider, InteractiveWalker, PendingChoice, parse_selection, random_derivation,
    run_interactive, run_interactive_with,
};

/// Parse and validate a grammar description
pub fn load_grammar(text: &str) -> Result<Grammar> {
    Grammar::parse(text)
}
