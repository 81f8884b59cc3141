//! Single-path derivation where an outside party picks each alternative.

use rand::Rng;
use tracing::{debug, trace};

use crate::derivation::{Derivation, GeneratedString, SententialForm};
use crate::grammar::{Grammar, Production};
use crate::utils::{GrammarError, Result};

/// The choice a walker is waiting on
#[derive(Debug, Clone, Copy)]
pub struct PendingChoice<'a> {
    /// Current sentential form
    pub form: &'a SententialForm,
    /// Position of the leftmost variable in `form`
    pub position: usize,
    pub variable: &'a str,
    /// Alternatives for `variable`, in declared order (shown 1-based)
    pub alternatives: &'a [Production],
}

impl PendingChoice<'_> {
    pub fn count(&self) -> usize {
        self.alternatives.len()
    }
}

/// Supplies selections to [`run_interactive`]
pub trait ChoiceProvider {
    /// Return the raw selection text (a 1-based index) for the pending choice
    fn select(&mut self, pending: &PendingChoice<'_>) -> Result<String>;

    /// Called when the previous selection was rejected; the walker then asks again
    fn rejected(&mut self, _error: &GrammarError) {}
}

struct FnChoices<F>(F);

impl<F> ChoiceProvider for FnChoices<F>
where
    F: FnMut(&PendingChoice<'_>) -> Result<String>,
{
    fn select(&mut self, pending: &PendingChoice<'_>) -> Result<String> {
        (self.0)(pending)
    }
}

/// Parse a 1-based selection and return the zero-based index
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    let invalid = || GrammarError::InvalidSelection {
        input: input.trim().to_string(),
        count,
    };
    let choice: usize = input.trim().parse().map_err(|_| invalid())?;
    if choice == 0 || choice > count {
        return Err(invalid());
    }
    Ok(choice - 1)
}

/// Step-by-step leftmost derivation from the start symbol
#[derive(Debug, Clone)]
pub struct InteractiveWalker<'g> {
    grammar: &'g Grammar,
    derivation: Derivation,
}

impl<'g> InteractiveWalker<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        InteractiveWalker {
            grammar,
            derivation: Derivation::new(grammar.start_symbol()),
        }
    }

    /// The leftmost variable awaiting expansion, or `None` when complete
    pub fn pending(&self) -> Option<PendingChoice<'_>> {
        let form = self.derivation.current();
        form.leftmost_variable()
            .map(|(position, variable)| PendingChoice {
                form,
                position,
                variable,
                alternatives: self.grammar.alternatives(variable),
            })
    }

    /// Apply a raw selection. Invalid input leaves the walker unchanged.
    pub fn choose(&mut self, input: &str) -> Result<()> {
        let count = self.pending().map_or(0, |pending| pending.count());
        let index = parse_selection(input, count)?;
        self.apply(index);
        Ok(())
    }

    /// Substitute the zero-based alternative for the leftmost variable
    fn apply(&mut self, index: usize) {
        let grammar = self.grammar;
        let current = self.derivation.current();
        if let Some((position, variable)) = current.leftmost_variable() {
            let production = &grammar.alternatives(variable)[index];
            let next = current.substitute(position, production);
            trace!(variable, production = %production, form = %next, "applied production");
            self.derivation.push(next);
        }
    }

    /// Step back one substitution; false at the start symbol
    pub fn undo(&mut self) -> bool {
        self.derivation.undo()
    }

    pub fn is_complete(&self) -> bool {
        self.derivation.current().is_terminal()
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// The produced string, once no variable remains
    pub fn finish(self) -> Option<GeneratedString> {
        if self.is_complete() {
            Some(GeneratedString::from_derivation(self.derivation))
        } else {
            None
        }
    }
}

/// Derive one string, asking `provider` for every choice.
///
/// Invalid selections are reported through [`ChoiceProvider::rejected`] and
/// asked again. Errors from the provider itself end the walk.
pub fn run_interactive<P>(grammar: &Grammar, provider: &mut P) -> Result<GeneratedString>
where
    P: ChoiceProvider + ?Sized,
{
    let mut walker = InteractiveWalker::new(grammar);

    while let Some(pending) = walker.pending() {
        if pending.alternatives.is_empty() {
            return Err(GrammarError::NoAlternatives {
                variable: pending.variable.to_string(),
            });
        }
        let input = provider.select(&pending)?;
        match walker.choose(&input) {
            Ok(()) => {}
            Err(err @ GrammarError::InvalidSelection { .. }) => {
                debug!(%err, "selection rejected");
                provider.rejected(&err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(GeneratedString::from_derivation(walker.derivation))
}

/// [`run_interactive`] with a closure as the provider
pub fn run_interactive_with<F>(grammar: &Grammar, select: F) -> Result<GeneratedString>
where
    F: FnMut(&PendingChoice<'_>) -> Result<String>,
{
    run_interactive(grammar, &mut FnChoices(select))
}

/// Derive one string choosing every alternative uniformly at random.
///
/// Fails with [`GrammarError::StepLimit`] if the string needs more than
/// `max_steps` substitutions.
pub fn random_derivation<R>(grammar: &Grammar, rng: &mut R, max_steps: usize) -> Result<GeneratedString>
where
    R: Rng,
{
    let mut walker = InteractiveWalker::new(grammar);

    while let Some(pending) = walker.pending() {
        if pending.alternatives.is_empty() {
            return Err(GrammarError::NoAlternatives {
                variable: pending.variable.to_string(),
            });
        }
        if walker.derivation.step_count() >= max_steps {
            return Err(GrammarError::StepLimit { limit: max_steps });
        }
        let index = rng.gen_range(0..pending.count());
        walker.apply(index);
    }

    Ok(GeneratedString::from_derivation(walker.derivation))
}
