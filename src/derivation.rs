use std::fmt;

use serde::{Serialize, Serializer};

use crate::grammar::{Production, Symbol};

/// An ordered sequence of symbols reachable from the start symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SententialForm(Vec<Symbol>);

impl SententialForm {
    /// The singleton form holding just the start variable
    pub fn start(variable: &str) -> Self {
        SententialForm(vec![Symbol::Variable(variable.to_string())])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position and name of the leftmost variable, if any
    pub fn leftmost_variable(&self) -> Option<(usize, &str)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, symbol)| symbol.is_variable())
            .map(|(index, symbol)| (index, symbol.as_str()))
    }

    /// True when only terminals remain
    pub fn is_terminal(&self) -> bool {
        self.leftmost_variable().is_none()
    }

    /// Replace the symbol at `index` with the production's symbols.
    /// An epsilon production removes it.
    pub fn substitute(&self, index: usize, production: &Production) -> SententialForm {
        let mut symbols = Vec::with_capacity(self.0.len() + production.symbols.len());
        symbols.extend_from_slice(&self.0[..index]);
        symbols.extend(production.symbols.iter().cloned());
        symbols.extend_from_slice(&self.0[index + 1..]);
        SententialForm(symbols)
    }
}

impl fmt::Display for SententialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl Serialize for SententialForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The trace of one derivation path, from the start symbol to the current form
///
/// Never empty: the first form is always the start symbol and the last is
/// the current sentential form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Derivation {
    forms: Vec<SententialForm>,
}

impl Derivation {
    pub fn new(start: &str) -> Self {
        Derivation {
            forms: vec![SententialForm::start(start)],
        }
    }

    pub fn current(&self) -> &SententialForm {
        &self.forms[self.forms.len() - 1]
    }

    pub fn forms(&self) -> &[SententialForm] {
        &self.forms
    }

    /// Number of substitutions applied so far
    pub fn step_count(&self) -> usize {
        self.forms.len() - 1
    }

    pub fn push(&mut self, form: SententialForm) {
        self.forms.push(form);
    }

    /// A copy of this derivation with one more form appended
    pub fn extended(&self, form: SententialForm) -> Derivation {
        let mut next = self.clone();
        next.push(form);
        next
    }

    /// Drop the latest form; the start form is never removed
    pub fn undo(&mut self) -> bool {
        if self.forms.len() > 1 {
            self.forms.pop();
            true
        } else {
            false
        }
    }

    /// Each form rendered as a string
    pub fn trace(&self) -> Vec<String> {
        self.forms.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Derivation {
    /// `S => Aa => ba`, with the empty form shown as `ε`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, form) in self.forms.iter().enumerate() {
            if index > 0 {
                f.write_str(" => ")?;
            }
            if form.is_empty() {
                f.write_str("ε")?;
            } else {
                write!(f, "{}", form)?;
            }
        }
        Ok(())
    }
}

/// A fully terminal string together with how it was derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedString {
    pub text: String,
    pub derivation: Derivation,
}

impl GeneratedString {
    pub(crate) fn from_derivation(derivation: Derivation) -> Self {
        GeneratedString {
            text: derivation.current().to_string(),
            derivation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Symbol {
        Symbol::Variable(name.to_string())
    }

    fn term(name: &str) -> Symbol {
        Symbol::Terminal(name.to_string())
    }

    #[test]
    fn test_substitute_leftmost_only() {
        let form = SententialForm(vec![term("a"), var("S"), var("S")]);
        let (index, name) = form.leftmost_variable().unwrap();
        assert_eq!((index, name), (1, "S"));

        let next = form.substitute(index, &Production::new(vec![term("b"), var("A")]));
        assert_eq!(next.to_string(), "abAS");

        let removed = form.substitute(index, &Production::epsilon());
        assert_eq!(removed.symbols(), &[term("a"), var("S")]);
    }

    #[test]
    fn test_terminal_form() {
        let form = SententialForm(vec![term("a"), term("b")]);
        assert!(form.is_terminal());
        assert!(SententialForm::default().is_terminal());
        assert!(!SententialForm::start("S").is_terminal());
    }

    #[test]
    fn test_derivation_history() {
        let mut derivation = Derivation::new("S");
        assert_eq!(derivation.step_count(), 0);
        assert!(!derivation.undo());

        let extended = derivation.extended(SententialForm(vec![term("a")]));
        assert_eq!(derivation.step_count(), 0);
        assert_eq!(extended.trace(), ["S", "a"]);

        derivation.push(SententialForm::default());
        assert_eq!(derivation.to_string(), "S => ε");
        assert!(derivation.undo());
        assert_eq!(derivation.current(), &SententialForm::start("S"));
    }
}
