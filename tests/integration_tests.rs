use cfg_gen::{
    ChoiceProvider, DerivationEngine, EngineConfig, ErrorKind, FrontierOrder, Grammar,
    GrammarError, PendingChoice, load_grammar, run_interactive,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;

const ARITHMETIC: &str = r#"
variaveis: E,T
inicial: E

terminais: x,+,(,)
producoes
E: E+T
E: T
T: (E)
T: x
"#;

const OPTIONAL_A: &str = "variaveis: S\ninicial: S\nterminais: a\nproducoes\nS: aS\nS: epsilon\n";

fn kind_of(text: &str) -> ErrorKind {
    load_grammar(text).unwrap_err().kind()
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ARITHMETIC.as_bytes()).unwrap();

    let grammar = Grammar::from_file(file.path()).unwrap();
    assert_eq!(grammar.start_symbol(), "E");
    assert_eq!(grammar.rule_count(), 4);
    assert!(grammar.is_terminal("+"));
    assert!(grammar.is_variable("T"));
}

#[test]
fn test_missing_file() {
    let err = Grammar::from_file("/definitely/not/here.txt").unwrap_err();
    assert!(matches!(err, GrammarError::Io(_)));
}

#[test]
fn test_structural_errors() {
    // too few lines
    assert_eq!(kind_of("variaveis: S\ninicial: S\nterminais: a\nproducoes\n"), ErrorKind::Structural);
    // marker missing
    assert_eq!(
        kind_of("variaveis: S\ninicial: S\nterminais: a\nS: a\nS: b\n"),
        ErrorKind::Structural
    );
    // preamble out of order
    assert_eq!(
        kind_of("inicial: S\nvariaveis: S\nterminais: a\nproducoes\nS: a\n"),
        ErrorKind::Structural
    );
}

#[test]
fn test_empty_variables() {
    assert_eq!(kind_of("variaveis:\ninicial: S\nterminais: a\nproducoes\nS: a\n"), ErrorKind::EmptySet);
    assert_eq!(kind_of("variaveis: S,,A\ninicial: S\nterminais: a\nproducoes\nS: a\n"), ErrorKind::EmptySet);
}

#[test]
fn test_start_not_declared() {
    let err = load_grammar("variaveis: S\ninicial: Q\nterminais: a\nproducoes\nS: a\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
    assert!(err.to_string().contains("start symbol `Q`"));
}

#[test]
fn test_empty_terminals() {
    assert_eq!(kind_of("variaveis: S\ninicial: S\nterminais:  \nproducoes\nS: S\n"), ErrorKind::EmptySet);
}

#[test]
fn test_symbol_collision() {
    let err = load_grammar("variaveis: S,a\ninicial: S\nterminais: a,b\nproducoes\nS: a\n").unwrap_err();
    match err {
        GrammarError::Collision { symbols } => assert_eq!(symbols, vec!["a".to_string()]),
        other => panic!("expected collision, got {other}"),
    }
}

#[test]
fn test_missing_separator() {
    let err = load_grammar("variaveis: S\ninicial: S\nterminais: a\nproducoes\nS: a\nS aS\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.line(), Some(6));
}

#[test]
fn test_undeclared_head() {
    let err = load_grammar("variaveis: S\ninicial: S\nterminais: a\nproducoes\nB: a\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
    assert_eq!(err.line(), Some(5));
}

#[test]
fn test_alternation_rejected() {
    let err = load_grammar("variaveis: S\ninicial: S\nterminais: a,b\nproducoes\nS: a|b\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("one per line"));
}

#[test]
fn test_undeclared_body_symbol() {
    let err = load_grammar("variaveis: S\ninicial: S\nterminais: a\nproducoes\n\nS: ab\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
    assert_eq!(err.line(), Some(6));
}

#[test]
fn test_first_example_grammar() {
    let grammar = load_grammar("variaveis: S,A\ninicial: S\nterminais: a,b\nproducoes\nS: Aa\nA: b\n").unwrap();
    let results: Vec<_> = DerivationEngine::new(&grammar, 10).collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "ba");
    assert_eq!(results[0].derivation.trace(), vec!["S", "Aa", "ba"]);
}

#[test]
fn test_depth_bound_stops_enumeration() {
    let grammar = load_grammar(OPTIONAL_A).unwrap();
    let texts: HashSet<String> = DerivationEngine::new(&grammar, 3).map(|g| g.text).collect();
    let expected: HashSet<String> = ["", "a", "aa"].iter().map(|s| s.to_string()).collect();
    assert_eq!(texts, expected);
}

#[test]
fn test_determinism_and_no_duplicates() {
    let grammar = load_grammar(ARITHMETIC).unwrap();
    for order in [FrontierOrder::LeftmostFirst, FrontierOrder::BreadthFirst] {
        let config = EngineConfig { max_depth: 7, order };
        let first: Vec<String> = DerivationEngine::with_config(&grammar, config.clone())
            .map(|g| g.text)
            .collect();
        let second: Vec<String> = DerivationEngine::with_config(&grammar, config)
            .map(|g| g.text)
            .collect();

        assert_eq!(first, second);
        let distinct: HashSet<&String> = first.iter().collect();
        assert_eq!(distinct.len(), first.len());
        assert!(first.contains(&"x".to_string()));
        assert!(first.contains(&"x+x".to_string()));
    }
}

#[test]
fn test_both_orders_find_the_same_strings() {
    let grammar = load_grammar(ARITHMETIC).unwrap();
    let collect = |order| {
        DerivationEngine::with_config(&grammar, EngineConfig { max_depth: 8, order })
            .map(|g| g.text)
            .collect::<HashSet<String>>()
    };
    assert_eq!(collect(FrontierOrder::LeftmostFirst), collect(FrontierOrder::BreadthFirst));
}

#[test]
fn test_traces_are_consistent() {
    let grammar = load_grammar(ARITHMETIC).unwrap();
    let max_depth = 8;

    for generated in DerivationEngine::new(&grammar, max_depth) {
        let forms = generated.derivation.forms();
        assert_eq!(forms[0].to_string(), "E");
        assert_eq!(forms[forms.len() - 1].to_string(), generated.text);
        assert!(generated.derivation.step_count() <= max_depth);

        for pair in forms.windows(2) {
            let (position, variable) = pair[0].leftmost_variable().unwrap();
            let matched = grammar
                .alternatives(variable)
                .iter()
                .any(|production| pair[0].substitute(position, production) == pair[1]);
            assert!(matched, "{} does not derive {}", pair[0], pair[1]);
        }
    }
}

/// Replays fixed answers and counts rejections
struct Scripted {
    answers: Vec<&'static str>,
    asked: usize,
    rejected: usize,
}

impl ChoiceProvider for Scripted {
    fn select(&mut self, pending: &PendingChoice<'_>) -> cfg_gen::Result<String> {
        assert!(pending.count() > 0);
        let answer = self.answers.get(self.asked).copied().unwrap_or("1");
        self.asked += 1;
        Ok(answer.to_string())
    }

    fn rejected(&mut self, _error: &GrammarError) {
        self.rejected += 1;
    }
}

#[test]
fn test_interactive_validation_loop() {
    let grammar = load_grammar(ARITHMETIC).unwrap();
    let mut provider = Scripted {
        // E -> E+T, bad, E -> T, T -> x, bad, T -> x
        answers: vec!["1", "abc", "2", "2", "5", "2"],
        asked: 0,
        rejected: 0,
    };

    let generated = run_interactive(&grammar, &mut provider).unwrap();
    assert_eq!(generated.text, "x+x");
    assert_eq!(
        generated.derivation.trace(),
        vec!["E", "E+T", "T+T", "x+T", "x+x"]
    );
    assert_eq!(provider.asked, 6);
    assert_eq!(provider.rejected, 2);
}

#[test]
fn test_provider_errors_end_the_walk() {
    let grammar = load_grammar(OPTIONAL_A).unwrap();
    let err = cfg_gen::run_interactive_with(&grammar, |_| {
        Err(GrammarError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "closed",
        )))
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_generated_json() {
    let grammar = load_grammar(OPTIONAL_A).unwrap();
    let config = EngineConfig {
        max_depth: 2,
        order: FrontierOrder::BreadthFirst,
    };
    let generated = DerivationEngine::with_config(&grammar, config).next().unwrap();
    let json = serde_json::to_value(&generated).unwrap();
    assert_eq!(json, serde_json::json!({ "text": "", "derivation": ["S", ""] }));
}
