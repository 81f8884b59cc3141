use cfg_gen::{
    DerivationEngine, EngineConfig, FrontierOrder, GrammarBuilder, random_derivation,
    run_interactive_with,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;

/// Builds a grammar in code and drives it through each derivation mode
fn main() -> Result<(), Box<dyn Error>> {
    // Example 1: balanced parentheses, enumerated shortest first
    let parens = GrammarBuilder::new("S")
        .variables(&["S"])
        .terminals(&["(", ")"])
        .add_rule("S", "(S)S")
        .add_rule("S", "epsilon")
        .build()?;

    let config = EngineConfig {
        max_depth: 8,
        order: FrontierOrder::BreadthFirst,
    };
    println!("Balanced parentheses:");
    for (i, generated) in DerivationEngine::with_config(&parens, config).enumerate() {
        println!("{}. \"{}\"  [{}]", i + 1, generated.text, generated.derivation);
    }

    // Example 2: multi-character variables, always taking the last alternative
    let sentence = GrammarBuilder::new("Sentence")
        .variables(&["Sentence", "Noun", "Verb"])
        .terminals(&["fox", "dog", "runs", "sleeps"])
        .add_rule("Sentence", "Noun Verb")
        .add_rule("Noun", "fox")
        .add_rule("Noun", "dog")
        .add_rule("Verb", "runs")
        .add_rule("Verb", "sleeps")
        .build()?;

    let generated = run_interactive_with(&sentence, |pending| Ok(pending.count().to_string()))?;
    println!("\nLast alternatives everywhere: {}", generated.derivation);

    // Example 3: random walks with a fixed seed
    let mut rng = StdRng::seed_from_u64(42);
    println!("\nRandom walks:");
    for i in 1..=5 {
        let generated = random_derivation(&parens, &mut rng, 12)?;
        println!("{}. \"{}\"", i, generated.text);
    }

    Ok(())
}
