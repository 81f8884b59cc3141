use cfg_gen::{
    ChoiceProvider, DerivationEngine, EngineConfig, FrontierOrder, GeneratedString, Grammar,
    GrammarError, PendingChoice, random_derivation, run_interactive,
};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{Level, info};

/// Context-free grammar string generator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the grammar file
    #[arg(help = "Path to the grammar file")]
    grammar_file: Option<PathBuf>,

    /// Run one mode directly instead of the menu
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Number of strings to print in fast and random modes
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,

    /// Maximum derivation steps per string
    #[arg(short = 'd', long, default_value_t = EngineConfig::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Frontier order used by fast mode
    #[arg(long, value_enum, default_value_t = Order::Leftmost)]
    order: Order,

    /// Output format for generated strings
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Seed for random mode
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example grammar file
    Example {
        /// Kind of grammar to write
        #[arg(help = "Kind of grammar (palindrome, parens)", default_value = "palindrome")]
        grammar_type: String,

        /// Output file path
        #[arg(help = "Output file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Enumerate distinct strings
    Fast,
    /// Choose every production by hand
    Detailed,
    /// Choose productions at random
    Random,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Leftmost,
    Breadth,
}

impl From<Order> for FrontierOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Leftmost => FrontierOrder::LeftmostFirst,
            Order::Breadth => FrontierOrder::BreadthFirst,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

const PALINDROME_GRAMMAR: &str = "\
variaveis: S
inicial: S
terminais: a,b
producoes
S: aSa
S: bSb
S: a
S: b
S: epsilon
";

const PARENS_GRAMMAR: &str = "\
variaveis: S
inicial: S
terminais: (,)
producoes
S: (S)S
S: epsilon
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();

    if let Some(Commands::Example {
        grammar_type,
        output,
    }) = &cli.command
    {
        let output_path = output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("example_{}_grammar.txt", grammar_type))
        });

        let text = match grammar_type.as_str() {
            "palindrome" => PALINDROME_GRAMMAR,
            "parens" => PARENS_GRAMMAR,
            _ => {
                return Err(format!("Unknown grammar type: {}", grammar_type).into());
            }
        };
        fs::write(&output_path, text)?;

        println!(
            "Created example {} grammar at: {}",
            grammar_type,
            output_path.display()
        );
        return Ok(());
    }

    let grammar_file = cli.grammar_file.clone().ok_or("Grammar file path required")?;
    info!(path = %grammar_file.display(), "loading grammar");
    let grammar = Grammar::from_file(&grammar_file)?;
    println!(
        "Loaded {} productions for {} variables.",
        grammar.rule_count(),
        grammar.variables().len()
    );

    let mut session = Session::new(&grammar, &cli);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    match cli.mode {
        Some(Mode::Fast) => {
            let mut engine = DerivationEngine::with_config(&grammar, session.config.clone());
            for _ in 0..cli.count {
                match engine.next_string() {
                    Some(generated) => session.print(&generated)?,
                    None => {
                        session.report_exhausted();
                        break;
                    }
                }
            }
        }
        Some(Mode::Detailed) => session.detailed(&mut input)?,
        Some(Mode::Random) => {
            for _ in 0..cli.count {
                session.random()?;
            }
        }
        None => session.menu(&mut input)?,
    }

    Ok(())
}

/// One run of the program against a loaded grammar
struct Session<'g> {
    grammar: &'g Grammar,
    config: EngineConfig,
    format: OutputFormat,
    rng: StdRng,
    /// Live only while fast mode is selected repeatedly
    engine: Option<DerivationEngine<'g>>,
}

impl<'g> Session<'g> {
    fn new(grammar: &'g Grammar, cli: &Cli) -> Self {
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Session {
            grammar,
            config: EngineConfig {
                max_depth: cli.max_depth,
                order: cli.order.into(),
            },
            format: cli.format,
            rng,
            engine: None,
        }
    }

    fn menu<R: BufRead>(&mut self, input: &mut R) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            println!("\nChoose a generation mode:");
            println!("1. Fast mode");
            println!("2. Detailed mode");
            println!("3. Random mode");
            println!("4. Quit");
            print!("Option: ");
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }

            match line.trim() {
                "1" => self.fast()?,
                "2" => {
                    self.engine = None;
                    self.detailed(input)?;
                }
                "3" => {
                    self.engine = None;
                    if let Err(err) = self.random() {
                        println!("{}", err);
                    }
                }
                "4" => return Ok(()),
                other => println!("Invalid option `{}`, try again.", other),
            }
        }
    }

    fn fast(&mut self) -> io::Result<()> {
        let grammar = self.grammar;
        let config = &self.config;
        let engine = self
            .engine
            .get_or_insert_with(|| DerivationEngine::with_config(grammar, config.clone()));
        match engine.next_string() {
            Some(generated) => self.print(&generated),
            None => {
                self.report_exhausted();
                Ok(())
            }
        }
    }

    fn detailed<R: BufRead>(&mut self, input: &mut R) -> Result<(), Box<dyn std::error::Error>> {
        let mut console = Console {
            input,
            output: io::stdout(),
        };
        let generated = run_interactive(self.grammar, &mut console)?;
        self.print(&generated)?;
        Ok(())
    }

    fn random(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let generated = random_derivation(self.grammar, &mut self.rng, self.config.max_depth)?;
        self.print(&generated)?;
        Ok(())
    }

    fn print(&self, generated: &GeneratedString) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("Generated string: \"{}\"", generated.text);
                println!("Derivation: {}", generated.derivation);
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(generated).map_err(io::Error::other)?;
                println!("{}", line);
            }
        }
        Ok(())
    }

    fn report_exhausted(&self) {
        println!(
            "All strings within {} derivation steps have been generated.",
            self.config.max_depth
        );
    }
}

/// Reads selections from the terminal
struct Console<'a, R> {
    input: &'a mut R,
    output: io::Stdout,
}

impl<R: BufRead> ChoiceProvider for Console<'_, R> {
    fn select(&mut self, pending: &PendingChoice<'_>) -> cfg_gen::Result<String> {
        writeln!(self.output, "\nCurrent form: {}", pending.form)?;
        for (index, production) in pending.alternatives.iter().enumerate() {
            writeln!(self.output, "  {}. {} -> {}", index + 1, pending.variable, production)?;
        }
        write!(self.output, "Choose a production for {}: ", pending.variable)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GrammarError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed during derivation",
            )));
        }
        Ok(line)
    }

    fn rejected(&mut self, error: &GrammarError) {
        let _ = writeln!(self.output, "{}. Try again.", error);
    }
}
