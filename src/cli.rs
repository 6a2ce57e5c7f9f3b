use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand, ValueEnum};
use glossary_tooltip::{
    AnnotatorConfig, FileSource, GlossaryTerm, MatchStrategy, Vocabulary, VocabularySource,
    annotate_with, suggest_names,
};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "glossary-tooltip",
    about = "Annotate text with glossary tooltips",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace term names in a text with tooltip markup.
    Annotate {
        /// Vocabulary file (.json or .tsv).
        #[arg(long)]
        vocab: PathBuf,
        /// Text file to annotate; reads stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// JSON file with annotator settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Truncate descriptions longer than this many characters.
        #[arg(long)]
        max_length: Option<usize>,
        /// How overlapping term names are resolved.
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Base URL for "Read more" links of terms without their own URL.
        #[arg(long)]
        detail_base_url: Option<String>,
    },
    /// List the terms of a vocabulary.
    Terms {
        /// Vocabulary file (.json or .tsv).
        #[arg(long)]
        vocab: PathBuf,
    },
    /// Show a single term.
    Show {
        /// Vocabulary file (.json or .tsv).
        #[arg(long)]
        vocab: PathBuf,
        /// Exact, case-sensitive term name.
        name: String,
    },
    /// Serve the annotation API and demo page.
    #[cfg(feature = "web")]
    Serve {
        /// Vocabulary file, reloaded on every request.
        #[arg(long)]
        vocab: PathBuf,
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// JSON file with annotator settings.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Longest,
    Ordered,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Longest => MatchStrategy::Longest,
            StrategyArg::Ordered => MatchStrategy::Ordered,
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Annotate {
            vocab,
            input,
            config,
            max_length,
            strategy,
            detail_base_url,
        } => {
            let mut config = load_config(config)?;
            if let Some(max) = max_length {
                config.max_description_length = max;
            }
            if let Some(strategy) = strategy {
                config.strategy = strategy.into();
            }
            if detail_base_url.is_some() {
                config.detail_base_url = detail_base_url;
            }
            handle_annotate(vocab, input, &config, cli.json)
        }
        Command::Terms { vocab } => handle_terms(vocab, cli.json),
        Command::Show { vocab, name } => handle_show(vocab, &name, cli.json),
        #[cfg(feature = "web")]
        Command::Serve {
            vocab,
            addr,
            config,
        } => {
            let web_config = glossary_tooltip::web::WebConfig {
                addr,
                vocabulary: vocab,
                annotator: load_config(config)?,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(glossary_tooltip::web::serve(web_config))?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Result<AnnotatorConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(AnnotatorConfig::from_json_file(path)?),
        None => Ok(AnnotatorConfig::default()),
    }
}

fn load_vocabulary(path: PathBuf) -> Result<Vocabulary, Box<dyn Error>> {
    Ok(FileSource::new(path).load()?)
}

fn handle_annotate(
    vocab: PathBuf,
    input: Option<PathBuf>,
    config: &AnnotatorConfig,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    // A missing vocabulary leaves the text as-is rather than failing the render.
    let vocabulary = match load_vocabulary(vocab) {
        Ok(vocabulary) => vocabulary,
        Err(err) => {
            tracing::warn!(error = %err, "vocabulary unavailable, emitting text unannotated");
            Vocabulary::new()
        }
    };
    let annotated = annotate_with(&vocabulary, &text, config);

    if as_json {
        let payload = json!({
            "strategy": config.strategy.to_string(),
            "max_description_length": config.max_description_length,
            "terms": vocabulary.len(),
            "matches": annotated.matches,
            "text": annotated.text,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", annotated.text);
    }
    Ok(())
}

fn handle_terms(vocab: PathBuf, as_json: bool) -> Result<(), Box<dyn Error>> {
    let vocabulary = load_vocabulary(vocab)?;
    if as_json {
        let payload: Vec<_> = vocabulary.iter().map(term_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_terms_table(&vocabulary);
    }
    Ok(())
}

fn handle_show(vocab: PathBuf, name: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let vocabulary = load_vocabulary(vocab)?;
    let Some(term) = vocabulary.get(name) else {
        let suggestions = suggest_names(&vocabulary, name, 3);
        if suggestions.is_empty() {
            return Err(format!("No term named {name:?}").into());
        }
        return Err(format!(
            "No term named {name:?}. Did you mean: {}?",
            suggestions.join(", ")
        )
        .into());
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&term_to_json(term))?);
    } else {
        println!("Term: {}", term.name);
        if let Some(url) = &term.detail_url {
            println!("Detail URL: {url}");
        }
        render_markdown_block("Description", term.description());
    }
    Ok(())
}

fn term_to_json(term: &GlossaryTerm) -> serde_json::Value {
    json!({
        "name": term.name,
        "description": term.description(),
        "detail_url": term.detail_url,
        "id": term.id,
    })
}

fn print_terms_table(vocabulary: &Vocabulary) {
    if vocabulary.is_empty() {
        println!("Vocabulary is empty.");
        return;
    }
    let width = vocabulary
        .iter()
        .map(|term| term.name.chars().count())
        .max()
        .unwrap_or(4)
        .max("TERM".len());
    println!("{:<width$}  {}", "TERM", "DESCRIPTION", width = width);
    println!("{:-<width$}  {}", "", "-----------", width = width);
    for term in vocabulary {
        println!(
            "{:<width$}  {}",
            term.name,
            preview(term.description(), 60),
            width = width
        );
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match glossary_tooltip::render::truncate_chars(&flat, max_chars) {
        Some(head) => format!("{head}…"),
        None => flat,
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        println!("\n{title}: <none>");
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
