//! @ai:module:intent CLI entry point for todoscan
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on scan, grammar, config, output

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use todoscan_parser::{
    output, parse_line, scan_paths, Language, LanguageRegistry, OutputFormat, ScanConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todoscan")]
#[command(author, version, about = "Find TODO annotations in source comments")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files and directories for todos
    Scan {
        /// Files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,

        /// TOML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Treat every file as this language (see `todoscan languages`)
        #[arg(long, short)]
        language: Option<String>,

        /// Also scan files with no known language, line by line
        #[arg(long, default_value = "false")]
        plain_text: bool,

        /// Parse every comment, not only those containing the marker
        #[arg(long, default_value = "false")]
        no_prefilter: bool,

        /// Fail with exit code 1 if any todo is found
        #[arg(long, default_value = "false")]
        fail_on_found: bool,
    },

    /// Parse one line and print the annotation it holds
    Line {
        /// The line of text, comment delimiters included
        text: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// List supported file extensions and their languages
    Languages {
        /// TOML configuration file with extra mappings
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
    JsonLines,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
            Format::JsonLines => OutputFormat::JsonLines,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("todoscan={level},todoscan_parser={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> todoscan_parser::Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::load(path),
        None => Ok(ScanConfig::default()),
    }
}

fn emit(text: &str) {
    if text.is_empty() || text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}

fn run_scan(
    paths: &[PathBuf],
    format: Format,
    config: Option<&PathBuf>,
    language: Option<&str>,
    plain_text: bool,
    no_prefilter: bool,
    fail_on_found: bool,
) -> todoscan_parser::Result<ExitCode> {
    let mut config = load_config(config)?;
    if plain_text {
        config.include_plain_text = true;
    }
    if no_prefilter {
        config.prefilter = false;
    }

    let registry = config.registry()?;
    let mut options = config.extract_options();
    options.language = language.map(Language::from_name).transpose()?;

    let report = scan_paths(paths, &registry, &config, &options)?;
    emit(&output::format_report(&report, format.into()));

    if fail_on_found && report.total() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_languages(config: Option<&PathBuf>, format: Format) -> todoscan_parser::Result<ExitCode> {
    let registry: LanguageRegistry = load_config(config)?.registry()?;
    let extensions: BTreeMap<&str, &str> = registry
        .extensions()
        .into_iter()
        .map(|(ext, lang)| (ext, lang.name()))
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Text => {
            for (ext, name) in &extensions {
                println!("{:<12} {}", ext, name);
            }
        }
        OutputFormat::JsonPretty => println!("{}", output::to_json(&extensions, true)),
        OutputFormat::Json | OutputFormat::JsonLines => {
            println!("{}", output::to_json(&extensions, false))
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            paths,
            format,
            config,
            language,
            plain_text,
            no_prefilter,
            fail_on_found,
        } => run_scan(
            &paths,
            format,
            config.as_ref(),
            language.as_deref(),
            plain_text,
            no_prefilter,
            fail_on_found,
        ),

        Commands::Line { text, format } => match parse_line(&text) {
            Some(annotation) => {
                println!("{}", output::format_annotation(&annotation, format.into()));
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("not a todo annotation");
                Ok(ExitCode::from(1))
            }
        },

        Commands::Languages { config, format } => run_languages(config.as_ref(), format),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
