use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use rela_lang::{
    EvalOptions,
    cli::{self, CliError, OutputFormat, RunOptions, RunResult},
};
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

#[derive(ClapParser)]
#[command(name = "rela")]
#[command(about = "Rela - A relational-algebra script language over typed relations")]
#[command(version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace); RELA_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script against a set of relations
    Run {
        /// JSON file with the initial relations
        #[arg(short, long, env = "RELA_RELATIONS")]
        relations: Option<PathBuf>,

        /// Script file (reads stdin if neither --script nor -e is given)
        #[arg(short, long, conflicts_with = "expr")]
        script: Option<PathBuf>,

        /// Script line; repeat for several lines
        #[arg(short = 'e', long = "expr")]
        expr: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Remove duplicate rows produced by projections
        #[arg(long, env = "RELA_DEDUP_PROJECTION")]
        dedup_projection: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Only print these bindings
        #[arg(long, value_delimiter = ',')]
        show: Vec<String>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'rela docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var("RELA_LOG")
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            relations,
            script,
            expr,
            format,
            pretty,
            dedup_projection,
            syntax_only,
            show,
        } => read_script(script, expr).and_then(|script| {
            let relations = relations.map(fs::read_to_string).transpose()?;
            run(RunOptions {
                script,
                relations,
                format: match format {
                    Format::Json => OutputFormat::Json,
                    Format::Table => OutputFormat::Table,
                },
                pretty,
                syntax_only,
                show,
                eval: EvalOptions { dedup_projection },
            })
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "rela failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_script(script: Option<PathBuf>, expr: Vec<String>) -> Result<Vec<String>, CliError> {
    let text = match script {
        Some(path) => fs::read_to_string(path)?,
        None if !expr.is_empty() => return Ok(expr),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoScript),
    };
    Ok(text.lines().map(str::to_string).collect())
}

fn run(options: RunOptions) -> Result<(), CliError> {
    match cli::execute_run(&options)? {
        RunResult::SyntaxValid(count) => println!("Syntax is valid ({} statements)", count),
        RunResult::Success(env) => println!("{}", cli::render(&env, &options)?),
    }
    Ok(())
}
