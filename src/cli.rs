//! Command-line interface components.

use crate::config::Config;
use crate::constants::{
    DEFAULT_DATA_DIR_NAME, DEFAULT_DELIMITER, DEFAULT_INPUT_FILE_NAME, DEFAULT_QUOTE,
};
use crate::pipeline::{self, PipelineOutcome};
use crate::statistics::{Question, Statistics};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "tree-census")]
#[command(about = "Repair, classify and query an urban tree register")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the register file (defaults to the user data directory)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Field delimiter
    #[arg(short = 'd', long, default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Quoting character
    #[arg(long, default_value_t = DEFAULT_QUOTE)]
    pub quote: char,

    /// Year the register was recorded
    #[arg(long, value_name = "YEAR")]
    pub reference_year: Option<i32>,

    /// Answer a question by number and exit (repeatable)
    #[arg(long = "question", value_name = "N")]
    pub questions: Vec<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars are hidden in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Register path, defaulting to `<data dir>/tree-census/trees.csv`
    pub fn input_path(&self) -> Result<PathBuf> {
        match &self.input {
            Some(path) => Ok(path.clone()),
            None => {
                let data_dir =
                    dirs::data_dir().context("Could not determine user data directory")?;
                Ok(data_dir
                    .join(DEFAULT_DATA_DIR_NAME)
                    .join(DEFAULT_INPUT_FILE_NAME))
            }
        }
    }

    pub fn to_config(&self) -> Config {
        let mut config = Config::default()
            .with_delimiter(self.delimiter)
            .with_quote(self.quote);
        if let Some(year) = self.reference_year {
            config = config.with_reference_year(year);
        }
        if self.show_progress() {
            config = config.with_progress();
        }
        config
    }
}

/// Set up structured logging to stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tree_census={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run the command described by `args`
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;

    let path = args.input_path()?;
    let config = args.to_config();

    if !args.quiet {
        println!("{}", "Starting tree register processing".bright_green().bold());
        println!("  {} {}", "Register:".bright_cyan(), path.display());
    }

    let outcome = pipeline::run(&path, &config)
        .with_context(|| format!("Failed to process register {}", path.display()))?;

    if !args.quiet {
        print_summary(&path, &outcome);
    }

    let statistics = outcome.statistics();
    let stdout = io::stdout();

    if args.questions.is_empty() {
        let stdin = io::stdin();
        run_menu(&statistics, stdin.lock(), stdout.lock())?;
    } else {
        let mut out = stdout.lock();
        for selection in &args.questions {
            writeln!(out, "{}", answer_selection(&statistics, selection))?;
        }
    }

    Ok(())
}

fn print_summary(path: &Path, outcome: &PipelineOutcome) {
    println!("\n{}", "Reading Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        outcome.load_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Lines read:".bright_cyan(),
        outcome.load.lines_read.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Trees created:".bright_cyan(),
        outcome.load.records_built.to_string().bright_white().bold()
    );
    if outcome.load.records_skipped > 0 {
        println!(
            "  {} {}",
            "Lines skipped:".bright_red(),
            outcome.load.records_skipped.to_string().bright_red().bold()
        );
    }
    if outcome.load.truncated {
        println!(
            "  {} {}",
            "Line limit reached in".bright_red(),
            path.display()
        );
    }

    println!("\n{}", "Repair Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        outcome.repair_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Corrupt trees:".bright_cyan(),
        outcome.repair.corrupt.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Repaired:".bright_cyan(),
        outcome.repair.repaired.to_string().bright_white()
    );
    if outcome.repair.deleted > 0 {
        println!(
            "  {} {}",
            "Deleted:".bright_red(),
            outcome.repair.deleted.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Trees left:".bright_cyan(),
        outcome.trees.len().to_string().bright_white().bold()
    );
}

/// Answer one menu selection, or describe why it was rejected
pub fn answer_selection(statistics: &Statistics<'_>, selection: &str) -> String {
    match Question::from_selection(selection) {
        Ok(question) => statistics.render(question),
        Err(e) => e.to_string().bright_red().to_string(),
    }
}

fn print_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "\n{}", "Questions:".bright_green().bold())?;
    for question in Question::ALL {
        writeln!(output, "  {}", question)?;
    }
    Ok(())
}

/// Read selections until `q`, `quit` or end of input
///
/// Invalid selections are reported and the loop continues. Returns the
/// number of selections handled.
pub fn run_menu<R: BufRead, W: Write>(
    statistics: &Statistics<'_>,
    mut input: R,
    mut output: W,
) -> Result<usize> {
    print_menu(&mut output)?;
    let mut handled = 0;

    loop {
        write!(
            output,
            "\n{}",
            "Select a question (0-13, q to quit): ".bright_white()
        )?;
        output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read user input")?;
        if read == 0 {
            break;
        }

        let selection = line.trim();
        if selection.eq_ignore_ascii_case("q") || selection.eq_ignore_ascii_case("quit") {
            break;
        }

        writeln!(output, "{}", answer_selection(statistics, selection))?;
        handled += 1;
    }

    Ok(handled)
}
