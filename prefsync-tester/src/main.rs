mod reports;
mod scenarios;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use scenarios::{RemoteScript, Scenario, ScenarioResult, find_scenario, list_scenarios, run_scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "prefsync-tester", version)]
#[command(about = "Runs prefsync reconciliation and shortcut scenarios against in-memory collaborators")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// JSON object of cached strings for an ad-hoc run
    #[arg(long)]
    local: Option<PathBuf>,

    /// Settings response body for an ad-hoc run; omitted means the fetch fails
    #[arg(long)]
    remote: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(args.verbose)),
    )
    .init();

    if args.list_scenarios {
        let mut output_target = OutputTarget::new(args.output.clone())?;
        writeln!(output_target, "Available scenarios:")?;
        for (key, description) in list_scenarios() {
            writeln!(output_target, "  {key:28} - {description}")?;
        }
        output_target.flush_inner()?;
        return Ok(());
    }

    if args.report == ReportFormat::Console {
        println!("{}", "♿ prefsync Scenario Tester".bright_cyan().bold());
        println!("{}", "==========================".cyan());
    }

    let start_time = Instant::now();
    let selected = select_scenarios(&args)?;
    let mut results = Vec::with_capacity(selected.len());
    for scenario in &selected {
        results.push(run_scenario(scenario, args.verbose).await);
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` still wins when set; `--verbose` only moves the default.
const fn log_filter(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn select_scenarios(args: &Args) -> Result<Vec<Scenario>> {
    if args.local.is_some() || args.remote.is_some() {
        return Ok(vec![ad_hoc_scenario(args.local.as_deref(), args.remote.as_deref())?]);
    }
    let names = split_csv(&args.scenarios);
    if names.iter().any(|name| name == "all") {
        return Ok(scenarios::catalog());
    }
    let mut selected = Vec::new();
    for name in names {
        if let Some(scenario) = find_scenario(&name) {
            selected.push(scenario);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
        }
    }
    Ok(selected)
}

fn ad_hoc_scenario(local: Option<&Path>, remote: Option<&Path>) -> Result<Scenario> {
    let cache: BTreeMap<String, String> = match local {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("{} is not a JSON object of strings", path.display()))?
        }
        None => BTreeMap::new(),
    };
    let script = match remote {
        Some(path) => RemoteScript::Body(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => RemoteScript::Transport("no remote fixture".to_string()),
    };
    Ok(Scenario::ad_hoc(cache, script))
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    output_target,
                    "# prefsync Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
