//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scout_core::{
    ContextLoader, MultiProjectReview, ResearchLogger, ReviewError, ReviewProgress, ReviewStage,
    Reviewer, ReviewerConfig, render_markdown,
};
use scout_shared::{AppConfig, ReviewRecord, ReviewRequest, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Scout: check whether a web resource matters to your projects.
#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Review articles, posts, and videos against BrainDrive project specs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.scout/scout.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Review a URL against one project (or every project with --all).
    Review {
        /// Article, X/Twitter post, or YouTube video URL.
        url: String,

        /// Project identifier in the library.
        #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
        project: Option<String>,

        /// Review against every project; keeps high and medium verdicts.
        #[arg(long)]
        all: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the projects in the library.
    Projects {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a project's research log.
    Log {
        /// Project identifier.
        project: String,

        /// Print JSON lines instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "scout=warn",
        1 => "scout=info",
        2 => "scout=debug",
        _ => "scout=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
///
/// Stage failures are reported here and turned into their exit code;
/// configuration and I/O problems propagate to `color-eyre`.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    let outcome = match cli.command {
        Command::Review {
            url,
            project,
            all,
            json,
        } => {
            let config = read_config(config_path)?;
            if all {
                cmd_review_all(&config, &url, json).await?
            } else {
                let project = project.unwrap_or_default();
                cmd_review(&config, &url, &project, json).await?
            }
        }
        Command::Projects { json } => cmd_projects(&read_config(config_path)?, json).await?,
        Command::Log { project, json } => cmd_log(&read_config(config_path)?, &project, json).await?,
        Command::Config { action } => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show(config_path)?,
            }
            Ok(())
        }
    };

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("  stage:  {}", e.stage());
            eprintln!("  reason: {}", e.reason());
            ExitCode::from(exit_code(e.stage()))
        }
    })
}

fn read_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

/// Distinct process exit code per failing stage.
fn exit_code(stage: ReviewStage) -> u8 {
    match stage {
        ReviewStage::Request => 2,
        ReviewStage::Fetch => 3,
        ReviewStage::Context => 4,
        ReviewStage::Analysis => 5,
        ReviewStage::Log => 6,
    }
}

/// Result of a command: outer for setup problems, inner for stage failures.
type Outcome = Result<std::result::Result<(), ReviewError>>;

fn build_reviewer(config: &AppConfig) -> Result<Reviewer> {
    let reviewer = Reviewer::from_config(ReviewerConfig {
        fetch: config.fetch_config(),
        library: config.library_config()?,
        analyzer: config.analyzer_config()?,
        logs: config.log_config()?,
    })?;
    Ok(reviewer)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_review(config: &AppConfig, url: &str, project: &str, json: bool) -> Outcome {
    let reviewer = build_reviewer(config)?;
    let request = ReviewRequest {
        url: url.to_string(),
        project: project.to_string(),
    };

    info!(url, project, "reviewing resource");

    let reporter = CliProgress::new();
    let result = reviewer.review(&request, &reporter).await;
    reporter.finish();

    let record = match result {
        Ok(record) => record,
        Err(e) => return Ok(Err(e)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(Ok(()))
}

async fn cmd_review_all(config: &AppConfig, url: &str, json: bool) -> Outcome {
    let reviewer = build_reviewer(config)?;

    info!(url, "reviewing resource against all projects");

    let reporter = CliProgress::new();
    let result = reviewer.review_all(url, &reporter).await;
    reporter.finish();

    let review = match result {
        Ok(review) => review,
        Err(e) => return Ok(Err(e)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        print_multi(&review);
    }
    Ok(Ok(()))
}

async fn cmd_projects(config: &AppConfig, json: bool) -> Outcome {
    let loader = ContextLoader::from_config(&config.library_config()?)?;
    let projects = match loader.list_projects().await {
        Ok(projects) => projects,
        Err(e) => return Ok(Err(e.into())),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(Ok(()));
    }

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(Ok(()));
    }

    let width = projects.iter().map(|p| p.id.len()).max().unwrap_or(0);
    for project in &projects {
        println!(
            "  {:<width$}  {}",
            project.id,
            project.description.as_deref().unwrap_or("")
        );
    }
    Ok(Ok(()))
}

async fn cmd_log(config: &AppConfig, project: &str, json: bool) -> Outcome {
    let logger = ResearchLogger::from_config(&config.log_config()?);
    let records = match logger.read(project).await {
        Ok(records) => records,
        Err(e) => return Ok(Err(e.into())),
    };

    if json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        print!("{}", render_markdown(project, &records));
    }
    Ok(Ok(()))
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = read_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_record(record: &ReviewRecord) {
    println!();
    println!("  {}", record.title);
    println!("  {}", record.url);
    println!();
    println!("  Project:   {}", record.project);
    println!("  Type:      {}", record.content_type);
    println!("  Relevance: {}", record.relevance);
    print_list("Key insights", &record.insights);
    print_list("Suggestions", &record.suggestions);
    println!();
    println!("  Logged at {}", record.logged_at.to_rfc3339());
    println!();
}

fn print_multi(review: &MultiProjectReview) {
    println!();
    println!("  {}", review.title);
    println!("  {} ({})", review.url, review.content_type);
    println!();

    if review.results.is_empty() {
        println!("  No relevant projects found.");
        println!();
        return;
    }

    for result in &review.results {
        println!("  {} [{}]", result.project, result.relevance);
        print_list("Key insights", &result.insights);
        print_list("Suggestions", &result.suggestions);
        println!();
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    - {item}");
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner on stderr; indicatif hides it when stderr is not a terminal.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ReviewProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn project_progress(&self, current: usize, total: usize, project: &str) {
        self.spinner
            .set_message(format!("Analyzing [{current}/{total}] {project}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_requires_project_or_all() {
        assert!(Cli::try_parse_from(["scout", "review", "https://example.com"]).is_err());
        assert!(
            Cli::try_parse_from(["scout", "review", "https://example.com", "--project", "a", "--all"])
                .is_err()
        );

        let cli = Cli::try_parse_from([
            "scout",
            "review",
            "https://example.com",
            "-p",
            "braindrive-lib",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Review {
                project, all, json, ..
            } => {
                assert_eq!(project.as_deref(), Some("braindrive-lib"));
                assert!(!all);
                assert!(json);
            }
            _ => panic!("expected review"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scout",
            "projects",
            "--config",
            "/tmp/scout.toml",
            "--log-format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/scout.toml")));
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn exit_codes_are_distinct_per_stage() {
        let codes = [
            ReviewStage::Request,
            ReviewStage::Fetch,
            ReviewStage::Context,
            ReviewStage::Analysis,
            ReviewStage::Log,
        ]
        .map(exit_code);
        assert_eq!(codes, [2, 3, 4, 5, 6]);
    }
}
