// Main CLI entry point for twinprobe
// Uses clap for argument parsing

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use twinprobe::browser::HttpBrowser;
use twinprobe::config::ScanConfig;
use twinprobe::locators::RegexExtractor;
use twinprobe::pipeline::Pipeline;
use twinprobe::reporting::{export_csv, export_markdown, render_report};
use twinprobe::verdict::KeywordClassifier;

fn cli() -> Command {
    Command::new("twinprobe")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Jake Abendroth")
        .about("Differential two-identity IDOR / horizontal privilege escalation prober")
        .after_help("EXAMPLES:\n  twinprobe --config run.json\n  twinprobe -c run.json --timeout 10 --no-redirect-denial --csv-report\n\nThe run file names two identities (login URL, form field names and values),\nand the post-login page of each. Set RUST_LOG=debug for per-page detail.")
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .required(true)
            .num_args(1)
            .help("Path to the JSON run file"))
        .arg(Arg::new("timeout")
            .short('t')
            .long("timeout")
            .num_args(1)
            .value_parser(clap::value_parser!(u64).range(1..))
            .help("Per-navigation timeout in seconds (overrides the run file)"))
        .arg(Arg::new("no_redirect_denial")
            .long("no-redirect-denial")
            .action(ArgAction::SetTrue)
            .help("Do not treat same-scope redirects as denials"))
        .arg(Arg::new("deny_on_status")
            .long("deny-on-status")
            .action(ArgAction::SetTrue)
            .help("Treat a final 401/403 status as a denial"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(ArgAction::SetTrue)
            .help("Write probe outcomes to a timestamped CSV file"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(ArgAction::SetTrue)
            .help("Write probe outcomes to a timestamped Markdown file"))
        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .help("Only log warnings and errors"))
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("quiet"));

    let config_path = matches
        .get_one::<String>("config")
        .context("--config is required")?;
    let mut config = ScanConfig::load(config_path)
        .with_context(|| format!("Failed to load run file {}", config_path))?;

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.probe.timeout_secs = *timeout;
    }
    if matches.get_flag("no_redirect_denial") {
        config.probe.redirect_denial = false;
    }
    if matches.get_flag("deny_on_status") {
        config.probe.deny_on_status = true;
    }

    info!(
        identity_a = %config.identity_a.label,
        identity_b = %config.identity_b.label,
        timeout_secs = config.probe.timeout_secs,
        "starting analysis"
    );

    let browser = HttpBrowser::from_settings(&config.probe).context("Failed to start browser session")?;
    let classifier = KeywordClassifier::from_settings(&config.probe);
    let mut pipeline = Pipeline::new(browser, RegexExtractor, classifier, config.probe.timeout());

    let report = pipeline.run(&config).await.context("Analysis aborted")?;
    print!("{}", render_report(&report));

    let outcomes: Vec<_> = report
        .run_a_as_b
        .outcomes
        .iter()
        .chain(report.run_b_as_a.outcomes.iter())
        .cloned()
        .collect();

    if matches.get_flag("csv_report") {
        let filename = export_csv(&outcomes).context("Failed to write CSV report")?;
        println!("CSV report written to {}", filename);
    }
    if matches.get_flag("markdown_report") {
        let filename = export_markdown(&outcomes).context("Failed to write Markdown report")?;
        println!("Markdown report written to {}", filename);
    }

    if report.total_bypasses() > 0 {
        warn!(count = report.total_bypasses(), "authorization bypasses found");
    }
    Ok(())
}
