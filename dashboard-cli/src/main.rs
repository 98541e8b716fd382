mod prompt;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use prompt::InputLines;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visit_dashboard::{
    AgentService, ClientConfig, Dashboard, HttpAgentClient, SubmitOutcome, Tab, VisitType, render,
};

#[derive(Parser, Debug)]
#[command(
    name = "visit-dashboard",
    version,
    about = "Submit a visit transcript to the healthcare agents and browse the guidance"
)]
struct Args {
    /// Base URL of the agents service (overrides AGENTS_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Patient condition, e.g. "Type 2 Diabetes"
    #[arg(long)]
    condition: Option<String>,

    /// Follow-up, Initial, Emergency or Routine
    #[arg(long)]
    visit_type: Option<VisitType>,

    /// Visit transcript text
    #[arg(long, conflicts_with = "transcript_file")]
    transcript: Option<String>,

    /// Read the transcript from a file ("-" for stdin)
    #[arg(long)]
    transcript_file: Option<PathBuf>,

    /// Tab to show after submitting with --once
    #[arg(long, requires = "once")]
    tab: Option<Tab>,

    /// Submit once, print the dashboard and exit
    #[arg(long)]
    once: bool,

    /// Probe the service health endpoint and exit
    #[arg(long)]
    check: bool,
}

/// Binary target is `visit-dashboard`, so its own logs share the library's target prefix.
const DEFAULT_LOG_FILTER: &str = "visit_dashboard=info";

/// Structured logs on stderr; JSON when LOG_FORMAT=json
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.api_url {
        Some(url) => ClientConfig::new(url.as_str())?,
        None => ClientConfig::from_env()?,
    };
    info!("Using agents service at {}", config.base_url());
    let client = HttpAgentClient::new(config);

    if args.check {
        return check_health(&client).await;
    }

    let dashboard = Dashboard::new(client);
    dashboard.set_condition(args.condition.clone().unwrap_or_default());
    dashboard.set_visit_type(args.visit_type);
    dashboard.set_transcript(initial_transcript(&args).await?);

    if args.once {
        return run_once(&dashboard, args.tab).await;
    }

    let mut lines = prompt::stdin_lines();
    fill_missing_fields(&dashboard, &mut lines).await?;
    run_interactive(&dashboard, &mut lines).await
}

async fn check_health(client: &HttpAgentClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Health check against {} failed", client.config().health_url()))?;

    println!(
        "{}: {}",
        health.service.as_deref().unwrap_or("agents service"),
        health.status
    );
    if !health.is_healthy() {
        bail!("agents service reports status '{}'", health.status);
    }
    Ok(())
}

async fn initial_transcript(args: &Args) -> Result<String> {
    if let Some(text) = &args.transcript {
        return Ok(text.clone());
    }
    match &args.transcript_file {
        Some(path) if path.as_os_str() == "-" => prompt::read_all_stdin().await,
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read transcript from {}", path.display())),
        None => Ok(String::new()),
    }
}

async fn run_once<S: AgentService + 'static>(
    dashboard: &Dashboard<S>,
    tab: Option<Tab>,
) -> Result<()> {
    if !dashboard.snapshot().form.is_complete() {
        bail!("--once needs --condition, --visit-type and a transcript");
    }

    submit_with_spinner(dashboard).await;
    if let Some(tab) = tab {
        dashboard.select_tab(tab);
    }
    println!("{}", render::render_dashboard(&dashboard.snapshot()));
    Ok(())
}

async fn fill_missing_fields<S: AgentService>(
    dashboard: &Dashboard<S>,
    lines: &mut InputLines,
) -> Result<()> {
    let form = dashboard.snapshot().form;

    if form.condition.is_empty() {
        if let Some(condition) = prompt::read_line(lines, "Patient Condition: ").await? {
            dashboard.set_condition(condition);
        }
    }
    if form.visit_type.is_none() {
        dashboard.set_visit_type(prompt::read_visit_type(lines).await?);
    }
    if form.transcript.is_empty() {
        let transcript =
            prompt::read_block(lines, "Visit Transcript (finish with an empty line):").await?;
        dashboard.set_transcript(transcript);
    }
    Ok(())
}

/// Runs the submit while a spinner on stderr follows the loading flag.
async fn submit_with_spinner<S: AgentService + 'static>(
    dashboard: &Dashboard<S>,
) -> SubmitOutcome {
    let watcher = dashboard.clone();
    let spinner = tokio::spawn(async move {
        const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
        let mut frame = 0;
        loop {
            tokio::time::sleep(Duration::from_millis(120)).await;
            if !watcher.is_loading() {
                break;
            }
            eprint!("\r{} Processing...", FRAMES[frame % FRAMES.len()]);
            frame += 1;
        }
        if frame > 0 {
            eprint!("\r{:16}\r", "");
        }
    });

    let outcome = dashboard.submit().await;
    if let Err(e) = spinner.await {
        warn!("Spinner task ended abnormally: {}", e);
    }
    outcome
}

const HELP: &str = "\
Commands:
  submit              send the form to the agents service
  tasks|coach|report  switch the result tab
  show                print the whole dashboard
  condition <text>    change the patient condition
  visit <type>        change the visit type
  transcript          re-enter the transcript
  help                show this list
  quit                exit";

async fn run_interactive<S: AgentService + 'static>(
    dashboard: &Dashboard<S>,
    lines: &mut InputLines,
) -> Result<()> {
    print!("{}", render::render_dashboard(&dashboard.snapshot()));
    println!("\n{}", HELP);

    while let Some(input) = prompt::read_line(lines, "\n> ").await? {
        let (command, rest) = input
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((input.as_str(), ""));

        match command.to_ascii_lowercase().as_str() {
            "" => {}
            "submit" => {
                if !dashboard.snapshot().can_submit() {
                    println!("Fill in condition, visit type and transcript before submitting.");
                    continue;
                }
                submit_with_spinner(dashboard).await;
                print!("{}", render::render_dashboard(&dashboard.snapshot()));
            }
            "tasks" | "coach" | "coaching" | "report" => {
                let tab: Tab = command.parse().map_err(anyhow::Error::msg)?;
                if !dashboard.select_tab(tab) {
                    println!("No results yet. Use 'submit' first.");
                    continue;
                }
                let state = dashboard.snapshot();
                if let Some(response) = state.response() {
                    println!("{}", render::render_tab_bar(response, state.active_tab()));
                    print!("{}", render::render_tab(response, state.active_tab()));
                }
            }
            "show" => print!("{}", render::render_dashboard(&dashboard.snapshot())),
            "condition" => dashboard.set_condition(rest),
            "visit" => match rest.parse::<VisitType>() {
                Ok(visit_type) => dashboard.set_visit_type(Some(visit_type)),
                Err(e) => println!("{}", e),
            },
            "transcript" => {
                let transcript =
                    prompt::read_block(lines, "Visit Transcript (finish with an empty line):")
                        .await?;
                dashboard.set_transcript(transcript);
            }
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            other => println!("Unknown command '{}'. Type 'help' for the list.", other),
        }
    }
    Ok(())
}
