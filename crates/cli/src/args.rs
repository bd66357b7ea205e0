//! Command-line and environment configuration.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dispatch::{DispatchEvent, EventType, GitRef, RepositoryId, WorkflowRef};
use serde_json::Value;
use tracker::{ResolvePolicy, WatchConfig};

#[derive(Debug, Parser)]
#[command(
    name = "gh-dispatch",
    version,
    about = "Trigger GitHub Actions dispatch events and watch the run they start"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trigger a workflow_dispatch event and watch the run it starts.
    Workflow(WorkflowArgs),
    /// Trigger a repository_dispatch event, optionally watching a workflow it starts.
    Repository(RepositoryArgs),
}

#[derive(Debug, Args)]
pub struct WorkflowArgs {
    /// Workflow file name, id, or name.
    #[arg(short, long, value_parser = parse_workflow)]
    pub workflow: WorkflowRef,

    /// Branch or tag to run the workflow on.
    #[arg(long = "ref", value_parser = parse_git_ref)]
    pub git_ref: Option<GitRef>,

    /// Workflow inputs as a JSON object.
    #[arg(short, long, default_value = "{}", value_parser = parse_json_object)]
    pub inputs: Value,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct RepositoryArgs {
    /// The event_type of the repository dispatch.
    #[arg(short, long, value_parser = parse_event_type)]
    pub event_type: EventType,

    /// client_payload as a JSON object.
    #[arg(short, long, default_value = "{}", value_parser = parse_json_object)]
    pub payload: Value,

    /// Name of the workflow expected to run; without it nothing is watched.
    #[arg(short, long, value_parser = parse_workflow)]
    pub workflow: Option<WorkflowRef>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Target repository.
    #[arg(short = 'R', long, env = "GH_REPO", value_name = "OWNER/REPO", value_parser = parse_repository)]
    pub repo: RepositoryId,

    /// API token; GITHUB_TOKEN is used when neither this nor GH_TOKEN is set.
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds between redraws.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Give up finding the dispatched run after this many listings.
    #[arg(long)]
    pub resolve_attempts: Option<u32>,

    /// Milliseconds between run listings while finding the dispatched run.
    #[arg(long, default_value_t = 0)]
    pub resolve_interval_ms: u64,

    /// Exit with status 1 when the run does not conclude successfully.
    #[arg(long)]
    pub exit_status: bool,

    /// Log line format (logs go to stderr; filter with RUST_LOG).
    #[arg(long, value_enum, env = "GH_DISPATCH_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CommonArgs {
    /// The API token from `--token`/`GH_TOKEN`, falling back to `GITHUB_TOKEN`.
    pub fn token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }

    /// Loop timing built from the interval and resolve flags.
    pub fn watch_config(&self) -> WatchConfig {
        let resolve = match self.resolve_attempts {
            Some(attempts) => ResolvePolicy::bounded(attempts),
            None => ResolvePolicy::unbounded(),
        };
        WatchConfig {
            refresh_interval: Duration::from_secs(self.interval),
            resolve: resolve.with_interval(Duration::from_millis(self.resolve_interval_ms)),
        }
    }
}

impl Cli {
    /// Splits the parsed command into shared options and the event to dispatch.
    pub fn into_parts(self) -> (CommonArgs, DispatchEvent) {
        match self.command {
            Command::Workflow(args) => (
                args.common,
                DispatchEvent::Workflow {
                    workflow: args.workflow,
                    inputs: args.inputs,
                    git_ref: args.git_ref,
                },
            ),
            Command::Repository(args) => (
                args.common,
                DispatchEvent::Repository {
                    event_type: args.event_type,
                    client_payload: args.payload,
                    workflow: args.workflow,
                },
            ),
        }
    }
}

fn parse_repository(raw: &str) -> Result<RepositoryId, String> {
    RepositoryId::new(raw).ok_or_else(|| format!("expected OWNER/REPO, got '{raw}'"))
}

fn parse_workflow(raw: &str) -> Result<WorkflowRef, String> {
    WorkflowRef::new(raw).ok_or_else(|| "workflow must not be empty".to_owned())
}

fn parse_event_type(raw: &str) -> Result<EventType, String> {
    EventType::new(raw).ok_or_else(|| "event type must not be empty".to_owned())
}

fn parse_git_ref(raw: &str) -> Result<GitRef, String> {
    GitRef::new(raw).ok_or_else(|| "ref must not be empty".to_owned())
}

fn parse_json_object(raw: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("gh-dispatch").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn workflow_command_builds_workflow_event() {
        let cli = parse(&[
            "workflow",
            "--repo",
            "OWNER/REPO",
            "--workflow",
            "ci.yml",
            "--ref",
            "main",
            "--inputs",
            r#"{"name": "x"}"#,
        ])
        .unwrap();
        let (common, event) = cli.into_parts();
        assert_eq!(common.repo.as_str(), "OWNER/REPO");
        assert_eq!(
            event,
            DispatchEvent::Workflow {
                workflow: WorkflowRef::new("ci.yml").unwrap(),
                inputs: json!({"name": "x"}),
                git_ref: GitRef::new("main"),
            }
        );
    }

    #[test]
    fn repository_command_defaults_payload_and_workflow() {
        let cli = parse(&["repository", "-R", "OWNER/REPO", "--event-type", "hello"]).unwrap();
        let (common, event) = cli.into_parts();
        assert_eq!(
            event,
            DispatchEvent::Repository {
                event_type: EventType::new("hello").unwrap(),
                client_payload: json!({}),
                workflow: None,
            }
        );
        assert_eq!(common.watch_config(), WatchConfig::default());
    }

    #[test]
    fn payload_must_be_a_json_object() {
        let err = parse(&[
            "repository",
            "-R",
            "OWNER/REPO",
            "--event-type",
            "hello",
            "--payload",
            "[1, 2]",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn repository_must_have_owner_and_name() {
        let err = parse(&["workflow", "-R", "just-a-name", "-w", "ci.yml"]).unwrap_err();
        assert!(err.to_string().contains("expected OWNER/REPO"));
    }

    #[test]
    fn timing_flags_shape_the_watch_config() {
        let cli = parse(&[
            "workflow",
            "-R",
            "OWNER/REPO",
            "-w",
            "ci.yml",
            "--interval",
            "10",
            "--resolve-attempts",
            "5",
            "--resolve-interval-ms",
            "250",
        ])
        .unwrap();
        let (common, _) = cli.into_parts();
        assert_eq!(
            common.watch_config(),
            WatchConfig {
                refresh_interval: Duration::from_secs(10),
                resolve: ResolvePolicy::bounded(5).with_interval(Duration::from_millis(250)),
            }
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(parse(&["workflow", "-R", "OWNER/REPO", "-w", "ci.yml", "--interval", "0"]).is_err());
    }
}
