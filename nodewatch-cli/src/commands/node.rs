//! Node command handlers
//!
//! `test` fires a node's webhook and follows the run it starts, `status`
//! shows the node's latest task with its output, `logs` prints output only.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Subcommand, ValueEnum};
use colored::*;
use nodewatch_client::GatewayClient;
use nodewatch_core::domain::log::LogStream;
use nodewatch_core::domain::outcome::{FailureReason, Outcome};
use nodewatch_core::domain::task::{LifecycleState, Task};
use nodewatch_core::domain::trigger::Trigger;
use nodewatch_monitor::classifier::{ContainerGroupClassifier, EcsClassifier, StatusClassifier};
use nodewatch_monitor::correlator::TriggerCorrelator;
use nodewatch_monitor::locator::TaskLookup;
use nodewatch_monitor::reader::MissingStream;
use nodewatch_monitor::{Monitor, MonitorConfig, NodeTarget};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::console::{ConsoleReporter, format_record};

/// Webhook lines shown when the trigger call breaks server side
const WEBHOOK_DUMP_LINES: usize = 20;

/// Cloud provider hosting the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
}

impl Provider {
    fn classifier(self) -> Arc<dyn StatusClassifier> {
        match self {
            Provider::Aws => Arc::new(EcsClassifier),
            Provider::Azure | Provider::Gcp => Arc::new(ContainerGroupClassifier),
        }
    }
}

/// Which logs to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogType {
    /// Output of the node's task
    Cluster,
    /// Logs of the webhook handler
    Webhook,
}

#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Task family of the node
    #[arg(long, env = "NODEWATCH_FAMILY")]
    family: String,

    /// Log group of the task output [default: /fargate/service/<family>]
    #[arg(long, env = "NODEWATCH_CLUSTER_LOG_GROUP")]
    cluster_log_group: Option<String>,

    /// Log group of the webhook handler [default: /aws/lambda/<family>-webhook]
    #[arg(long, env = "NODEWATCH_WEBHOOK_LOG_GROUP")]
    webhook_log_group: Option<String>,

    #[arg(long, value_enum, env = "NODEWATCH_PROVIDER", default_value_t = Provider::Aws)]
    provider: Provider,
}

impl NodeArgs {
    fn target(&self) -> NodeTarget {
        let log_group = self
            .cluster_log_group
            .clone()
            .unwrap_or_else(|| format!("/fargate/service/{}", self.family));
        NodeTarget::new(&self.family).with_log_group(log_group)
    }

    fn webhook_log_group(&self) -> String {
        self.webhook_log_group
            .clone()
            .unwrap_or_else(|| format!("/aws/lambda/{}-webhook", self.family))
    }
}

/// Node subcommands
#[derive(Subcommand)]
pub enum NodeCommands {
    /// Trigger the node and follow the run until it finishes
    Test {
        #[command(flatten)]
        node: NodeArgs,

        /// Model id sent to the webhook [default: the family]
        #[arg(long)]
        model_id: Option<String>,
    },
    /// Show the latest task of the node and its logs
    Status {
        #[command(flatten)]
        node: NodeArgs,

        /// Number of log lines to show
        #[arg(short = 'n', long, default_value_t = 20, value_parser = parse_num_lines)]
        num_lines: usize,

        #[arg(short, long, value_enum, default_value_t = LogType::Cluster)]
        log_type: LogType,

        /// Follow the latest task until it stops
        #[arg(short, long)]
        follow: bool,
    },
    /// Print the node's logs
    Logs {
        #[command(flatten)]
        node: NodeArgs,

        /// Number of log lines to show
        #[arg(short = 'n', long, default_value_t = 20, value_parser = parse_num_lines)]
        num_lines: usize,

        #[arg(short, long, value_enum, default_value_t = LogType::Cluster)]
        log_type: LogType,
    },
}

/// Routes node subcommands to their handlers
pub async fn handle_node_command(command: NodeCommands, config: &Config) -> Result<()> {
    let client = Arc::new(gateway_client(config));

    match command {
        NodeCommands::Test { node, model_id } => {
            test_node(&client, &node, model_id.as_deref()).await
        }
        NodeCommands::Status {
            node,
            num_lines,
            log_type,
            follow,
        } => node_status(&client, &node, num_lines, log_type, follow).await,
        NodeCommands::Logs {
            node,
            num_lines,
            log_type,
        } => node_logs(&client, &node, num_lines, log_type).await,
    }
}

fn gateway_client(config: &Config) -> GatewayClient {
    let client = GatewayClient::new(&config.gateway_url);
    match &config.token {
        Some(token) => client.with_token(token),
        None => client,
    }
}

/// Builds a monitor that stops on Ctrl-C
fn build_monitor(client: &Arc<GatewayClient>, node: &NodeArgs) -> Result<Monitor> {
    let config = MonitorConfig::from_env();
    debug!("Monitor configuration: {:?}", config);

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let monitor = Monitor::new(
        config,
        client.clone(),
        client.clone(),
        node.provider.classifier(),
    )
    .context("Invalid monitor configuration")?
    .with_cancellation(cancel);
    Ok(monitor)
}

async fn test_node(
    client: &Arc<GatewayClient>,
    node: &NodeArgs,
    model_id: Option<&str>,
) -> Result<()> {
    let monitor = build_monitor(client, node)?;
    let model_id = model_id.unwrap_or(&node.family);
    let correlator = TriggerCorrelator::new(client.clone());

    println!("{}", format!("Triggering {}...", node.family).bold());
    let trigger = match correlator.issue_trigger(model_id).await {
        Ok(trigger) => trigger,
        Err(e) if e.is_server_side() => {
            println!("{}", e.to_string().red());
            println!("{}", "Webhook logs:".bold());
            dump_webhook_logs(&monitor, node, WEBHOOK_DUMP_LINES).await?;
            bail!("webhook call failed");
        }
        Err(e) => return Err(e.into()),
    };

    match &trigger.trigger_id {
        Some(id) => println!("{} {}", "Webhook triggered, trigger id:".green(), id.cyan()),
        None => println!("{}", "Webhook triggered".green()),
    }

    let mut reporter = ConsoleReporter::new();
    let outcome = monitor
        .monitor(&node.target(), trigger, &mut reporter)
        .await?;
    report_outcome(&outcome, &node.family)
}

async fn node_status(
    client: &Arc<GatewayClient>,
    node: &NodeArgs,
    num_lines: usize,
    log_type: LogType,
    follow: bool,
) -> Result<()> {
    let monitor = build_monitor(client, node)?;

    if log_type == LogType::Webhook {
        return dump_webhook_logs(&monitor, node, num_lines).await;
    }

    if follow {
        let mut reporter = ConsoleReporter::new();
        let outcome = monitor
            .monitor(&node.target(), Trigger::untracked(), &mut reporter)
            .await?;
        return report_outcome(&outcome, &node.family);
    }

    let Some(task) = latest_task(&monitor, node).await? else {
        return Ok(());
    };
    print_task(&task);
    println!();
    print_cluster_logs(&monitor, node, &task, num_lines).await
}

async fn node_logs(
    client: &Arc<GatewayClient>,
    node: &NodeArgs,
    num_lines: usize,
    log_type: LogType,
) -> Result<()> {
    let monitor = build_monitor(client, node)?;

    match log_type {
        LogType::Webhook => dump_webhook_logs(&monitor, node, num_lines).await,
        LogType::Cluster => {
            let Some(task) = latest_task(&monitor, node).await? else {
                return Ok(());
            };
            print_cluster_logs(&monitor, node, &task, num_lines).await
        }
    }
}

async fn latest_task(monitor: &Monitor, node: &NodeArgs) -> Result<Option<Task>> {
    let lookup = monitor
        .locator()
        .find_task(&node.family, &Trigger::untracked())
        .await
        .context("Failed to look up tasks")?;

    match lookup {
        TaskLookup::Matched(task) => Ok(Some(task)),
        TaskLookup::NotYetMatched { .. } | TaskLookup::NoTasks => {
            println!("{}", "No recent tasks found...".red());
            println!(
                "{}",
                "Check `nodewatch node logs --log-type webhook` to see whether the webhook fired."
                    .dimmed()
            );
            Ok(None)
        }
    }
}

async fn print_cluster_logs(
    monitor: &Monitor,
    node: &NodeArgs,
    task: &Task,
    num_lines: usize,
) -> Result<()> {
    let target = node.target();
    let stream = monitor
        .reader()
        .find_stream(&target.log_group, &target.family, &task.task_id)
        .await
        .context("Failed to list log streams")?;

    match stream {
        Some(stream) => print_logs(monitor, &stream, num_lines).await,
        None => {
            println!(
                "{}",
                format!(
                    "Task {} has not created its log file yet (status: {})",
                    task.task_id, task.raw_status
                )
                .yellow()
            );
            Ok(())
        }
    }
}

/// Prints the most recently active stream of the webhook log group
async fn dump_webhook_logs(monitor: &Monitor, node: &NodeArgs, num_lines: usize) -> Result<()> {
    let group = node.webhook_log_group();
    let stream = monitor
        .reader()
        .latest_stream(&group)
        .await
        .with_context(|| format!("Failed to list log streams of {}", group))?;

    match stream {
        Some(stream) => print_logs(monitor, &stream, num_lines).await,
        None => {
            println!(
                "{}",
                format!(
                    "No logs found in {}. Make sure the webhook has triggered: \
                     check `nodewatch node status` and re-run `nodewatch node test`.",
                    group
                )
                .yellow()
            );
            Ok(())
        }
    }
}

async fn print_logs(monitor: &Monitor, stream: &LogStream, num_lines: usize) -> Result<()> {
    let page = monitor
        .reader()
        .tail(stream, num_lines, MissingStream::Tolerate)
        .await
        .with_context(|| format!("Failed to read log stream {}", stream.name))?;

    if page.is_empty() {
        println!("{}", "No log lines yet.".yellow());
        return Ok(());
    }

    for record in &page.records {
        println!("{}", format_record(stream, record));
    }
    if page.more_available {
        println!(
            "{}",
            "...more log lines available: use -n option to get more...".yellow()
        );
    }
    Ok(())
}

/// Prints the verdict; anything but success is an error
fn report_outcome(outcome: &Outcome, family: &str) -> Result<()> {
    if outcome.is_success() {
        println!("{}", "✓ Run succeeded".green().bold());
        return Ok(());
    }

    match outcome {
        Outcome::Failure(reason) => {
            println!("{}", format!("✗ Run failed: {}", reason).red().bold());
            for line in failure_details(reason, family) {
                println!("{}", line.dimmed());
            }
            bail!("run failed: {}", reason)
        }
        _ => {
            println!(
                "{}",
                format!(
                    "Timed out before the run finished; its result is unknown. \
                     Check `nodewatch node status --family {}`.",
                    family
                )
                .yellow()
            );
            bail!("timed out waiting for the run to finish")
        }
    }
}

/// Lines printed under a failed verdict
fn failure_details(reason: &FailureReason, family: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(text) = reason.scheduler_reason() {
        lines.push(format!("Reason: {}", text));
    }
    if let FailureReason::NeverScheduled { .. } = reason {
        lines.push(format!(
            "No task of {} exists. Check the webhook logs with \
             `nodewatch node logs --family {} --log-type webhook`.",
            family, family
        ));
    }
    lines
}

fn print_task(task: &Task) {
    println!("{}", "Latest Task:".bold());
    println!("  ID:        {}", task.task_id.cyan());
    println!(
        "  Status:    {} ({})",
        colorize_state(task.lifecycle_state),
        task.raw_status
    );
    println!(
        "  Created:   {}",
        task.created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(code) = task.exit_code {
        println!("  Exit Code: {}", code);
    }
    if let Some(reason) = &task.failure_reason {
        println!("  Reason:    {}", reason);
    }
}

fn colorize_state(state: LifecycleState) -> ColoredString {
    let label = state.to_string();
    match state {
        LifecycleState::Pending => label.yellow(),
        LifecycleState::Running => label.cyan(),
        LifecycleState::Stopped => label.dimmed(),
    }
}

fn parse_num_lines(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
