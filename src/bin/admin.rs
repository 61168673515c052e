//! FSM Workflow Admin CLI
//!
//! Offline tooling: validate definition files before uploading them and
//! inspect the data directory of the JSON storage backend. The inspection
//! commands never create or modify the data directory, and exit non-zero
//! when it or the requested entity is missing.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fsm_workflow::engine::validator;
use fsm_workflow::{CreateDefinitionRequest, JsonFileStorage, WorkflowDefinition, WorkflowStorage};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fsm-workflow-admin")]
#[command(about = "FSM Workflow Admin CLI - Validate definitions and inspect stored data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory of the JSON storage backend
    #[arg(long, env = "FSM_WORKFLOW_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a definition file without storing it
    Validate {
        /// JSON file in the `POST /api/workflows` body format
        file: PathBuf,
    },

    /// Show data statistics
    Stats,

    /// List all workflow definitions
    ListWorkflows,

    /// List workflow instances
    ListInstances {
        /// Workflow ID to filter by
        #[arg(long)]
        workflow_id: Option<String>,
    },

    /// Show one instance with its history
    ShowInstance {
        /// Instance ID
        instance_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Validate { file } => {
            if !validate_file(&file).await? {
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let storage = JsonFileStorage::open_existing(&cli.data_dir).await?;
            show_stats(&storage).await?;
        }

        Commands::ListWorkflows => {
            let storage = JsonFileStorage::open_existing(&cli.data_dir).await?;
            list_workflows(&storage).await?;
        }

        Commands::ListInstances { workflow_id } => {
            let storage = JsonFileStorage::open_existing(&cli.data_dir).await?;
            list_instances(&storage, workflow_id).await?;
        }

        Commands::ShowInstance { instance_id } => {
            let storage = JsonFileStorage::open_existing(&cli.data_dir).await?;
            show_instance(&storage, &instance_id).await?;
        }
    }

    Ok(())
}

/// Returns whether the definition passed validation
async fn validate_file(path: &PathBuf) -> Result<bool> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let request: CreateDefinitionRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a workflow definition", path.display()))?;

    let definition = WorkflowDefinition::new(request.name, request.states, request.actions);
    let problems = validator::violations(&definition);

    if problems.is_empty() {
        println!(
            "✅ '{}' is valid ({} states, {} actions)",
            definition.name,
            definition.states.len(),
            definition.actions.len()
        );
        return Ok(true);
    }

    error!("❌ {} problem(s) in {}", problems.len(), path.display());
    println!("❌ '{}' is invalid:", definition.name);
    for problem in problems {
        println!("   - {}", problem);
    }
    Ok(false)
}

async fn show_stats(storage: &JsonFileStorage) -> Result<()> {
    info!("📊 Gathering statistics from {}", storage.data_dir().display());

    let workflows = storage.list_definitions().await?;
    let instances = storage.list_instances().await?;
    let completed = instances.iter().filter(|i| i.is_completed()).count();

    println!("\n📈 FSM Workflow Data Statistics");
    println!("==================================");
    println!("Workflows: {}", workflows.len());
    println!("Instances: {} ({} completed)", instances.len(), completed);

    let mut per_workflow: HashMap<&str, usize> = HashMap::new();
    for instance in &instances {
        *per_workflow.entry(instance.definition_id.as_str()).or_insert(0) += 1;
    }

    if !per_workflow.is_empty() {
        println!("\nInstances per workflow:");
        for (workflow_id, count) in per_workflow {
            println!("  {}: {} instances", workflow_id, count);
        }
    }

    Ok(())
}

async fn list_workflows(storage: &JsonFileStorage) -> Result<()> {
    let mut workflows = storage.list_definitions().await?;
    workflows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    println!("\n📋 Workflows ({})", workflows.len());
    println!("=====================================");

    if workflows.is_empty() {
        println!("No workflows found.");
        return Ok(());
    }

    for workflow in workflows {
        println!("🔧 ID: {}", workflow.id);
        println!("   Name: {}", workflow.name);
        println!("   States: {}", workflow.states.len());
        println!("   Actions: {}", workflow.actions.len());
        println!();
    }

    Ok(())
}

async fn list_instances(storage: &JsonFileStorage, workflow_id: Option<String>) -> Result<()> {
    let mut instances: Vec<_> = storage
        .list_instances()
        .await?
        .into_iter()
        .filter(|i| workflow_id.as_deref().map_or(true, |id| i.definition_id == id))
        .collect();
    instances.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    println!("\n📦 Instances ({})", instances.len());
    println!("=====================================");

    if instances.is_empty() {
        println!("No instances found.");
        return Ok(());
    }

    for instance in instances {
        println!("🎯 ID: {}", instance.id);
        println!("   Workflow: {}", instance.definition_id);
        println!("   State: {}", instance.current_state_id);
        println!("   Transitions: {}", instance.history.len());
        if let Some(completed_at) = instance.completed_at {
            println!("   Completed: {}", completed_at.to_rfc3339());
        }
        println!();
    }

    Ok(())
}

async fn show_instance(storage: &JsonFileStorage, instance_id: &str) -> Result<()> {
    let Some(instance) = storage.get_instance(instance_id).await? else {
        bail!("instance '{}' not found in {}", instance_id, storage.data_dir().display());
    };

    let workflow_name = storage
        .get_definition(&instance.definition_id)
        .await?
        .map(|d| d.name)
        .unwrap_or_else(|| "<missing definition>".to_string());

    println!("\n🎯 Instance {}", instance.id);
    println!("=====================================");
    println!("Workflow: {} ({})", workflow_name, instance.definition_id);
    println!("State: {}", instance.current_state_id);
    println!("Created: {}", instance.created_at.to_rfc3339());
    println!("Updated: {}", instance.updated_at.to_rfc3339());
    match instance.completed_at {
        Some(at) => println!("Completed: {}", at.to_rfc3339()),
        None => println!("Completed: no"),
    }

    println!("\nHistory:");
    if instance.history.is_empty() {
        println!("  (no actions executed)");
    }
    for (n, entry) in instance.history.iter().enumerate() {
        println!(
            "  {}. {} '{}' -> '{}' via '{}' ({})",
            n + 1,
            entry.executed_at.to_rfc3339(),
            entry.from_state_id,
            entry.to_state_id,
            entry.action_id,
            entry.action_name
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsm_workflow::{StateId, WorkflowInstance};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_show_unknown_instance_fails() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::open_existing(dir.path()).await.unwrap();

        let err = show_instance(&storage, "missing").await.unwrap_err();
        assert!(err.to_string().contains("'missing' not found"));
    }

    #[tokio::test]
    async fn test_show_stored_instance() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::open_existing(dir.path()).await.unwrap();
        let instance = WorkflowInstance::new("wf", StateId::from("draft"));
        storage.save_instance(instance.clone()).await.unwrap();

        assert!(show_instance(&storage, &instance.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_file_reports_problems() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("definition.json");
        std::fs::write(
            &path,
            r#"{"name": "Broken", "states": [{"id": "a", "name": "A"}], "actions": []}"#,
        )
        .unwrap();
        assert!(!validate_file(&path).await.unwrap());

        let request = serde_json::to_string(&CreateDefinitionRequest::document_review()).unwrap();
        std::fs::write(&path, request).unwrap();
        assert!(validate_file(&path).await.unwrap());
    }
}
