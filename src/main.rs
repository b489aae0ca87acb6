use anyhow::Result;
use clap::{Parser, Subcommand};
use registry_core::config::RegistryConfig;
use registry_skills::{validate_skill_file, SkillsManager};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "skill-registry",
    about = "Discover, search and recommend skill documents",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/skill-registry/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the skills root directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rescan the skills root and report what was indexed
    Refresh,

    /// List skills sorted by name
    List {
        /// Case-insensitive filter on name or description
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Keyword search over names, triggers, descriptions and content
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one skill by name
    Get {
        name: String,
        /// Omit the document body
        #[arg(long)]
        metadata_only: bool,
    },

    /// Recommend skills for a free-text request
    Recommend {
        request: String,
        /// Extra context appended to the request
        #[arg(long)]
        context: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check a skill document for structural problems
    Validate { path: PathBuf },

    /// Show registry statistics
    Stats,

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "skill_registry=info,registry_skills=info,warn".into()
        }))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = match &cli.config {
        Some(path) => RegistryConfig::load_from(path)?,
        None => RegistryConfig::load()?,
    };
    if let Some(root) = &cli.root {
        config.skills.root = Some(root.clone());
    }

    match &cli.command {
        Commands::Config { action } => return handle_config_command(action.as_ref(), &config),
        // Validation does not touch the skills root.
        Commands::Validate { path } => return print_json(&validation_report(path, &config).await),
        _ => {}
    }

    let manager = SkillsManager::new(&config)?;
    tracing::debug!("Skills root: {}", manager.root().display());

    match cli.command {
        Commands::Refresh => {
            let summary = manager.refresh().await?;
            print_json(&json!({
                "skillsFound": summary.skills_found,
                "updated": summary.updated,
                "message": format!(
                    "Successfully refreshed registry with {} skills",
                    summary.skills_found
                ),
            }))?;
        }
        Commands::List { pattern } => {
            manager.initialize().await?;
            let skills = manager.list_skills(pattern.as_deref()).await;
            let summaries: Vec<_> = skills.iter().map(|s| s.summary()).collect();
            print_json(&json!({
                "total": summaries.len(),
                "skills": summaries,
            }))?;
        }
        Commands::Search { query, limit } => {
            manager.initialize().await?;
            let results = manager.search_skills(&query, limit).await;
            let formatted: Vec<_> = results
                .iter()
                .map(|r| {
                    json!({
                        "name": r.skill.name,
                        "description": r.skill.description,
                        "score": r.score,
                        "matchedFields": r.matched_fields,
                        "triggers": r.skill.triggers,
                        "path": r.skill.path,
                    })
                })
                .collect();
            print_json(&json!({
                "query": query,
                "resultsCount": formatted.len(),
                "results": formatted,
            }))?;
        }
        Commands::Get {
            name,
            metadata_only,
        } => {
            manager.initialize().await?;
            match manager.get_skill(&name).await {
                Some(skill) if metadata_only => print_json(&skill.summary())?,
                Some(skill) => print_json(&skill)?,
                None => {
                    print_json(&json!({
                        "error": format!("Skill '{}' not found", name),
                        "suggestion": "Use list or search to find available skills",
                    }))?;
                    std::process::exit(1);
                }
            }
        }
        Commands::Recommend {
            request,
            context,
            limit,
        } => {
            manager.initialize().await?;
            let recommendations = manager
                .recommend_skills_with_context(&request, context.as_deref(), limit)
                .await;
            let formatted: Vec<_> = recommendations
                .iter()
                .map(|r| {
                    json!({
                        "name": r.skill.name,
                        "description": r.skill.description,
                        "confidence": (r.confidence * 100.0).round() as u32,
                        "reason": r.reason,
                        "triggers": r.skill.triggers,
                        "path": r.skill.path,
                    })
                })
                .collect();
            if formatted.is_empty() {
                print_json(&json!({
                    "userRequest": request,
                    "recommendations": [],
                    "message": "No matching skills found for this request",
                }))?;
            } else {
                print_json(&json!({
                    "userRequest": request,
                    "recommendationsCount": formatted.len(),
                    "recommendations": formatted,
                }))?;
            }
        }
        Commands::Stats => {
            manager.initialize().await?;
            print_json(&manager.stats().await)?;
        }
        // Handled before the manager is built.
        Commands::Config { .. } | Commands::Validate { .. } => {}
    }

    Ok(())
}

async fn validation_report(path: &Path, config: &RegistryConfig) -> serde_json::Value {
    let result = validate_skill_file(path, config.skills.io_timeout()).await;
    json!({
        "path": path,
        "valid": result.valid,
        "errors": result.errors,
        "warnings": result.warnings,
        "summary": result.summary(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_config_command(action: Option<&ConfigAction>, config: &RegistryConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = RegistryConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", RegistryConfig::default_path().display());
        }
    }
    Ok(())
}
