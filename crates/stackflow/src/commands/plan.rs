use crate::utils;
use colored::Colorize;
use stackflow_cloud::{ContextStore, ResourceNode};
use stackflow_core::{BuildContext, DeployConfig, slice_word};
use stackflow_topology::{CertificateDecision, DeploymentPlan};
use std::path::{Path, PathBuf};

const DETAIL_WIDTH: usize = 60;

pub async fn handle(
    config_path: &Path,
    config: &DeployConfig,
    stage: String,
    revision: Option<String>,
    json: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = ContextStore::new(stackflow_config::project_root(config_path));
    let context = store.load().await?;

    let mut ctx = BuildContext::new(stage);
    if let Some(revision) = revision {
        ctx = ctx.with_revision(revision);
    }

    let plan = match stackflow_topology::compile(config, &ctx, &context) {
        Ok(plan) => plan,
        Err(e) => {
            utils::print_error("Plan failed", &e);
            if store.context_path().exists() {
                eprintln!();
                eprintln!(
                    "Lookup context: {}",
                    store.context_path().display().to_string().cyan()
                );
            } else {
                eprintln!();
                eprintln!("No lookup context yet. Record networks and zones with `stack context`.");
            }
            std::process::exit(1);
        }
    };

    if let Some(output) = output {
        tokio::fs::write(&output, plan.to_json()?).await?;
        if !json {
            println!(
                "{} {}",
                "✓ Plan written to".green(),
                output.display().to_string().cyan()
            );
        }
    }

    if json {
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &DeploymentPlan) {
    println!("{} {}", "Stack:".bold(), plan.stack_name.cyan());
    println!("  stage:       {}", plan.stage);
    println!("  strategy:    {}", plan.strategy);
    println!("  certificate: {}", describe_certificate(&plan.certificate));
    if !plan.secrets.is_empty() {
        println!("  secrets:     {}", plan.secrets.len());
        for (variable, source) in &plan.secrets {
            println!(
                "    - {} <- {}#{}",
                variable.cyan(),
                slice_word(&source.arn, DETAIL_WIDTH),
                source.key
            );
        }
    }
    println!();

    for node in &plan.nodes {
        print_node(node);
    }

    println!();
    println!("{}", format!("✓ {}", plan.summary()).green().bold());
}

fn print_node(node: &ResourceNode) {
    let marker = if node.kind.is_lookup() {
        "=".dimmed()
    } else {
        "+".green()
    };
    let deps = if node.depends_on.is_empty() {
        String::new()
    } else {
        let deps: Vec<&str> = node.depends_on.iter().map(|d| d.as_str()).collect();
        format!(" <- {}", deps.join(", ")).dimmed().to_string()
    };
    println!(
        "  {} {:<18} {}{}",
        marker,
        node.kind.to_string().blue(),
        node.id,
        deps
    );
}

fn describe_certificate(decision: &CertificateDecision) -> String {
    match decision {
        CertificateDecision::None => "none (HTTP on port 80)".yellow().to_string(),
        CertificateDecision::Imported { arn } => {
            format!("imported {}", slice_word(arn, DETAIL_WIDTH))
        }
        CertificateDecision::Created { domain, zone } => {
            format!("created for {} in zone {}", domain, zone.zone_id)
        }
    }
}
