use crate::utils;
use colored::Colorize;
use stackflow_core::{BuildContext, ConfigResolver, DeployConfig, NormalizedConfig};
use std::path::Path;

pub fn handle(
    config_path: &Path,
    config: &DeployConfig,
    stage: String,
    revision: Option<String>,
) -> anyhow::Result<()> {
    println!("{}", "Validating configuration...".blue());
    println!("Config file: {}", config_path.display().to_string().cyan());

    let mut ctx = BuildContext::new(stage);
    if let Some(revision) = revision {
        ctx = ctx.with_revision(revision);
    }

    match ConfigResolver::new(config).resolve(&ctx) {
        Ok(normalized) => {
            println!("{}", "✓ Configuration is valid".green().bold());
            println!();
            print_summary(config, &normalized);
            Ok(())
        }
        Err(e) => {
            utils::print_error("Configuration error", &e);
            std::process::exit(1);
        }
    }
}

fn print_summary(config: &DeployConfig, normalized: &NormalizedConfig) {
    println!("Summary:");
    println!("  app:         {}", normalized.app_name.cyan());
    println!("  stack:       {}", normalized.stack_name.cyan());
    println!("  strategy:    {}", normalized.strategy);
    println!("  network:     {}", normalized.network);
    println!("  image:       {}", normalized.container.image);
    println!(
        "  task:        {} x {} cpu / {} MiB{}",
        normalized.task.desired_count,
        normalized.task.cpu,
        normalized.task.memory,
        if normalized.task.spot { " (spot)" } else { "" }
    );
    println!(
        "  autoscaling: {}..{} at {}% cpu",
        normalized.autoscaling.min_capacity,
        normalized.autoscaling.max_capacity,
        normalized.autoscaling.cpu_target
    );
    if let Some(domain) = normalized.dns.full_domain.as_ref().filter(|_| normalized.dns.enabled) {
        println!("  domain:      {}", domain);
    }
    println!("  stages:      {}", config.stage_names().join(", "));
}
