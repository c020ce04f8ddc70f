use colored::Colorize;
use stackflow_cloud::{ContextStore, HostedZoneInfo, NetworkInfo};

pub async fn add_network(
    store: &ContextStore,
    id: String,
    name: Option<String>,
    private_subnets: Vec<String>,
    public_subnets: Vec<String>,
) -> anyhow::Result<()> {
    let mut context = store.load().await?;
    context.add_network(NetworkInfo {
        id: id.clone(),
        name,
        private_subnets,
        public_subnets,
    });
    store.save(&context).await?;

    println!("{} {}", "✓ Network recorded:".green(), id.cyan());
    Ok(())
}

pub async fn remove_network(store: &ContextStore, id: &str) -> anyhow::Result<()> {
    let mut context = store.load().await?;
    if context.remove_network(id).is_none() {
        anyhow::bail!("Network not in context: {}", id);
    }
    store.save(&context).await?;

    println!("{} {}", "✓ Network removed:".green(), id.cyan());
    Ok(())
}

pub async fn add_zone(store: &ContextStore, domain: String, zone_id: String) -> anyhow::Result<()> {
    let mut context = store.load().await?;
    context.add_hosted_zone(HostedZoneInfo {
        zone_id: zone_id.clone(),
        domain: domain.clone(),
    });
    store.save(&context).await?;

    println!(
        "{} {} ({})",
        "✓ Hosted zone recorded:".green(),
        domain.cyan(),
        zone_id
    );
    Ok(())
}

pub async fn show(store: &ContextStore) -> anyhow::Result<()> {
    let context = store.load().await?;

    println!(
        "Lookup context: {}",
        store.context_path().display().to_string().cyan()
    );
    println!("  updated: {}", context.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));

    println!("  networks: {}", context.networks.len());
    for network in context.networks.values() {
        println!(
            "    - {} ({}) private: [{}] public: [{}]",
            network.id.cyan(),
            network.name.as_deref().unwrap_or("-"),
            network.private_subnets.join(", "),
            network.public_subnets.join(", ")
        );
    }

    println!("  hosted zones: {}", context.hosted_zones.len());
    for zone in context.hosted_zones.values() {
        println!("    - {} ({})", zone.domain.cyan(), zone.zone_id);
    }
    Ok(())
}
