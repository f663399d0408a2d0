//! Status command - freshness of every dump file

use crate::config::Config;
use crate::error::KfzfResult;
use crate::resources::{K8sResource, ResourceType};
use crate::store::{load_snapshot, JsonCodec, StoreConfig};
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Execute the status command
pub async fn execute(config: &Config) -> KfzfResult<()> {
    let ctx = UiContext::detect();
    let store_config = StoreConfig::from_config(config);

    ui::section(
        &ctx,
        &format!(
            "Cluster {} ({})",
            store_config.cluster_name,
            store_config.dest_dir().display()
        ),
    );

    if let Some(kubeconfig) = &config.cluster.kubeconfig {
        ui::step_ok_detail(&ctx, "kubeconfig", &kubeconfig.display().to_string());
    }

    let now = Utc::now();
    for &resource in ResourceType::all() {
        report(&ctx, &store_config, resource, now).await;
    }

    Ok(())
}

async fn report(ctx: &UiContext, store_config: &StoreConfig, resource: ResourceType, now: DateTime<Utc>) {
    let path = store_config.file_path(resource);

    let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => {
            ui::step_warn_hint(ctx, &format!("{}: no dump", resource), "not ingested yet");
            return;
        }
    };

    match load_snapshot::<_, K8sResource>(&JsonCodec, &path).await {
        Ok(entries) => ui::step_ok_detail(
            ctx,
            &format!("{}: {} entries", resource, entries.len()),
            &format!("dumped {} ago", describe_age(modified, now)),
        ),
        Err(e) => ui::step_error_detail(ctx, &format!("{}: unreadable dump", resource), &e.to_string()),
    }
}

fn describe_age(modified: SystemTime, now: DateTime<Utc>) -> String {
    let modified: DateTime<Utc> = modified.into();
    let secs = (now - modified).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    }
}
