//! Show command - print the cached resources of one type

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::{KfzfError, KfzfResult};
use crate::resources::{K8sResource, Resource, ResourceType};
use crate::store::{load_snapshot, JsonCodec, StoreConfig};
use chrono::{DateTime, Utc};
use console::style;
use std::collections::BTreeMap;

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> KfzfResult<()> {
    let store_config = StoreConfig::from_config(config);
    let path = store_config.file_path(args.resource);

    if !path.exists() {
        return Err(KfzfError::DumpFileNotFound {
            resource: args.resource.to_string(),
            path,
        });
    }

    let entries: BTreeMap<String, K8sResource> = load_snapshot(&JsonCodec, &path).await?;

    match args.format {
        OutputFormat::Plain => print_plain(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Table => print_table(args.resource, &entries, Utc::now()),
    }

    Ok(())
}

fn print_plain(entries: &BTreeMap<String, K8sResource>) {
    for key in entries.keys() {
        println!("{}", key);
    }
}

fn print_table(resource: ResourceType, entries: &BTreeMap<String, K8sResource>, now: DateTime<Utc>) {
    if resource == ResourceType::ApiResource {
        println!("{:<40} {}", style("GROUPVERSION").bold(), style("RESOURCES").bold());
        for list in entries.values() {
            if let K8sResource::ApiResourceList(list) = list {
                let names: Vec<_> = list.resources.iter().map(|r| r.name.as_str()).collect();
                println!("{:<40} {}", list.group_version, names.join(","));
            }
        }
        return;
    }

    let namespaced = resource.namespaced();
    if namespaced {
        print!("{:<20} ", style("NAMESPACE").bold());
    }
    println!(
        "{:<40} {:<8} {}",
        style("NAME").bold(),
        style("AGE").bold(),
        style("LABELS").bold()
    );

    for res in entries.values() {
        println!("{}", table_row(res, namespaced, now));
    }

    println!();
    println!("{} {}", entries.len(), resource);
}

/// One table line; cluster-scoped types have no NAMESPACE column
fn table_row(res: &K8sResource, namespaced: bool, now: DateTime<Utc>) -> String {
    let (age, labels) = match res.metadata() {
        Some(meta) => (
            format_age(meta.creation_timestamp, now),
            meta.labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(","),
        ),
        None => (format_age(None, now), String::new()),
    };

    let row = format!("{:<40} {:<8} {}", res.name(), age, labels);
    if namespaced {
        format!("{:<20} {}", res.namespace().unwrap_or("-"), row)
    } else {
        row
    }
}

/// Compact age in the style of kubectl: `45s`, `12m`, `5h`, `3d`
fn format_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "<unknown>".to_string();
    };

    let secs = (now - created).num_seconds().max(0);
    match secs {
        s if s < 120 => format!("{}s", s),
        s if s < 120 * 60 => format!("{}m", s / 60),
        s if s < 48 * 3600 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}
