//! # okta-group
//!
//! Command-line front end for the `okta_group` resource.
//!
//! ## Usage
//!
//! ```bash
//! okta-group schema
//! okta-group read <group_id | group_id/skip_users>
//! okta-group apply <config.json> [<group_id>]
//! okta-group delete <group_id>
//! ```
//!
//! `apply` creates a new group when no ID is given and updates the existing
//! group otherwise. Results are printed as JSON on stdout.
//!
//! ## Configuration
//!
//! The org is configured through `OKTA_ORG_NAME`, `OKTA_BASE_URL`,
//! `OKTA_API_TOKEN`, `OKTA_HTTP_ENDPOINT` and `OKTA_REQUEST_TIMEOUT`. Logging
//! follows `RUST_LOG`.
//!
//! ## Exit Codes
//!
//! - `0`: the operation succeeded
//! - `1`: invalid usage, configuration or a failed operation (including Ctrl-C)

use okta_provider::resource::{GroupConfig, GroupResource, GroupState, group_schema};
use okta_provider::{ClientConfig, OktaClient, ProviderError, ResourceId};
use serde::Serialize;
use std::env;
use std::fs;
use std::process;
use tokio_util::sync::CancellationToken;

const USAGE: &str = "\
Usage:
  okta-group schema
  okta-group read <group_id | group_id/skip_users>
  okta-group apply <config.json> [<group_id>]
  okta-group delete <group_id>";

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    if let ["schema"] = args.as_slice() {
        print_json(&group_schema());
        return;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling outstanding Okta calls");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = run(&args, &cancel).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: &[&str], cancel: &CancellationToken) -> Result<(), Box<dyn std::error::Error>> {
    let command = match args {
        ["read", import_id] => Command::Read(*import_id),
        ["apply", path] => Command::Apply(*path, None),
        ["apply", path, group_id] => Command::Apply(*path, Some(*group_id)),
        ["delete", group_id] => Command::Delete(*group_id),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let client = OktaClient::new(ClientConfig::from_env()?)?;
    let resource = GroupResource::new(client);

    match command {
        Command::Read(import_id) => {
            let state = resource.import_state(import_id, cancel).await?;
            print_json(&state);
        }
        Command::Apply(path, group_id) => {
            let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            let config = GroupConfig::from_value(&raw)?;

            let state = match group_id {
                None => resource.create(&config, cancel).await.inspect_err(|e| {
                    if let Some(created) = e.created_group_id() {
                        eprintln!("Group {} exists in Okta; pass its ID to retry", created);
                    }
                })?,
                Some(group_id) => {
                    let group_id = ResourceId::new(group_id.to_string())?;
                    let prior = GroupState::placeholder(group_id.clone(), config.skip_users);
                    let current = resource
                        .read(&group_id, &prior, cancel)
                        .await?
                        .ok_or_else(|| ProviderError::not_found("Group", group_id.as_str()))?;
                    resource.update(&group_id, &current, &config, cancel).await?
                }
            };
            print_json(&state);
        }
        Command::Delete(group_id) => {
            let group_id = ResourceId::new(group_id.to_string())?;
            resource.delete(&group_id, cancel).await?;
            println!("Deleted group {}", group_id);
        }
    }
    Ok(())
}

enum Command<'a> {
    Read(&'a str),
    Apply(&'a str, Option<&'a str>),
    Delete(&'a str),
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to render output: {}", e);
            process::exit(1);
        }
    }
}
