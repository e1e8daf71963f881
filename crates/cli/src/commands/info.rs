//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    request: RequestInfo,
    limits: LimitsInfo,
}

#[derive(Serialize)]
struct RequestInfo {
    endpoint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamInfo>,
    param_count: usize,
}

#[derive(Serialize)]
struct ParamInfo {
    name: String,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct LimitsInfo {
    item_limit: usize,
    unbounded: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::UploaderBlueprint, args: &InfoArgs) -> ConfigInfo {
    let params = if args.params {
        let mut params: Vec<ParamInfo> = blueprint
            .request
            .params
            .iter()
            .map(|(name, value)| ParamInfo {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        params.sort_by(|a, b| a.name.cmp(&b.name));
        params
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        request: RequestInfo {
            endpoint: blueprint.request.endpoint.clone(),
            params,
            param_count: blueprint.request.params.len(),
        },
        limits: LimitsInfo {
            item_limit: blueprint.limits.item_limit,
            unbounded: blueprint.limits.item_limit == 0,
        },
    }
}

fn print_config_info(blueprint: &contracts::UploaderBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Upload Gate Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Request info
    println!("📤 Request");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   └─ Endpoint: {}", blueprint.request.endpoint);

    // Default parameters
    println!(
        "\n🔧 Default Parameters ({})",
        blueprint.request.params.len()
    );
    if args.params && !blueprint.request.params.is_empty() {
        let mut names: Vec<_> = blueprint.request.params.keys().collect();
        names.sort();
        for (i, name) in names.iter().enumerate() {
            let is_last = i == names.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} = {}", prefix, name, blueprint.request.params[*name]);
        }
    } else if blueprint.request.params.is_empty() {
        println!("   └─ (none)");
    } else {
        println!("   └─ (pass --params to list)");
    }

    // Limits
    println!("\n⚙️  Limits");
    if blueprint.limits.item_limit == 0 {
        println!("   └─ Item limit: unlimited");
    } else {
        println!("   └─ Item limit: {}", blueprint.limits.item_limit);
    }

    println!();
}
