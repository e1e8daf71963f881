//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    endpoint: String,
    default_param_count: usize,
    item_limit: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    endpoint: blueprint.request.endpoint.clone(),
                    default_param_count: blueprint.request.params.len(),
                    item_limit: blueprint.limits.item_limit,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::UploaderBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.request.params.is_empty() {
        warnings.push(
            "request.params is empty - requests carry no default parameters".to_string(),
        );
    }

    if blueprint.limits.item_limit == 0 {
        warnings.push("limits.item_limit is 0 - the queue is unbounded".to_string());
    }

    if blueprint.request.endpoint.starts_with("http://") {
        warnings.push("request.endpoint uses plain http - uploads will not be encrypted".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Endpoint: {}", summary.endpoint);
            println!("  Default parameters: {}", summary.default_param_count);
            if summary.item_limit == 0 {
                println!("  Item limit: unlimited");
            } else {
                println!("  Item limit: {}", summary.item_limit);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(path: &std::path::Path) -> ValidateArgs {
        ValidateArgs {
            config: path.to_path_buf(),
            json: false,
        }
    }

    #[test]
    fn test_validate_missing_file() {
        let args = args_for(std::path::Path::new("/nonexistent/config.toml"));
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_validate_good_config() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[request]
endpoint = "https://uploads.example.com/files"

[request.params]
source = "test"

[limits]
item_limit = 16
"#
        )
        .unwrap();

        let result = validate_config(&args_for(file.path()));
        assert!(result.valid, "error: {:?}", result.error);
        let summary = result.summary.unwrap();
        assert_eq!(summary.endpoint, "https://uploads.example.com/files");
        assert_eq!(summary.item_limit, 16);
        assert!(result.warnings.is_none());
    }

    #[test]
    fn test_validate_bad_endpoint() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[request]
endpoint = "example.com/upload"
"#
        )
        .unwrap();

        let result = validate_config(&args_for(file.path()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("absolute http(s) URL"));
    }
}
