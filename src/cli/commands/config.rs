//! Configuration command implementation

use crate::config::{ConfigKey, ConfigValue, DistConfig};
use anyhow::Result;
use colored::Colorize;

/// Execute the config command
pub fn execute(
    key: Option<String>,
    value: Option<String>,
    list: bool,
    unset: bool,
    show_origin: bool,
    json: bool,
) -> Result<()> {
    let mut config = DistConfig::load()?;

    if show_origin {
        let config_path = DistConfig::config_path()?;
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config_path.display().to_string(),
                    "exists": config_path.exists()
                })
            );
        } else {
            println!("{}: {}", "Configuration file".bold(), config_path.display().to_string().cyan());
            if config_path.exists() {
                println!("{}: {}", "Status".bold(), "exists".green());
            } else {
                println!("{}: {}", "Status".bold(), "not created yet".yellow());
            }
        }
        return Ok(());
    }

    if list {
        return list_configuration(&config, json);
    }

    let Some(key_str) = key else {
        print_usage(json);
        return Ok(());
    };

    let config_key = ConfigKey::parse(&key_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {}", key_str))?;

    if unset {
        config.unset(config_key);
        config.save()?;

        if json {
            println!(
                "{}",
                serde_json::json!({ "action": "unset", "key": key_str, "status": "success" })
            );
        } else {
            println!("{} {}", "✓".green(), format!("Unset {}", key_str).bold());
        }
    } else if let Some(value_str) = value {
        config.set(config_key, ConfigValue::parse(&value_str))?;
        config.save()?;

        if json {
            println!(
                "{}",
                serde_json::json!({
                    "action": "set",
                    "key": key_str,
                    "value": value_str,
                    "status": "success"
                })
            );
        } else {
            println!("{} {} = {}", "✓".green(), key_str.bold(), value_str.cyan());
        }
    } else {
        match config.get(config_key) {
            Some(value) if json => {
                println!("{}", serde_json::json!({ "key": key_str, "value": value.to_string() }));
            },
            Some(value) => println!("{}", value),
            None if json => {
                println!(
                    "{}",
                    serde_json::json!({ "key": key_str, "value": null, "error": "not set" })
                );
            },
            None => {
                eprintln!("{}", format!("Configuration key '{}' is not set", key_str).yellow());
                return Err(anyhow::anyhow!("Configuration key not found"));
            },
        }
    }

    Ok(())
}

/// List all configuration values
fn list_configuration(config: &DistConfig, json: bool) -> Result<()> {
    let entries = config.list();

    if json {
        let config_map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&config_map)?);
    } else if entries.is_empty() {
        println!("{}", "No configuration values set".yellow());
    } else {
        for (key, value) in entries {
            println!("{} = {}", key.bold(), value.cyan());
        }
    }

    Ok(())
}

fn print_usage(json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "error": "No configuration key specified",
                "usage": "dist-archive config <key> [value] or --list"
            })
        );
        return;
    }

    println!("{}", "Configuration Management".green().bold());
    println!();
    println!("{}", "Usage:".bold());
    println!("  {} Get value", "dist-archive config <key>".cyan());
    println!("  {} Set value", "dist-archive config <key> <value>".cyan());
    println!("  {} List all", "dist-archive config --list".cyan());
    println!("  {} Unset value", "dist-archive config <key> --unset".cyan());
    println!();
    println!("{}", "Keys:".bold());
    for key in ConfigKey::ALL {
        println!("  {}", key.as_str().green());
    }
}
