use clap::{Parser, Subcommand, ValueEnum};
use component_logic::{
    Change, apply_changes, evaluate_page, render_text, rule_schema, validate_rules,
};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Survey conditional-logic checker",
    long_about = "Evaluates, simulates and lints the conditional-logic rules attached to survey page markup"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Bind the page and report which questions are shown.
    Evaluate {
        /// Path to the page JSON describing the rendered markup.
        #[arg(long, value_name = "PAGE")]
        page: PathBuf,
        /// Optional config JSON (defaults to SURVEY_LOGIC_CONFIG, then built-in defaults).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Replay answers against the bound page and report every visibility change.
    Simulate {
        #[arg(long, value_name = "PAGE")]
        page: PathBuf,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Answer to apply, as `name=value`; repeat to apply several in order.
        #[arg(long = "change", value_name = "NAME=VALUE", value_parser = parse_change)]
        changes: Vec<Change>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Lint rule payloads; exits non-zero when issues are found.
    Validate {
        #[arg(long, value_name = "PAGE")]
        page: PathBuf,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the JSON Schema of the rule payload.
    Schema,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate {
            page,
            config,
            format,
        } => run_evaluate(page, config, format),
        Command::Simulate {
            page,
            config,
            changes,
            format,
        } => run_simulate(page, config, changes, format),
        Command::Validate { page, config } => run_validate(page, config),
        Command::Schema => {
            let schema = parse_component_result(&rule_schema())?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn parse_change(raw: &str) -> Result<Change, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("change name cannot be empty".into());
    }
    Ok(Change {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn read_config(config: Option<PathBuf>) -> CliResult<String> {
    let path = config.or_else(|| env::var_os("SURVEY_LOGIC_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Ok(fs::read_to_string(path)?)
        }
        None => Ok(String::new()),
    }
}

fn run_evaluate(page: PathBuf, config: Option<PathBuf>, format: RenderMode) -> CliResult<()> {
    let page_json = fs::read_to_string(&page)?;
    let config_json = read_config(config)?;
    let value = parse_component_result(&evaluate_page(&page_json, &config_json))?;
    match format {
        RenderMode::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        RenderMode::Text => {
            println!("{}", render_text(&page_json, &config_json));
            let widgets = &value["widgets"];
            println!(
                "Widgets: {} tooltips, {} popovers, {} alerts dismissed after {}ms",
                widgets["tooltips"],
                widgets["popovers"],
                widgets["alerts_pending"].as_array().map_or(0, Vec::len),
                widgets["dismiss_after_ms"]
            );
        }
    }
    Ok(())
}

fn run_simulate(
    page: PathBuf,
    config: Option<PathBuf>,
    changes: Vec<Change>,
    format: RenderMode,
) -> CliResult<()> {
    let page_json = fs::read_to_string(&page)?;
    let config_json = read_config(config)?;
    let changes_json = serde_json::to_string(&changes)?;
    let value = parse_component_result(&apply_changes(&page_json, &config_json, &changes_json))?;

    match format {
        RenderMode::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        RenderMode::Text => {
            for step in value["steps"].as_array().into_iter().flatten() {
                println!(
                    "{}={}",
                    step["name"].as_str().unwrap_or("<unknown>"),
                    step["value"].as_str().unwrap_or_default()
                );
                let decisions = step["decisions"].as_array().cloned().unwrap_or_default();
                if decisions.is_empty() {
                    println!("  (no dependent questions)");
                }
                for decision in decisions {
                    let state = if decision["shown"] == true {
                        "shown"
                    } else {
                        "hidden"
                    };
                    println!(
                        "  {} -> {}",
                        decision["question"].as_str().unwrap_or("<unknown>"),
                        state
                    );
                }
            }
            println!("{}", value["text"].as_str().unwrap_or_default());
        }
    }
    Ok(())
}

fn run_validate(page: PathBuf, config: Option<PathBuf>) -> CliResult<()> {
    let page_json = fs::read_to_string(&page)?;
    let config_json = read_config(config)?;
    let result = parse_component_result(&validate_rules(&page_json, &config_json))?;
    let valid = result["valid"].as_bool().unwrap_or(false);
    println!(
        "Validation result: {}",
        if valid { "valid" } else { "invalid" }
    );
    for issue in result["issues"].as_array().into_iter().flatten() {
        println!(
            "  {} [{}] {}",
            issue["path"].as_str().unwrap_or("<unknown>"),
            issue["code"].as_str().unwrap_or("<unknown>"),
            issue["message"].as_str().unwrap_or_default()
        );
    }

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}
