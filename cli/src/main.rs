use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use entity_schema_core::{
    Schema, SchemaBundle, ValidationMode, ValidationOptions, Validator, check_bundle,
    check_schema,
};
use entity_schema_registry::{RegistryConfig, read_schema, seal_bundle};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "schema-check")]
#[command(about = "Entity schema checking, bundling and payload validation")]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a JSON payload against a schema.
    Validate(ValidateArgs),
    /// Run structural checks over schema JSON files.
    Check(CheckArgs),
    /// Bundle schema JSON files into a hashed SchemaBundle file.
    Bundle(BundleArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema JSON file.
    #[arg(long, required_unless_present = "name", conflicts_with = "name")]
    schema: Option<PathBuf>,
    /// Schema name looked up in the registry described by --config.
    #[arg(long, requires = "config")]
    name: Option<String>,
    /// Payload JSON file, or `-` for stdin.
    #[arg(long)]
    payload: PathBuf,
    /// Validate nested objects and array elements recursively.
    #[arg(long)]
    deep: bool,
    /// Registry configuration YAML (validation settings and schema sources).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema files and/or directories containing schema JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Schema files and/or directories containing schema JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output JSON bundle path.
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Check(args) => run_check(args),
        Command::Bundle(args) => run_bundle(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let config = args
        .config
        .as_ref()
        .map(|path| {
            RegistryConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))
        })
        .transpose()?;

    let mut options = config
        .as_ref()
        .map(|c| c.validation)
        .unwrap_or_default();
    if args.deep {
        options.mode = ValidationMode::Deep;
    }

    let schema = match (&args.schema, &args.name, &config) {
        (Some(path), _, _) => read_schema(path)
            .map_err(|err| format!("Failed to read schema '{}': {err}", path.display()))?,
        (None, Some(name), Some(config)) => {
            let registry = config.open_registry().map_err(|err| err.to_string())?;
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| format!("Schema '{name}' not found in configured sources"))?
        }
        _ => return Err("Either --schema or --name with --config is required".to_string()),
    };

    let payload = read_payload(&args.payload)?;
    let violations = validate_with(&options, &payload, &schema);

    for violation in &violations {
        println!("{violation}");
    }

    if violations.is_empty() {
        info!(schema = %schema.name, "payload is valid");
        Ok(())
    } else {
        Err(format!(
            "{} violation(s) found against schema '{}'",
            violations.len(),
            schema.name
        ))
    }
}

fn validate_with(
    options: &ValidationOptions,
    payload: &[u8],
    schema: &Schema,
) -> Vec<entity_schema_core::Violation> {
    debug!(mode = ?options.mode, max_depth = options.max_depth, "validating payload");
    Validator::new(*options).validate_payload(payload, schema)
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let paths = collect_schema_paths(&args.inputs)?;
    let schemas = load_schemas(&paths)?;

    let mut problems = 0;
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (path, schema) in paths.iter().zip(&schemas) {
        if !seen.insert(schema.name.as_str()) {
            println!("{}: duplicate schema name '{}'", path.display(), schema.name);
            problems += 1;
        }
        for issue in check_schema(schema) {
            println!("{}: {issue}", path.display());
            problems += 1;
        }
    }

    if problems > 0 {
        return Err(format!("{problems} issue(s) found"));
    }

    println!("Checked {} schema file(s); no issues found.", paths.len());
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let paths = collect_schema_paths(&args.inputs)?;
    let mut schemas = load_schemas(&paths)?;
    schemas.sort_by(|a, b| a.name.cmp(&b.name));

    let mut bundle = SchemaBundle::new(PACKAGE_VERSION, chrono::Utc::now().to_rfc3339());
    bundle.name = args.name;
    bundle.description = args.description;
    bundle.schemas = schemas;

    let issues = check_bundle(&bundle);
    if !issues.is_empty() {
        let details = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(format!("Refusing to bundle malformed schemas: {details}"));
    }

    seal_bundle(&mut bundle).map_err(|err| format!("Failed to hash schema bundle: {err}"))?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = serde_json::to_string_pretty(&bundle)
        .map_err(|err| format!("Failed to serialize schema bundle: {err}"))?;
    fs::write(&args.output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        bundle.schema_count(),
        args.output.display()
    );

    Ok(())
}

fn read_payload(path: &Path) -> Result<Vec<u8>, String> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| format!("Failed to read payload from stdin: {err}"))?;
        return Ok(buf);
    }
    fs::read(path).map_err(|err| format!("Failed to read payload '{}': {err}", path.display()))
}

/// Expands files and directories into a sorted, de-duplicated list of
/// `*.json` schema paths.
fn collect_schema_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
            for entry in entries {
                let path = entry
                    .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?
                    .path();
                if path.extension() == Some(OsStr::new("json")) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if input.extension() != Some(OsStr::new("json")) {
                return Err(format!(
                    "Schema file '{}' must end in .json",
                    input.display()
                ));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(format!("Schema path '{}' does not exist", input.display()));
    }

    if paths.is_empty() {
        return Err("No schema JSON files found".to_string());
    }

    Ok(paths.into_iter().collect())
}

fn load_schemas(paths: &[PathBuf]) -> Result<Vec<Schema>, String> {
    paths
        .iter()
        .map(|path| {
            read_schema(path)
                .map_err(|err| format!("Failed to read schema '{}': {err}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_verbose_levels() {
        let args = ["schema-check", "check", "schemas/"];
        assert_eq!(Cli::try_parse_from(args).unwrap().verbose, 0);

        let cli = Cli::try_parse_from(["schema-check", "-vv", "check", "schemas/"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_validate_requires_schema_or_name() {
        let missing = Cli::try_parse_from(["schema-check", "validate", "--payload", "p.json"]);
        assert!(missing.is_err());

        let name_without_config = Cli::try_parse_from([
            "schema-check",
            "validate",
            "--name",
            "user",
            "--payload",
            "p.json",
        ]);
        assert!(name_without_config.is_err());

        let both = Cli::try_parse_from([
            "schema-check",
            "validate",
            "--schema",
            "user.json",
            "--name",
            "user",
            "--config",
            "c.yml",
            "--payload",
            "p.json",
        ]);
        assert!(both.is_err());

        let ok = Cli::try_parse_from([
            "schema-check",
            "validate",
            "--schema",
            "user.json",
            "--payload",
            "-",
            "--deep",
        ])
        .unwrap();
        match ok.command {
            Command::Validate(args) => {
                assert!(args.deep);
                assert_eq!(args.payload, PathBuf::from("-"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn collect_schema_paths_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("schema_check_collect_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.json"), "{}").unwrap();
        fs::write(dir.join("a.json"), "{}").unwrap();
        fs::write(dir.join("readme.md"), "").unwrap();

        let paths = collect_schema_paths(&[dir.clone(), dir.join("a.json")]).unwrap();
        assert_eq!(paths, vec![dir.join("a.json"), dir.join("b.json")]);

        assert!(collect_schema_paths(&[dir.join("readme.md")]).is_err());
        assert!(collect_schema_paths(&[dir.join("missing.json")]).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
