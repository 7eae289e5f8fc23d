use configurator_schema::{
    build_defaults, build_panels, FieldControl, SchemaDocument, SchemaError,
};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: schema-inspect <schema.json>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  schema-inspect pricing.json");
        eprintln!("  RUST_LOG=warn schema-inspect *.json");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match inspect_file(file_path) {
            Ok(doc) => print_document(file_path, &doc),
            Err(e) => {
                eprintln!("✗ {} could not be read:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn inspect_file(path: &str) -> Result<SchemaDocument, SchemaError> {
    let content = fs::read_to_string(path).map_err(|e| SchemaError::ReadError {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    SchemaDocument::from_json_str(&content)
}

fn print_document(path: &str, doc: &SchemaDocument) {
    if doc.is_empty() {
        println!("✓ {} has no panels", path);
        return;
    }

    let defaults = build_defaults(doc);
    println!("✓ {} ({} panels, {} keys)", path, doc.panels.len(), defaults.len());

    for panel in build_panels(doc) {
        println!("  {}", panel.title);
        for control in &panel.fields {
            let default = defaults.get(control.prop()).map(String::as_str).unwrap_or("");
            match control {
                FieldControl::Text { label, prop } => {
                    println!("    {} [{}] text = {:?}", label, prop, default);
                }
                FieldControl::Choice {
                    label,
                    prop,
                    options,
                } => {
                    let choices: Vec<String> = options
                        .iter()
                        .map(|o| format!("{}={}", o.label, o.value))
                        .collect();
                    println!(
                        "    {} [{}] choice({}) = {:?}",
                        label,
                        prop,
                        choices.join(", "),
                        default
                    );
                }
            }
        }
    }
}

fn print_error(error: &SchemaError) {
    match error {
        SchemaError::JsonError {
            line,
            column,
            message,
        } => {
            eprintln!("  JSON error at line {}, column {}:", line, column);
            eprintln!("    {}", message);
        }
        SchemaError::ReadError { reason, .. } => {
            eprintln!("  Read error:");
            eprintln!("    {}", reason);
        }
    }
}
