use clap::Parser;
use colored::*;
use serde_json::Value;

use modreg::builtin::builtin_factories;
use modreg::cli::{parse_json_arg, Args, Command};
use modreg::logging::init_tracing;
use modreg::{ModuleRegistry, RegistryConfig};

fn build_registry(config: RegistryConfig) -> ModuleRegistry<Value> {
    ModuleRegistry::with_config(config).with_factories(builtin_factories())
}

fn print_catalog(registry: &ModuleRegistry<Value>) {
    println!("{}", format!("{} module(s) loaded", registry.len()).bold());
    for id in registry.modules_list() {
        let Some(entry) = registry.retrieve(&id) else {
            continue;
        };
        let state = if registry.is_initialized(&id) {
            "initialized".green()
        } else if entry.has_init_hook() {
            "pending".yellow()
        } else {
            "no hook".dimmed()
        };
        println!(
            "  {} {} [{}] {}",
            id.bright_cyan(),
            entry.source_path.display(),
            entry.kind().unwrap_or("-"),
            state
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();
    let config = args.resolve_config()?;

    match args.command {
        Command::Scan { dir } => {
            let registry = build_registry(config);
            for name in registry.identify_modules(&dir)? {
                println!("{}", name);
            }
        }
        Command::Load { dir, init, context } => {
            let ctx = parse_json_arg("context", &context)?;
            let mut registry = build_registry(config);
            let outcomes = registry.load(&dir)?;
            for outcome in outcomes.iter().filter(|o| !o.is_loaded()) {
                if let Err(e) = &outcome.result {
                    eprintln!("{} {}: {}", "skipped".bright_red(), outcome.file_name, e);
                }
            }
            if init {
                let invoked = registry.init_modules(&ctx)?;
                eprintln!("{} {} init hook(s)", "ran".bright_green(), invoked);
            }
            print_catalog(&registry);
        }
        Command::Exec {
            dir,
            id,
            args: raw_args,
            context,
        } => {
            let ctx = parse_json_arg("context", &context)?;
            let call_args = parse_json_arg("args", &raw_args)?;
            let mut registry = build_registry(config);
            registry.load(&dir)?;
            registry.init_modules(&ctx)?;

            let executable = registry
                .retrieve_executable(&id)
                .ok_or_else(|| format!("module '{}' is not loaded or has no executable", id))?;
            let output = executable
                .execute(call_args)
                .map_err(|e| e as Box<dyn std::error::Error>)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
