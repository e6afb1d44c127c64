//! Object Types Sequencer
//!
//! Loads an object type registration list and prints the order in which the
//! types must be exported or imported.
//!
//! # Usage
//!
//! ```bash
//! # Full sequence for every registered type
//! object-types --config object-types.yaml
//!
//! # Selected types, page categories folded into pages, JSON output
//! object-types --config object-types.yaml --type cms.site --type cms.page \
//!     --fold-binding cms.pagecategory --json
//!
//! # Report dependency cycles
//! object-types --config object-types.yaml --show-cycles
//! ```

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use object_types::{
    IncludedTypesFilter, ObjectTypesConfig, OutputItem, SequenceAnalyzer, TypeRegistry,
};
use tracing_subscriber::EnvFilter;

/// Object Types Sequencer
///
/// Computes the dependency-safe processing order of object types.
#[derive(Parser, Debug)]
#[command(name = "object-types")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Registration list (YAML); `OBJECT_TYPES__*` variables override it
    #[arg(long, short = 'c', value_name = "FILE")]
    config: PathBuf,

    /// Restrict the run to these types (can be specified multiple times)
    /// Defaults to every registered type
    #[arg(long = "type", short = 't', value_name = "NAME", action = clap::ArgAction::Append)]
    types: Vec<String>,

    /// Types emitted standalone (can be specified multiple times)
    /// Defaults to every type of the run
    #[arg(long, short = 'i', value_name = "NAME", action = clap::ArgAction::Append)]
    include: Vec<String>,

    /// Child types processed together with their parent
    #[arg(long, value_name = "NAME", action = clap::ArgAction::Append)]
    fold_child: Vec<String>,

    /// Binding types processed together with their parent
    #[arg(long, value_name = "NAME", action = clap::ArgAction::Append)]
    fold_binding: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Print the traversal and report dependency cycles
    #[arg(long)]
    show_cycles: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ObjectTypesConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let registry = TypeRegistry::from_config(&config).context("registering object types")?;
    let catalog = registry.ensure_all().context("building object type catalog")?;
    tracing::info!(types = catalog.len(), "Registration list loaded");

    let requested: Vec<String> = if cli.types.is_empty() {
        catalog.all_types().to_vec()
    } else {
        cli.types.clone()
    };
    let included = if cli.include.is_empty() {
        &requested
    } else {
        &cli.include
    };
    let filter = IncludedTypesFilter::new(included)
        .with_folded_children(&cli.fold_child)
        .with_folded_bindings(&cli.fold_binding);

    let trace = RefCell::new(Vec::new());
    let mut analyzer = SequenceAnalyzer::with_types(&catalog, &filter, &requested);
    if cli.show_cycles {
        analyzer = analyzer.with_log(|message, indent, is_cycle| {
            trace
                .borrow_mut()
                .push((message.to_owned(), indent, is_cycle));
        });
    }
    let items: Vec<OutputItem> = analyzer.sequence().collect();

    if cli.json {
        let json = serde_json::to_string_pretty(&items).context("serializing sequence")?;
        println!("{json}");
    } else {
        print_sequence(&items);
    }
    if cli.show_cycles {
        print_trace(&trace.borrow());
    }
    Ok(())
}

fn print_sequence(items: &[OutputItem]) {
    println!("{}", "=".repeat(80));
    println!("  {}", "OBJECT TYPE SEQUENCE".bold());
    println!("{}", "=".repeat(80));

    for (index, item) in items.iter().enumerate() {
        let mut line = format!("{:>4}. {}", index + 1, item.object_type);
        let has_site_variant = items
            .iter()
            .any(|i| i.object_type == item.object_type && i.is_site_object);
        if !item.is_site_object && has_site_variant {
            line.push_str(&" (global)".dimmed().to_string());
        }
        if item.has_dynamic_dependency {
            line.push_str(&" (dynamic)".yellow().to_string());
        }
        println!("{line}");
    }
    println!("{}", "=".repeat(80));
    println!("  Items: {}", items.len());
}

fn print_trace(trace: &[(String, usize, bool)]) {
    let cycles = trace.iter().filter(|(_, _, is_cycle)| *is_cycle).count();

    eprintln!();
    eprintln!("{}", "-".repeat(80));
    eprintln!("  {}", "TRAVERSAL".bold());
    eprintln!("{}", "-".repeat(80));
    for (message, indent, is_cycle) in trace {
        let pad = "  ".repeat(*indent);
        if *is_cycle {
            eprintln!("{pad}{}", message.red());
        } else {
            eprintln!("{pad}{message}");
        }
    }
    eprintln!("{}", "-".repeat(80));
    if cycles == 0 {
        eprintln!("{}", "\u{2713} No dependency cycles".green());
    } else {
        eprintln!("{}", format!("\u{2717} {cycles} dependency cycle(s) detected").red());
    }
}
