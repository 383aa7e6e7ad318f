//! Lineage inspection CLI.
//!
//! # Responsibility
//! - Lower a member snapshot file and print a deterministic `key=value` summary.
//! - Optionally write the verification snapshot JSON for diffing between runs.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lineage_core::{Forest, ForestSnapshot};

#[derive(Parser, Debug)]
#[command(name = "lineage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lower a member snapshot and print its forest summary.
    Inspect(InspectArgs),
    /// Print core linkage probe values.
    Ping,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input JSON array of member records.
    input: PathBuf,

    /// Node id whose children and grandchildren are reported.
    #[arg(long)]
    focus: Option<String>,

    /// Write the verification snapshot JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print the nested forest as compact JSON instead of the summary.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log level used when `--log-dir` is set.
    #[arg(long, default_value_t = lineage_core::default_log_level().to_string())]
    log_level: String,

    /// Absolute directory for rolling log files; logging is off without it.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Ping => {
            println!("lineage_core ping={}", lineage_core::ping());
            println!("lineage_core version={}", lineage_core::core_version());
            Ok(())
        }
    }
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    if let Some(log_dir) = &args.log_dir {
        lineage_core::init_logging(&args.log_level, &log_dir.to_string_lossy())
            .context("start logging")?;
    }

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read input '{}'", args.input.display()))?;
    let forest = lineage_core::lower_json(&text)
        .with_context(|| format!("lower '{}'", args.input.display()))?;
    let snapshot = forest.snapshot(args.focus.as_deref())?;
    log::info!(
        "event=cli_inspect module=cli status=ok focus={} json={} snapshot={}",
        args.focus.is_some(),
        args.json,
        args.snapshot.is_some()
    );

    if args.json {
        let nested = forest.nested_json().context("render nested forest")?;
        println!("{nested}");
    } else {
        print_summary(&forest, &snapshot);
    }

    if let Some(path) = &args.snapshot {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create snapshot dir '{}'", parent.display()))?;
        }
        std::fs::write(path, snapshot.to_json_pretty()? + "\n")
            .with_context(|| format!("write snapshot '{}'", path.display()))?;
        if !args.json {
            println!("snapshot={}", path.display());
        }
    }
    Ok(())
}

fn print_summary(forest: &Forest, snapshot: &ForestSnapshot) {
    println!("members={}", forest.member_count());
    println!("family_units={}", forest.family_unit_count());
    println!("roots={}", snapshot.roots.join(","));
    println!(
        "max_depth={}",
        forest
            .max_depth()
            .map_or_else(|| "none".to_string(), |depth| depth.to_string())
    );

    for root in forest.roots() {
        println!(
            "root id={} kind={} children={}",
            root.id(),
            root.kind().as_str(),
            root.children.len()
        );
    }

    if let Some(focus) = &snapshot.focus {
        let children: Vec<&str> = focus.children.iter().map(|c| c.id.as_str()).collect();
        println!("focus id={} children={}", focus.id, children.join(","));
        for grandchild in &focus.grandchildren {
            println!(
                "grandchild id={} via={}",
                grandchild.id, grandchild.via_id
            );
        }
    }

    for unit in &snapshot.family_units {
        println!(
            "family_unit id={} children={}",
            unit.id,
            unit.children.join(",")
        );
    }
}
