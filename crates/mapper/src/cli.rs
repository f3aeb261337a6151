use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate as generate_completions, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use infomap_core::{CategoryPolicy, Classifier, Retention, Theme};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use infomap::{
    convert, format_reconcile_report, format_summary, generate, load_persisted, read_csv,
    save_mapping, Config, GenerateOptions, Layout, PersistedStatus, TerminalResolver, WriteAction,
};

const TICK_MS: u64 = 80;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(" {spinner} {msg}")
        .unwrap()
        .tick_chars("▏▎▍▌▋▊▉█▉▋▌▍▎")
}

#[derive(Parser)]
#[command(name = "infomap")]
#[command(version)]
#[command(about = "Keep infographic slide mappings stable across regenerations")]
struct Cli {
    #[arg(short, long, global = true, env = "INFOMAP_CONFIG", help = "Config file (.json or .yaml)")]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "More log output (-v, -vv)")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an asset directory and update its mapping file
    Generate {
        #[arg(short, long, help = "Asset directory [default: from config or current dir]")]
        dir: Option<PathBuf>,
        #[arg(short, long, help = "Mapping file [default: <dir>/mapping.json]")]
        mapping: Option<PathBuf>,
        #[arg(short, long, value_enum, help = "Directory layout")]
        layout: Option<Layout>,
        #[arg(long, help = "Flat layout: also pick up files without the theme suffix")]
        all_variants: bool,
        #[arg(long, help = "Ask for slide numbers of new assets")]
        manual: bool,
        #[arg(long, help = "Keep entries whose files are gone")]
        keep_missing: bool,
        #[arg(long, help = "Reclassify categories of existing entries")]
        recompute_categories: bool,
        #[arg(long, help = "Show the result without writing")]
        dry_run: bool,
        #[arg(long, help = "Exit with error if the mapping is out of date")]
        check: bool,
    },
    /// Convert an asset spreadsheet into a mapping file
    Convert {
        #[arg(help = "CSV with filename,title,slide_number,category,theme columns")]
        csv: PathBuf,
        #[arg(short, long, default_value = "mapping.json", help = "Output file")]
        output: PathBuf,
        #[arg(short, long, help = "Keep only this theme (e.g. bcore, light)")]
        theme: Option<String>,
    },
    /// Print the category each filename would get
    Classify {
        #[arg(required = true, help = "Filenames to classify")]
        names: Vec<String>,
    },
    /// Show category counts of a mapping file
    Summary {
        #[arg(short, long, help = "Mapping file [default: from config]")]
        mapping: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(help = "Shell to generate for (bash, zsh, fish, powershell)")]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            dir,
            mapping,
            layout,
            all_variants,
            manual,
            keep_missing,
            recompute_categories,
            dry_run,
            check,
        } => {
            let mut config = config;
            if let Some(dir) = dir {
                config.mapping_path = None;
                config.assets_dir = dir;
            }
            if let Some(mapping) = mapping {
                config.mapping_path = Some(mapping);
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if all_variants {
                config.primary_theme_only = false;
            }
            if keep_missing {
                config.retention = Retention::Additive;
            }
            if recompute_categories {
                config.category_policy = CategoryPolicy::Recompute;
            }
            cmd_generate(&config, manual, GenerateOptions { dry_run, check })
        }
        Commands::Convert { csv, output, theme } => cmd_convert(&csv, &output, theme.as_deref()),
        Commands::Classify { names } => cmd_classify(&config, &names),
        Commands::Summary { mapping } => {
            let path = mapping.unwrap_or_else(|| config.mapping_path());
            cmd_summary(&config, &path)
        }
        Commands::Completions { shell } => {
            generate_completions(shell, &mut Cli::command(), "infomap", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn cmd_generate(config: &Config, manual: bool, options: GenerateOptions) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(format!("Scanning {}", config.assets_dir.display()));
    if !manual {
        pb.enable_steady_tick(Duration::from_millis(TICK_MS));
    }

    let outcome = if manual {
        pb.finish_and_clear();
        let mut resolver = TerminalResolver::stdio();
        generate(config, &options, Some(&mut resolver))?
    } else {
        let outcome = generate(config, &options, None);
        pb.finish_and_clear();
        outcome?
    };

    if let PersistedStatus::Malformed(reason) = &outcome.persisted {
        eprintln!(
            "[!] Ignored unreadable {}: {}",
            config.mapping_path().display(),
            reason
        );
    }

    print!("{}", format_reconcile_report(outcome.report()));
    println!();

    let mapping_path = config.mapping_path();
    let path = mapping_path.display();
    match outcome.action {
        WriteAction::Written => println!("New mapping written to {}", path),
        WriteAction::Unchanged => println!("{} is up to date", path),
        WriteAction::DryRun => println!("Dry run, {} not written", path),
        WriteAction::Stale => anyhow::bail!("{} is out of date, run `infomap generate`", path),
    }
    print!("{}", format_summary(&outcome.reconciliation.mapping));

    Ok(())
}

fn cmd_convert(csv: &Path, output: &Path, theme: Option<&str>) -> Result<()> {
    let records = read_csv(csv).with_context(|| format!("reading {}", csv.display()))?;
    let theme = theme.map(Theme::new);
    let mapping = convert(records, theme.as_ref())?;

    save_mapping(output, &mapping)?;

    println!("Converted {} to {}", csv.display(), output.display());
    print!("{}", format_summary(&mapping));

    Ok(())
}

fn cmd_classify(config: &Config, names: &[String]) -> Result<()> {
    let classifier = config.classifier();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    for name in names {
        println!("{:<width$}  {}", name, classifier.classify(name), width = width);
    }

    Ok(())
}

fn cmd_summary(config: &Config, mapping: &Path) -> Result<()> {
    let load = load_persisted(mapping, &config.classifier());

    match load.status {
        PersistedStatus::Missing => anyhow::bail!("{} not found", mapping.display()),
        PersistedStatus::Malformed(reason) => {
            anyhow::bail!("{} is not a valid mapping: {}", mapping.display(), reason)
        }
        PersistedStatus::Loaded(_) => {
            println!("Mapping: {}", mapping.display());
            print!("{}", format_summary(&load.mapping));
            Ok(())
        }
    }
}
