//! `ulrp`: headless access to the site content collections.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use ulrp_lib::auth::sha256_hex;
use ulrp_lib::leaderboard;
use ulrp_lib::model::Record;
use ulrp_lib::render::rules::RulesPage;
use ulrp_lib::status::StatusBoard;
use ulrp_lib::store::SiteSource;
use ulrp_lib::{init_tracing, FormKind, Site, SiteConfig};

/// Urban Legends RP content tool.
#[derive(Parser, Debug)]
#[command(name = "ulrp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ~/.ulrp/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Site directory or base URL holding data/*.json.
    #[arg(long, global = true)]
    site_root: Option<String>,

    /// Directory the collections are persisted in.
    #[arg(long, global = true)]
    storage_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Updates,
    RuleChanges,
    Rules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormArg {
    Update,
    RuleChange,
    Category,
    Rule,
}

impl From<FormArg> for FormKind {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Update => FormKind::Update,
            FormArg::RuleChange => FormKind::RuleChange,
            FormArg::Category => FormKind::Category,
            FormArg::Rule => FormKind::Rule,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Page {
    Updates,
    RuleChanges,
    Rules,
    Leaderboard,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ids and titles of a collection.
    List {
        #[arg(value_enum)]
        collection: Kind,
    },

    /// Print the HTML a page container would hold.
    Render {
        #[arg(value_enum)]
        page: Page,

        /// Render the admin list instead of the public one.
        #[arg(long)]
        admin: bool,
    },

    /// Create or edit a record from a form in JSON. A form with an id edits
    /// that record; without one a new record is added.
    Save {
        #[arg(value_enum)]
        form: FormArg,

        /// JSON file holding the form, or `-` for stdin.
        file: PathBuf,
    },

    /// Write the collections as deployable JSON files.
    Export {
        /// Output directory for the three JSON files.
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Write a zip bundle to this path instead.
        #[arg(long)]
        bundle: Option<PathBuf>,
    },

    /// Query the game server and the Discord widget once.
    Status,

    /// Print the SHA-256 digest to put in `adminPasswordSha256`.
    HashPassword { password: String },

    /// Print the effective configuration, optionally saving it.
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn load_config(cli: &Cli) -> SiteConfig {
    let mut config = match &cli.config {
        Some(path) => SiteConfig::read(path).unwrap_or_default(),
        None => SiteConfig::load(),
    };
    if cli.config.is_some() {
        config.apply_env(|key| std::env::var(key).ok());
    }
    if let Some(root) = &cli.site_root {
        config.site_root = root.clone();
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    config
}

fn print_list<R: Record>(records: &[R], title: impl Fn(&R) -> &str) {
    if records.is_empty() {
        println!("(empty)");
    }
    for record in records {
        println!("{}\t{}", record.id(), title(record));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli);

    match cli.command {
        Commands::List { collection } => {
            let site = Site::open(&config).await?;
            match collection {
                Kind::Updates => print_list(site.updates.store().records(), |r| &r.title),
                Kind::RuleChanges => print_list(site.rule_changes.store().records(), |r| &r.title),
                Kind::Rules => {
                    for category in site.rules.categories().store().records() {
                        println!("{}\t{} {}", category.id, category.icon, category.name);
                        for rule in &category.rules {
                            println!("  {}\t{}", rule.id, rule.title);
                        }
                    }
                }
            }
        }
        Commands::Render { page, admin } => {
            let mut html = String::new();
            match page {
                Page::Leaderboard => {
                    let source = SiteSource::from_root(&config.site_root());
                    let (podium, rows) = leaderboard::render(&leaderboard::load(&source).await);
                    html = format!("{podium}\n{rows}");
                }
                Page::Updates => {
                    let site = Site::open(&config).await?;
                    if admin {
                        site.updates.render(&mut html);
                    } else {
                        site.render_public_updates(&mut html);
                    }
                }
                Page::RuleChanges => {
                    let site = Site::open(&config).await?;
                    if admin {
                        site.rule_changes.render(&mut html);
                    } else {
                        site.render_public_rule_changes(&mut html);
                    }
                }
                Page::Rules => {
                    let site = Site::open(&config).await?;
                    if admin {
                        site.rules.categories().render(&mut html);
                    } else {
                        let rules_page: RulesPage = site.rules_page();
                        let mut toc = String::new();
                        rules_page.render(&mut toc, &mut html);
                        println!(
                            "<!-- {} reguli, actualizat {} -->",
                            rules_page.total_rules, rules_page.last_updated
                        );
                        println!("{toc}");
                    }
                }
            }
            println!("{html}");
        }
        Commands::Save { form, file } => {
            let json = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("reading form from stdin")?
            } else {
                std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?
            };
            let mut site = Site::open(&config).await?;
            let saved = site.save_json(form.into(), &json)?;
            println!("{}\t{}", saved.submission.id, saved.submission.message);
        }
        Commands::Export { dir, bundle } => {
            let site = Site::open(&config).await?;
            match bundle {
                Some(path) => {
                    let written = site
                        .export_bundle(&path)
                        .with_context(|| format!("writing bundle {}", path.display()))?;
                    println!("{}", written.display());
                }
                None => {
                    for path in site.export_all(&dir).context("exporting collections")? {
                        println!("{}", path.display());
                    }
                }
            }
        }
        Commands::Status => {
            let board = StatusBoard::new(&config);
            let snapshot = board.refresh_once().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::HashPassword { password } => {
            println!("{}", sha256_hex(&password));
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = match cli.config {
                    Some(path) => path,
                    None => ulrp_lib::config::config_path().context("cannot find home directory")?,
                };
                config.save(&path)?;
                tracing::info!("Saved config to {}", path.display());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
