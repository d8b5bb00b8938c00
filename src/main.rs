use ants_site::generate::{self, SitePaths};
use ants_site::version::{FixedVersion, GitHistory, VersionSource};
use ants_site::{ants, config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Shared flags for commands that render the page.
#[derive(clap::Args, Clone)]
struct VersionArgs {
    /// Use this version number instead of counting git commits
    #[arg(long)]
    version_number: Option<u64>,
}

#[derive(Parser)]
#[command(name = "ants-site")]
#[command(about = "Generate the types of ants page and README")]
#[command(long_about = "\
Generate the types of ants page and README

The repository is the data source:

  <root>/
  ├── config.toml                          # Optional overrides (see gen-config)
  ├── ants.txt                             # One ant per line, in page order
  ├── index.html                           # Generated page
  ├── README.md                            # Generated README
  └── static_site/
      ├── releases/
      │   ├── 2024-02-03.json              # {\"Ants\": [...]} added that day
      │   └── 2024-02-04.json
      └── generate/
          └── index_template.html          # HTML with marker lines

The banner shows the release dated nearest to now. The version number is
the commit count of the repository unless --version-number is given.

Set RUST_LOG=ants_site=debug for diagnostics.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate index.html from the template
    Page {
        /// Repository root
        root: PathBuf,
        #[command(flatten)]
        version: VersionArgs,
    },
    /// Generate README.md from an ant list
    Readme {
        /// Ant list to read
        ants: PathBuf,
        /// README to write
        readme: PathBuf,
        /// Repository root holding config.toml (stock config if omitted)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Generate both index.html and README.md
    Build {
        /// Repository root
        root: PathBuf,
        #[command(flatten)]
        version: VersionArgs,
    },
    /// Validate inputs and render the page without writing it
    Check {
        /// Repository root
        root: PathBuf,
        #[command(flatten)]
        version: VersionArgs,
    },
    /// Insert new ants at random positions in ants.txt and publish them as today's release
    Add {
        /// Ants to add
        #[arg(required = true)]
        ants: Vec<String>,
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Page { root, version } => {
            let (paths, site_config) = load_site(&root)?;
            let versions = version_source(&root, &version);
            let report =
                generate::generate_page(&paths, &site_config, versions.as_ref(), now())?;
            output::print_page_report(&report, &root);
        }
        Command::Readme { ants, readme, root } => {
            let site_config = match root {
                Some(root) => config::load_config(&root)?,
                None => config::SiteConfig::default(),
            };
            let rules = site_config.rule_table()?;
            let report = generate::generate_readme(&ants, &readme, &rules, &site_config.layout)?;
            output::print_readme_report(&report);
        }
        Command::Build { root, version } => {
            let (paths, site_config) = load_site(&root)?;
            let versions = version_source(&root, &version);

            println!("==> Page: {}", paths.page.display());
            let report =
                generate::generate_page(&paths, &site_config, versions.as_ref(), now())?;
            output::print_page_report(&report, &root);

            println!("==> README: {}", paths.readme.display());
            let rules = site_config.rule_table()?;
            let report =
                generate::generate_readme(&paths.ants, &paths.readme, &rules, &site_config.layout)?;
            output::print_readme_report(&report);

            println!("==> Build complete");
        }
        Command::Check { root, version } => {
            let (paths, site_config) = load_site(&root)?;
            let versions = version_source(&root, &version);
            println!("==> Checking {}", root.display());
            let report = generate::check_page(&paths, &site_config, versions.as_ref(), now())?;
            output::print_page_report(&report, &root);
        }
        Command::Add { ants: new_ants, root } => {
            let (paths, site_config) = load_site(&root)?;
            generate::require_file(&paths.ants)?;
            generate::require_dir(&paths.releases)?;
            let today = chrono::Local::now().date_naive();
            let added = ants::add_ants(
                &paths.ants,
                &paths.releases,
                &site_config.dates,
                &new_ants,
                today,
                &mut rand::rng(),
            )?;
            output::print_add_report(&new_ants, &added, &root);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays the command's report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ants_site=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Validate the root and resolve config and paths against it.
fn load_site(root: &Path) -> Result<(SitePaths, config::SiteConfig), Box<dyn std::error::Error>> {
    generate::require_dir(root)?;
    let site_config = config::load_config(root)?;
    let paths = SitePaths::resolve(root, &site_config.paths);
    Ok((paths, site_config))
}

fn version_source(root: &Path, args: &VersionArgs) -> Box<dyn VersionSource> {
    match args.version_number {
        Some(n) => Box::new(FixedVersion(n)),
        None => Box::new(GitHistory::new(root)),
    }
}

/// Local wall-clock time; release dates are calendar days in local time.
fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
