use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use pkgkit::config::TrackerConfig;
use pkgkit::registry::{HttpRegistryClient, RegistryClient};
use pkgkit::runtime::RealRuntime;
use pkgkit::scaffold::{NewPackageOptions, ScaffoldAction};
use pkgkit::tracker::TrackerRegistry;

/// pkgkit - package scaffolding and installation tracking
///
/// Scaffold a new package directory, or track the installation state of a
/// fixed list of remote packages against a package registry.
///
/// Examples:
///   pkgkit new MyPackage --author "Spencer Rawls"
///   pkgkit status
///   pkgkit add "Core Library"
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGKIT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry base URL (also via PKGKIT_REGISTRY_URL)
    #[arg(
        long = "registry-url",
        env = "PKGKIT_REGISTRY_URL",
        value_name = "URL",
        global = true
    )]
    pub registry_url: Option<String>,

    /// Tracked-package list file (also via PKGKIT_PACKAGES_FILE)
    #[arg(
        long = "packages-file",
        env = "PKGKIT_PACKAGES_FILE",
        value_name = "PATH",
        global = true
    )]
    pub packages_file: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scaffold a new package directory
    New(NewArgs),

    /// Show the installation state of every tracked package
    Status,

    /// Install a tracked package
    Add(PackageArgs),

    /// Remove a tracked package
    Remove(PackageArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Package name; whitespace and punctuation are stripped
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Human-readable name (defaults to NAME as typed)
    #[arg(long, value_name = "NAME")]
    pub display_name: Option<String>,

    /// Dotted identifier, e.g. com.owner.name (coerced into shape)
    #[arg(long, value_name = "ID")]
    pub full_name: Option<String>,

    #[arg(long, default_value = "Anonymous")]
    pub author: String,

    #[arg(long, default_value = "Fill me in!")]
    pub description: String,

    /// Directory to scaffold into
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Display or canonical name of a tracked package
    #[arg(value_name = "PACKAGE")]
    pub package: String,
}

/// One presentation frame.
const TICK: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match cli.command {
        Commands::New(args) => {
            let action = ScaffoldAction::new(&runtime, args.root.clone());
            let base = action.create(&NewPackageOptions {
                display_name: args.display_name.clone().unwrap_or_else(|| args.name.clone()),
                full_name: args.full_name.clone().unwrap_or_default(),
                name: args.name,
                author: args.author,
                description: args.description,
            })?;
            println!("Created package at {}", base.display());
        }
        Commands::Status => {
            let mut registry = build_registry(&runtime, cli.packages_file, cli.registry_url)?;
            registry.request_reconcile_all();
            drive(&mut registry).await;
            for tracker in registry.trackers() {
                println!("{:<24} {}", tracker.package().display_name, tracker.status());
            }
        }
        Commands::Add(args) => {
            let mut registry = build_registry(&runtime, cli.packages_file, cli.registry_url)?;
            registry.request_reconcile_all();
            drive(&mut registry).await;
            registry.request_add(&args.package)?;
            drive(&mut registry).await;
            report(&registry, &args.package);
        }
        Commands::Remove(args) => {
            let mut registry = build_registry(&runtime, cli.packages_file, cli.registry_url)?;
            registry.request_reconcile_all();
            drive(&mut registry).await;
            registry.request_remove(&args.package)?;
            drive(&mut registry).await;
            report(&registry, &args.package);
        }
    }
    Ok(())
}

fn build_registry(
    runtime: &RealRuntime,
    packages_file: Option<PathBuf>,
    registry_url: Option<String>,
) -> Result<TrackerRegistry<HttpRegistryClient>> {
    let config = TrackerConfig::load(runtime, packages_file.as_deref(), registry_url)?;
    let client = HttpRegistryClient::new(config.registry_url)?;
    Ok(TrackerRegistry::new(client, config.packages))
}

/// Cooperative scheduler loop: tick until every operation has resolved.
async fn drive<C: RegistryClient>(registry: &mut TrackerRegistry<C>) {
    loop {
        registry.on_tick();
        if registry.is_idle() {
            break;
        }
        tokio::time::sleep(TICK).await;
    }
}

fn report<C: RegistryClient>(registry: &TrackerRegistry<C>, package: &str) {
    if let Some(tracker) = registry.get(package) {
        println!("{:<24} {}", tracker.package().display_name, tracker.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_new_parsing() {
        let cli = Cli::try_parse_from(["pkgkit", "new", "MyPackage"]).unwrap();
        match cli.command {
            Commands::New(args) => {
                assert_eq!(args.name, "MyPackage");
                assert_eq!(args.author, "Anonymous");
                assert_eq!(args.root, PathBuf::from("."));
            }
            _ => panic!("Expected New command"),
        }
    }

    #[test]
    fn test_cli_new_with_full_name() {
        let cli = Cli::try_parse_from([
            "pkgkit",
            "new",
            "MyPackage",
            "--full-name",
            "com.srawls1.MyPackage",
        ])
        .unwrap();
        match cli.command {
            Commands::New(args) => {
                assert_eq!(args.full_name.as_deref(), Some("com.srawls1.MyPackage"));
            }
            _ => panic!("Expected New command"),
        }
    }

    #[test]
    fn test_cli_status_parsing() {
        let cli = Cli::try_parse_from(["pkgkit", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.registry_url, None);
    }

    #[test]
    fn test_cli_global_registry_url_parsing() {
        let cli = Cli::try_parse_from([
            "pkgkit",
            "--registry-url",
            "https://registry.example.com",
            "status",
        ])
        .unwrap();
        assert_eq!(
            cli.registry_url.as_deref(),
            Some("https://registry.example.com")
        );
    }

    #[test]
    fn test_cli_add_parsing() {
        let cli = Cli::try_parse_from(["pkgkit", "add", "Core Library"]).unwrap();
        match cli.command {
            Commands::Add(args) => assert_eq!(args.package, "Core Library"),
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["pkgkit"]).is_err());
    }
}
