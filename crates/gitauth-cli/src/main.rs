use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use gitauth_config::{Config, ConfigManager};
use gitauth_sdk::{GitAuthClient, PaginationRequest};

mod display;
mod login;
mod ui;

use ui::UiConfig;

#[derive(Parser)]
#[command(name = "gitauth")]
#[command(about = "Link git provider accounts and browse their repositories")]
#[command(version)]
struct Cli {
    /// Platform URL (overrides server.url from the config file)
    #[arg(long, env = "GITAUTH_URL")]
    url: Option<String>,

    /// Platform session token (overrides server.session_token)
    #[arg(long, env = "GITAUTH_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file path
    #[arg(long, env = "GITAUTH_CONFIG", default_value = "~/.gitauth/config.json")]
    config: String,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link a provider account with the device flow
    Login {
        /// Provider id, e.g. "github"
        provider: String,
        /// Do not open the verification page in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Show the authentication state for a provider
    Status {
        provider: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// List repositories visible through a provider
    Repos(ReposArgs),
    /// Manage the config file
    Config(ConfigArgs),
}

#[derive(Args)]
struct ReposArgs {
    provider: String,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 0)]
    per_page: u32,
    /// Only list repositories of this app installation
    #[arg(long)]
    installation: Option<i64>,
    /// Follow pages until every repository has been listed
    #[arg(long)]
    all: bool,
    /// Print raw JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Get a value (e.g. server.url, flow.min_poll_interval_secs)
    Get { key: String },
    /// Set a value
    Set { key: String, value: String },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// Print the current config
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = gitauth_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| PathBuf::from(&cli.config));

    if let Commands::Config(args) = &cli.command {
        init_logging(cli.debug, None);
        return handle_config(args.clone(), &config_path).await;
    }

    let mut config = read_config(&config_path).await?;
    init_logging(cli.debug, Some(&config));
    log::debug!("Using config {:?}", config_path);

    if let Some(url) = cli.url {
        config.server.url = url;
    }
    if let Some(token) = cli.token {
        config.server.session_token = Some(token);
    }
    ConfigManager::validate(&config)?;

    let client = GitAuthClient::from_config(&config)?;

    match cli.command {
        Commands::Login { provider, no_browser } => {
            let ui = UiConfig::interactive(config.flow.open_browser && !no_browser);
            let min_interval = Duration::from_secs(config.flow.min_poll_interval_secs);
            login::run(&client, &provider, &ui, min_interval).await
        }
        Commands::Status { provider, json } => {
            let session = client.auth_status(&provider).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                display::print_session(&provider, &session);
            }
            Ok(())
        }
        Commands::Repos(args) => list_repositories(&client, args).await,
        Commands::Config(_) => Ok(()),
    }
}

fn init_logging(debug: bool, config: Option<&Config>) {
    let level = if debug {
        "debug"
    } else {
        config.map(|c| c.logging.level.as_str()).unwrap_or("info")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Load the config file if it exists, otherwise use defaults without touching the disk
async fn read_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        let manager = ConfigManager::load(path).await?;
        let config = manager.get().read().await.clone();
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

async fn list_repositories(client: &GitAuthClient, args: ReposArgs) -> anyhow::Result<()> {
    let mut request = PaginationRequest::new()
        .with_page(args.page)
        .with_per_page(args.per_page);
    if let Some(id) = args.installation {
        request = request.with_installation(id);
    }

    let page = if args.all {
        client.list_all_repositories(&args.provider, &request).await?
    } else {
        client.list_repositories(&args.provider, &request).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        display::print_repositories(&page);
    }
    Ok(())
}

async fn handle_config(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            let config = read_config(config_path).await?;
            match config.get_value(&key) {
                Some(value) => println!("{}", format!("{} = {}", key, value).green()),
                None => {
                    println!("{}", format!("❌ Key not found: {}", key).red());
                    std::process::exit(1);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(config_path).await?;
            manager.set_value(&key, &value).await?;

            let shown = if key == "server.session_token" {
                "********".to_string()
            } else {
                value
            };
            println!("{}", format!("✅ Set {} = {}", key, shown).green());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!("{}", format!("⚠️  Config already exists at {:?}", config_path).yellow());
                println!("{}", "Use --force to overwrite".dimmed());
                return Ok(());
            }

            let manager = ConfigManager::new(Config::default(), config_path.to_path_buf());
            manager.save().await?;

            println!("{}", format!("✅ Config initialized at {:?}", config_path).green());
        }
        ConfigCommands::Show => {
            let mut config = read_config(config_path).await?;
            if config.server.session_token.is_some() {
                config.server.session_token = Some("********".to_string());
            }
            println!("{}", "📋 Current Configuration:".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
