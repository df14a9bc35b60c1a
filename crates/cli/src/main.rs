use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Messenger webhook relay: replies to page messages with Gemini", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook server (GET/POST /webhook, GET /health).
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, config, or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the x-hub-signature-256 header value for a request body, using the configured app secret.
    Sign {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// File containing the exact request body to sign
        #[arg(long, short, value_name = "FILE")]
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Sign { config, file }) => {
            if let Err(e) = run_sign(config, file) {
                log::error!("sign failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting relay on {}:{} (config {})",
        config.server.bind,
        config.server.port,
        path.display()
    );
    lib::gateway::run_gateway(config).await
}

fn run_sign(
    config_path: Option<std::path::PathBuf>,
    file: std::path::PathBuf,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let (config, _) = lib::config::load_config(config_path)?;
    let secret = lib::config::non_empty(config.messenger.app_secret.as_deref())
        .context("app secret not configured (set messenger.appSecret or APP_SECRET)")?;
    let body = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    println!("{}", lib::signature::sign(secret, &body));
    Ok(())
}
