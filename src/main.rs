use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fintrack::cli::{handle_report_command, handle_users_command, ReportArgs};
use fintrack::config::{paths::FinTrackPaths, settings::Settings};
use fintrack::storage::{init::needs_initialization, Storage};

#[derive(Parser)]
#[command(
    name = "fintrack",
    version,
    about = "Personal finance tracking HTTP API",
    long_about = "FinTrack records income and expenses per user, tracks budgets \
                  against spending and serves reports and dashboard metrics over \
                  a JSON HTTP API."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Interface to bind (default 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Reload data files when they change on disk
        #[arg(long)]
        reload: bool,
    },

    /// Create the data directory and empty data files
    Init,

    /// Show current configuration and paths
    Config,

    /// List registered users
    Users,

    /// Print or export a user's financial report
    Report(ReportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = FinTrackPaths::new()?;
    let mut settings = Settings::load(&paths)?;

    match cli.command {
        Some(Commands::Serve { host, port, reload }) => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            settings.reload |= reload;

            fintrack::server::init_tracing(settings.log_json);
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(fintrack::server::run(settings, paths))?;
        }
        Some(Commands::Init) => {
            println!("Initializing FinTrack at: {}", paths.data_dir().display());
            let created = fintrack::storage::init::initialize_storage(&paths)?;
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            for file in &created {
                println!("  created {}", file);
            }
            println!("Initialization complete!");
        }
        Some(Commands::Config) => {
            println!("FinTrack Configuration");
            println!("======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Initialized:      {}", !needs_initialization(&paths));
            println!();
            println!("Settings:");
            println!("  Bind address:   {}:{}", settings.host, settings.port);
            println!(
                "  Token lifetime: {} minutes",
                settings.access_token_expire_minutes
            );
            println!(
                "  Secret key:     {}",
                if settings.uses_default_secret() {
                    "development default (set SECRET_KEY)"
                } else {
                    "configured"
                }
            );
            println!("  JSON logs:      {}", settings.log_json);
            println!(
                "  Reload:         {} (every {} ms)",
                settings.reload, settings.reload_interval_ms
            );
        }
        Some(Commands::Users) => {
            let storage = Storage::open(paths)?;
            handle_users_command(&storage)?;
        }
        Some(Commands::Report(args)) => {
            let storage = Storage::open(paths)?;
            handle_report_command(&storage, args, chrono::Local::now().date_naive())?;
        }
        None => {
            println!("FinTrack - personal finance tracking API");
            println!();
            println!("Run 'fintrack --help' for usage information.");
            println!("Run 'fintrack serve' to start the server.");
        }
    }

    Ok(())
}
