use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nfs_web_ui::cli::{
    handle_audit_command, handle_backup_command, handle_config_command, handle_export_command,
    handle_hash_password, serve, BackupCommands, ExportCommands, ServeOptions,
};
use nfs_web_ui::config::paths::{DEFAULT_BACKUP_DIR, DEFAULT_CONFIG_DIR};
use nfs_web_ui::config::{ServerPaths, Settings};

#[derive(Parser)]
#[command(
    name = "nfs-web-ui",
    version,
    about = "Web dashboard and HTTP API for managing NFS exports",
    long_about = "nfs-web-ui manages a JSON description of NFS exports through an \
                  authenticated HTTP API. Every change is preceded by a snapshot of \
                  the configuration, and any snapshot can be restored."
)]
struct Cli {
    /// Directory holding exports.json, settings.json and the audit log
    #[arg(long, global = true, env = "CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Directory holding configuration snapshots
    #[arg(long, global = true, env = "BACKUP_DIR", default_value = DEFAULT_BACKUP_DIR)]
    backup_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on (overrides --port)
        #[arg(long, env = "LISTEN")]
        listen: Option<SocketAddr>,

        /// Port to listen on, on all interfaces
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Directory with the browser UI, served for non-API paths
        #[arg(long, env = "STATIC_DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Inspect the export configuration
    #[command(subcommand)]
    Exports(ExportCommands),

    /// Snapshot management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Print an Argon2 hash for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash (prompted for when omitted)
        password: Option<String>,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nfs_web_ui=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths = ServerPaths::new(cli.config_dir, cli.backup_dir);
    let settings = Settings::load(&paths)?;

    match cli.command {
        Some(Commands::Serve {
            listen,
            port,
            static_dir,
        }) => {
            let options = ServeOptions {
                listen: listen
                    .unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)),
                static_dir,
            };
            tokio::runtime::Runtime::new()?.block_on(serve(&paths, &settings, options))?;
        }
        Some(Commands::Exports(cmd)) => {
            handle_export_command(&paths, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            handle_audit_command(&paths, limit)?;
        }
        Some(Commands::HashPassword { password }) => {
            handle_hash_password(password)?;
        }
        Some(Commands::Config) => {
            handle_config_command(&paths, &settings);
        }
        None => {
            println!("nfs-web-ui - NFS export management");
            println!();
            println!("Run 'nfs-web-ui --help' for usage information.");
            println!("Run 'nfs-web-ui serve' to start the HTTP server.");
        }
    }

    Ok(())
}
