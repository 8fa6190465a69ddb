use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use zibaldone_engine::{ClientSettings, SyncMode, SyncSettings, DEFAULT_BASE_URL};

use super::persistence::Theme;

#[derive(Parser, Debug)]
#[command(name = "zibaldone")]
#[command(author, version, about = "Zibaldone - your personal intellectual archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root of the archive API
    #[arg(long, global = true, env = "ZIBALDONE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Upper bound for a single request, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Where preferences and the log file live
    #[arg(long, global = true, env = "ZIBALDONE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Enable verbose logging and metadata details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload files; every file is attempted even when an earlier one fails
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Also show a notice for each failed file and wait for enter on a terminal
        #[arg(long)]
        alert: bool,
    },

    /// List archived items, newest first
    List,

    /// Delete an item after confirmation
    Delete {
        /// Item id as shown by `list`
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Keep the list on screen and refresh when the archive changes
    Watch {
        /// Poll instead of following the server's event stream
        #[arg(long)]
        poll: bool,

        /// Poll interval, also used when the event stream gives up
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },

    /// Show or change the color theme
    Theme { name: Option<Theme> },
}

impl Cli {
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        dirs::config_dir()
            .map(|dir| dir.join("zibaldone"))
            .unwrap_or_else(|| PathBuf::from(".zibaldone"))
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            request_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..ClientSettings::default().with_base_url(self.api_url.clone())
        }
    }

    /// Only `watch` keeps a refresh trigger running.
    pub fn sync_settings(&self) -> Option<SyncSettings> {
        match self.command {
            Command::Watch { poll, interval_ms } => Some(SyncSettings {
                mode: if poll { SyncMode::Polling } else { SyncMode::Push },
                poll_interval: Duration::from_millis(interval_ms.max(100)),
                ..SyncSettings::default()
            }),
            _ => None,
        }
    }
}
