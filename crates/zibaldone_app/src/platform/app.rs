use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use signal_hook::consts::SIGINT;
use zibaldone_core::{update, AppState, Msg, UploadNotice, UploadOutcome};

use super::cli::{Cli, Command};
use super::effects::EffectRunner;
use super::intents;
use super::logging;
use super::persistence::{self, Preferences, Theme};
use super::ui::prompt::TerminalPrompter;
use super::ui::render::{self, Palette};

const WATCH_TICK: Duration = Duration::from_millis(200);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let state_dir = cli.state_dir();
    logging::initialize(&state_dir, cli.verbose, cli.quiet);
    engine_info!(
        "zibaldone {} starting, api={} state_dir={:?}",
        env!("CARGO_PKG_VERSION"),
        cli.api_url,
        state_dir
    );

    let preferences = persistence::load_preferences(&state_dir);
    match cli.command.clone() {
        Command::Theme { name } => run_theme(&state_dir, preferences, name),
        Command::Upload { paths, alert } => {
            let notice = if alert {
                UploadNotice::Alert
            } else {
                UploadNotice::Inline
            };
            Session::start(&cli, &state_dir, preferences, notice)?.upload(&paths)
        }
        Command::List => Session::start(&cli, &state_dir, preferences, UploadNotice::Inline)?.list(),
        Command::Delete { id, .. } => {
            Session::start(&cli, &state_dir, preferences, UploadNotice::Inline)?.delete(&id)
        }
        Command::Watch { .. } => {
            Session::start(&cli, &state_dir, preferences, UploadNotice::Inline)?.watch()
        }
    }
}

fn run_theme(
    state_dir: &Path,
    mut preferences: Preferences,
    name: Option<Theme>,
) -> anyhow::Result<()> {
    let Some(theme) = name else {
        println!("{}", preferences.theme);
        return Ok(());
    };
    preferences.theme = theme;
    if !persistence::save_preferences(state_dir, &preferences) {
        bail!("could not save preferences in {}", state_dir.display());
    }
    println!("Theme set to {theme}");
    Ok(())
}

/// One command's worth of the event loop: messages in, `update`, effects out.
struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    palette: Palette,
    verbose: bool,
    quiet: bool,
    /// Redraw the whole screen on every change (watch mode).
    live: bool,
    last_refresh_error: Option<String>,
    failed_uploads: Vec<String>,
    delete_result: Option<Result<(), String>>,
}

impl Session {
    fn start(
        cli: &Cli,
        state_dir: &Path,
        mut preferences: Preferences,
        notice: UploadNotice,
    ) -> anyhow::Result<Self> {
        let palette = Palette::for_theme(preferences.theme);
        if !preferences.has_seen_welcome && !cli.quiet {
            println!("{}", render::welcome(&palette));
            preferences.has_seen_welcome = true;
            persistence::save_preferences(state_dir, &preferences);
        }

        let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(
            cli.client_settings(),
            cli.sync_settings(),
            Box::new(TerminalPrompter::new(assume_yes)),
            msg_tx,
        )
        .context("failed to start the engine")?;

        Ok(Self {
            state: AppState::new().with_upload_notice(notice),
            runner,
            msg_rx,
            palette,
            verbose: cli.verbose,
            quiet: cli.quiet,
            live: false,
            last_refresh_error: None,
            failed_uploads: Vec::new(),
            delete_result: None,
        })
    }

    fn upload(mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let intents = paths.iter().map(|path| intents::intent_for(path)).collect();
        self.dispatch(Msg::FilesDropped(intents));
        self.pump_until(|state| !state.has_open_batches() && !state.refresh_pending())?;
        self.print_screen();
        self.dispatch(Msg::Unmounted);

        if !self.failed_uploads.is_empty() {
            bail!(
                "{} of {} upload(s) failed: {}",
                self.failed_uploads.len(),
                paths.len(),
                self.failed_uploads.join(", ")
            );
        }
        Ok(())
    }

    fn list(mut self) -> anyhow::Result<()> {
        self.load_items()?;
        self.print_screen();
        self.dispatch(Msg::Unmounted);
        Ok(())
    }

    fn delete(mut self, id: &str) -> anyhow::Result<()> {
        self.load_items()?;
        let Some(filename) = self
            .state
            .items()
            .get(id)
            .map(|item| item.original_filename.clone())
        else {
            bail!("no item with id {id}");
        };

        self.dispatch(Msg::DeleteRequested { id: id.to_string() });
        self.pump_until(|state| state.delete_stage(id).is_none())?;
        self.dispatch(Msg::Unmounted);

        match self.delete_result.take() {
            Some(Ok(())) => {
                if !self.quiet {
                    println!("Deleted {filename}");
                }
                Ok(())
            }
            Some(Err(cause)) => bail!("failed to delete {filename}: {cause}"),
            None => {
                if !self.quiet {
                    println!("Cancelled");
                }
                Ok(())
            }
        }
    }

    fn watch(mut self) -> anyhow::Result<()> {
        let interrupted = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))
            .context("failed to install the Ctrl-C handler")?;

        self.live = true;
        self.dispatch(Msg::Mounted);
        while !interrupted.load(Ordering::Relaxed) {
            match self.msg_rx.recv_timeout(WATCH_TICK) {
                Ok(msg) => self.dispatch(msg),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        engine_info!("Watch interrupted, stopping sync");
        self.dispatch(Msg::Unmounted);
        if !self.quiet {
            println!("Stopped watching.");
        }
        Ok(())
    }

    fn load_items(&mut self) -> anyhow::Result<()> {
        self.dispatch(Msg::Mounted);
        self.pump_until(|state| state.refreshes_completed() > 0)?;
        if let Some(cause) = self.last_refresh_error.take() {
            bail!("could not load items: {cause}");
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) {
        self.observe(&msg);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);

        if self.state.consume_dirty() && self.live {
            print!("{CLEAR_SCREEN}");
            self.print_screen();
        }
    }

    /// Side channel for what the terminal reports beyond the view model.
    fn observe(&mut self, msg: &Msg) {
        match msg {
            Msg::UploadFinished {
                filename, outcome, ..
            } => {
                if let UploadOutcome::Failed { .. } = outcome {
                    self.failed_uploads.push(filename.clone());
                }
                if !self.quiet {
                    println!("{}", render::upload_line(filename, outcome, &self.palette));
                }
            }
            Msg::ItemsRefreshed { .. } => self.last_refresh_error = None,
            Msg::RefreshFailed { cause, .. } => {
                if self.live {
                    engine_warn!("Keeping the current list: {}", cause);
                }
                self.last_refresh_error = Some(cause.clone());
            }
            Msg::DeleteFinished { id, result } if self.state.delete_stage(id).is_some() => {
                self.delete_result = Some(result.clone());
            }
            _ => {}
        }
    }

    fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) -> anyhow::Result<()> {
        while !done(&self.state) {
            let msg = self
                .msg_rx
                .recv()
                .context("engine stopped before the command finished")?;
            self.dispatch(msg);
        }
        Ok(())
    }

    fn print_screen(&self) {
        let screen = render::render(&self.state.view(), &self.palette, self.verbose);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(screen.as_bytes());
        let _ = stdout.flush();
    }
}
