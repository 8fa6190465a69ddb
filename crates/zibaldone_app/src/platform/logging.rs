//! Logger setup for the `zibaldone` binary.
//!
//! Records go to `<state-dir>/zibaldone.log`; the terminal only shows what
//! the verbosity flags let through.

use std::path::Path;

use engine_logging::{LogDestination, LogOptions};
use log::LevelFilter;
use zibaldone_engine::ensure_state_dir;

const LOG_FILENAME: &str = "zibaldone.log";

pub fn initialize(state_dir: &Path, verbose: bool, quiet: bool) {
    let (level, terminal_level) = levels(verbose, quiet);
    let destination = if ensure_state_dir(state_dir).is_ok() {
        LogDestination::Both(state_dir.join(LOG_FILENAME))
    } else {
        LogDestination::Terminal
    };
    engine_logging::initialize(LogOptions {
        destination,
        level,
        terminal_level,
    });
}

fn levels(verbose: bool, quiet: bool) -> (LevelFilter, LevelFilter) {
    match (verbose, quiet) {
        (true, _) => (LevelFilter::Debug, LevelFilter::Info),
        (false, true) => (LevelFilter::Info, LevelFilter::Error),
        (false, false) => (LevelFilter::Info, LevelFilter::Warn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_pick_levels() {
        assert_eq!(levels(true, false), (LevelFilter::Debug, LevelFilter::Info));
        assert_eq!(levels(false, true), (LevelFilter::Info, LevelFilter::Error));
        assert_eq!(levels(false, false), (LevelFilter::Info, LevelFilter::Warn));
    }
}
