//! Logging initialization for the CLI host.
//!
//! The library logs through the `log` facade only; this module wires up the
//! `env_logger` backend for the binary. Level selection, in priority order:
//!
//! 1. `RUST_LOG` environment variable, if set
//! 2. `--quiet` (errors only) or `--verbose` (debug, `-vv` for trace)
//! 3. Default: warn

use env_logger::Builder;
use log::LevelFilter;
use std::env;

/// Initialize the logging subsystem from CLI verbosity flags.
///
/// Call once, before the first log statement. `RUST_LOG` takes precedence
/// over the flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.init();
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level_default() {
        assert_eq!(determine_level(0, false), LevelFilter::Warn);
    }

    #[test]
    fn test_determine_level_verbose() {
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
        assert_eq!(determine_level(2, false), LevelFilter::Trace);
        assert_eq!(determine_level(5, false), LevelFilter::Trace);
    }

    #[test]
    fn test_determine_level_quiet_overrides_verbose() {
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }
}
