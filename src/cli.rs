//! Shared glue for the `ct-export` and `mesh-export` tools.
//!
//! Global flags may appear anywhere on the command line:
//!
//! - `-v` / `--verbose`: debug logging
//! - `-vv` / `--trace`: trace logging
//! - `-q` / `--quiet`: errors only
//! - `--serial`: process images and organs one at a time
//! - `--level <0-9>`: gzip level of volume output
//!
//! Everything else is kept as a positional argument.

use tracing_subscriber::EnvFilter;

use crate::options::ExportOptions;
use crate::util::{Error, Result};

/// Environment variable that overrides the flag-derived log filter.
pub const LOG_ENV: &str = "VPZ_EXPORT_LOG";

/// Log verbosity selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// Filter directive for this verbosity.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Parsed command line.
#[derive(Clone, Debug, Default)]
pub struct Invocation {
    pub verbosity: Verbosity,
    pub options: ExportOptions,
    /// `-h` / `--help` was given.
    pub help: bool,
    /// Non-flag arguments in order.
    pub positional: Vec<String>,
}

/// Split global flags from positional arguments (program name excluded).
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut inv = Invocation::default();
    let mut args = args.into_iter().map(Into::<String>::into);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => inv.verbosity = Verbosity::Debug,
            "-vv" | "--trace" => inv.verbosity = Verbosity::Trace,
            "-q" | "--quiet" => inv.verbosity = Verbosity::Quiet,
            "-h" | "--help" => inv.help = true,
            "--serial" => inv.options = inv.options.parallel(false),
            "--level" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::other("--level needs a value"))?;
                let level = value
                    .parse::<u32>()
                    .ok()
                    .filter(|l| *l <= 9)
                    .ok_or_else(|| Error::other(format!("invalid compression level: {value}")))?;
                inv.options = inv.options.compression(level);
            }
            _ => inv.positional.push(arg),
        }
    }
    Ok(inv)
}

/// Build the log filter: [`LOG_ENV`] when set and valid, else `verbosity`.
pub fn log_filter(verbosity: Verbosity) -> EnvFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the stdout log subscriber. Later calls are no-ops.
pub fn init_tracing(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_anywhere() {
        let inv = parse_args(["scene.json", "-v", "out", "--serial"]).unwrap();
        assert_eq!(inv.positional, ["scene.json", "out"]);
        assert_eq!(inv.verbosity, Verbosity::Debug);
        assert!(!inv.options.parallel);
        assert!(!inv.help);
    }

    #[test]
    fn test_last_verbosity_wins() {
        let inv = parse_args(["-vv", "-q"]).unwrap();
        assert_eq!(inv.verbosity, Verbosity::Quiet);
        assert!(inv.positional.is_empty());
    }

    #[test]
    fn test_level() {
        let inv = parse_args(["--level", "9", "a"]).unwrap();
        assert_eq!(inv.options.compression, 9);
        assert!(inv.options.parallel);

        assert!(parse_args(["--level", "12"]).is_err());
        assert!(parse_args(["--level"]).is_err());
    }

    #[test]
    fn test_directives() {
        assert_eq!(Verbosity::default().directive(), "info");
        assert_eq!(Verbosity::Quiet.directive(), "error");
    }
}
