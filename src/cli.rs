use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{CloseMode, FaultMode, ProbeConfig};
use crate::error::ProbeError;

pub const USAGE: &str = "\
Usage: fsprobe [options] [--] <mount>

Options:
  --block-size <bytes>   bytes per block (default 4096)
  --block-count <n>      whole blocks in each payload (default 100)
  --test-count <n>       number of files (default 150)
  --simple               close each file right after its phase
  --keep-going           record I/O errors per file instead of aborting
  --seed <n>             seed offsets and payload content
  --config <file>        read options from a JSON file
  --json                 print the report as JSON as well
  -h, --help             show this message";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("expected exactly one <mount> argument, got {0}")]
    ArgumentCount(usize),
    #[error("{0} needs a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown option {0}")]
    UnknownOption(String),
}

/// Options given on the command line. Unset fields fall back to the config file,
/// then to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub block_size: Option<u64>,
    pub block_count: Option<u64>,
    pub test_count: Option<usize>,
    pub simple: bool,
    pub keep_going: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mount: PathBuf,
    pub config_file: Option<PathBuf>,
    pub overrides: Overrides,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(Invocation),
}

/// Parse arguments, not including the program name.
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut positionals = Vec::new();
    let mut overrides = Overrides::default();
    let mut config_file = None;
    let mut json = false;
    let mut options_done = false;

    while let Some(arg) = args.next() {
        if !options_done && arg == "--" {
            options_done = true;
            continue;
        }
        if options_done || !arg.to_str().is_some_and(|a| a.starts_with('-')) {
            positionals.push(PathBuf::from(arg));
            continue;
        }
        let flag = arg.to_string_lossy().into_owned();
        let flag = flag.as_str();
        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "--simple" => overrides.simple = true,
            "--keep-going" => overrides.keep_going = true,
            "--json" => json = true,
            "--block-size" => overrides.block_size = Some(parse_value(flag, args.next())?),
            "--block-count" => overrides.block_count = Some(parse_value(flag, args.next())?),
            "--test-count" => overrides.test_count = Some(parse_value(flag, args.next())?),
            "--seed" => overrides.seed = Some(parse_value(flag, args.next())?),
            "--config" => {
                let value = args.next().ok_or_else(|| UsageError::MissingValue(flag.to_string()))?;
                config_file = Some(PathBuf::from(value));
            }
            other => return Err(UsageError::UnknownOption(other.to_string())),
        }
    }

    if positionals.len() != 1 {
        return Err(UsageError::ArgumentCount(positionals.len()));
    }
    let mount = positionals.remove(0);
    Ok(Command::Run(Invocation {
        mount,
        config_file,
        overrides,
        json,
    }))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<OsString>) -> Result<T, UsageError> {
    let value = value.ok_or_else(|| UsageError::MissingValue(flag.to_string()))?;
    let text = value.to_string_lossy();
    text.parse().map_err(|_| UsageError::InvalidValue {
        flag: flag.to_string(),
        value: text.into_owned(),
    })
}

impl Invocation {
    /// Build the effective config: file first, then command line on top.
    pub fn resolve(&self) -> Result<ProbeConfig, ProbeError> {
        let mut config = match &self.config_file {
            Some(path) => ProbeConfig::from_json_file(path)?,
            None => ProbeConfig::default(),
        };
        let o = &self.overrides;
        if let Some(v) = o.block_size {
            config.block_size = v;
        }
        if let Some(v) = o.block_count {
            config.block_count = v;
        }
        if let Some(v) = o.test_count {
            config.test_count = v;
        }
        if o.simple {
            config.close_mode = CloseMode::Simple;
        }
        if o.keep_going {
            config.fault_mode = FaultMode::Isolate;
        }
        if o.seed.is_some() {
            config.seed = o.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn single_mount_uses_defaults() {
        let Command::Run(inv) = parse_args(args(&["/mnt/fs"])).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(inv.mount, PathBuf::from("/mnt/fs"));
        assert_eq!(inv.resolve().unwrap(), ProbeConfig::default());
    }

    #[test]
    fn wrong_positional_count() {
        assert_eq!(parse_args(args(&[])), Err(UsageError::ArgumentCount(0)));
        assert_eq!(parse_args(args(&["/a", "/b"])), Err(UsageError::ArgumentCount(2)));
    }

    #[test]
    fn options_override_defaults() {
        let parsed = parse_args(args(&[
            "--test-count",
            "3",
            "--block-count",
            "1",
            "--simple",
            "--keep-going",
            "--seed",
            "9",
            "/mnt/fs",
        ]))
        .unwrap();
        let Command::Run(inv) = parsed else {
            panic!("expected run");
        };
        let config = inv.resolve().unwrap();
        assert_eq!(config.test_count, 3);
        assert_eq!(config.block_count, 1);
        assert_eq!(config.close_mode, CloseMode::Simple);
        assert_eq!(config.fault_mode, FaultMode::Isolate);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn bad_values_are_usage_errors() {
        assert_eq!(
            parse_args(args(&["--test-count", "many", "/m"])),
            Err(UsageError::InvalidValue {
                flag: "--test-count".into(),
                value: "many".into()
            })
        );
        assert_eq!(
            parse_args(args(&["/m", "--seed"])),
            Err(UsageError::MissingValue("--seed".into()))
        );
        assert_eq!(
            parse_args(args(&["--fast", "/m"])),
            Err(UsageError::UnknownOption("--fast".into()))
        );
    }

    #[test]
    fn zero_test_count_fails_validation() {
        let Command::Run(inv) = parse_args(args(&["--test-count", "0", "/m"])).unwrap() else {
            panic!("expected run");
        };
        assert!(matches!(inv.resolve(), Err(ProbeError::Config(_))));
    }

    #[test]
    fn double_dash_ends_options() {
        let Command::Run(inv) = parse_args(args(&["--simple", "--", "-odd-mount"])).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(inv.mount, PathBuf::from("-odd-mount"));
        assert!(inv.overrides.simple);
        assert_eq!(
            parse_args(args(&["--", "/a", "--json"])),
            Err(UsageError::ArgumentCount(2))
        );
    }

    #[test]
    fn overflowing_block_count_is_config_error() {
        let Command::Run(inv) =
            parse_args(args(&["--test-count", "1", "--block-count", "18446744073709551615", "/m"]))
                .unwrap()
        else {
            panic!("expected run");
        };
        assert!(matches!(inv.resolve(), Err(ProbeError::Config(_))));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(args(&["-h"])), Ok(Command::Help));
    }
}
