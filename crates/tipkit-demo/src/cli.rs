#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `TIPKIT_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use tipkit_widgets::tooltip::{DEFAULT_ACTIVATION_DELAY_MS, Placement};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
tipkit demo: a scripted page of tooltips

USAGE:
    tipkit-demo [OPTIONS]

OPTIONS:
    --delay=N            Activation delay of the main tooltip in ms (default: 200)
    --position=P         Requested placement of the main tooltip: top | bottom (default: top)
    --viewport=WxH       Viewport size in pixels (default: 1024x768)
    --log-json           Emit logs as JSON lines
    --record=PATH        Write the session as JSONL to PATH and verify it by replay
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    TIPKIT_DEMO_DELAY         Override --delay
    TIPKIT_DEMO_POSITION      Override --position
    TIPKIT_DEMO_VIEWPORT      Override --viewport
    TIPKIT_DEMO_RECORD        Override --record
    TIPKIT_LOG                Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Activation delay of the main tooltip.
    pub delay_ms: u64,
    /// Requested placement of the main tooltip.
    pub position: Placement,
    /// Viewport width and height.
    pub viewport: (u32, u32),
    /// JSON log output.
    pub log_json: bool,
    /// Session recording destination.
    pub record: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
            position: Placement::Top,
            viewport: (1024, 768),
            log_json: false,
            record: None,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

fn parse_viewport(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

fn parse_position(value: &str) -> Option<Placement> {
    match value.trim().to_ascii_lowercase().as_str() {
        "top" => Some(Placement::Top),
        "bottom" => Some(Placement::Bottom),
        _ => None,
    }
}

/// Parse `args` (without the program name) on top of `env` lookups.
///
/// Environment variables take precedence over defaults but are overridden
/// by explicit command-line flags. Unparseable environment values are
/// ignored; unparseable flags are errors.
pub fn parse_from<I, S, E>(args: I, env: E) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    E: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    if let Some(val) = env("TIPKIT_DEMO_DELAY")
        && let Ok(n) = val.trim().parse()
    {
        opts.delay_ms = n;
    }
    if let Some(val) = env("TIPKIT_DEMO_POSITION")
        && let Some(p) = parse_position(&val)
    {
        opts.position = p;
    }
    if let Some(val) = env("TIPKIT_DEMO_VIEWPORT")
        && let Some(v) = parse_viewport(&val)
    {
        opts.viewport = v;
    }
    if let Some(val) = env("TIPKIT_DEMO_RECORD")
        && !val.is_empty()
    {
        opts.record = Some(PathBuf::from(val));
    }

    for arg in args {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--log-json" => opts.log_json = true,
            other => {
                if let Some(val) = other.strip_prefix("--delay=") {
                    opts.delay_ms = val
                        .parse()
                        .map_err(|_| format!("Invalid --delay value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--position=") {
                    opts.position = parse_position(val)
                        .ok_or_else(|| format!("Invalid --position value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--viewport=") {
                    opts.viewport = parse_viewport(val)
                        .ok_or_else(|| format!("Invalid --viewport value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--record=") {
                    opts.record = Some(PathBuf::from(val));
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    Ok(Command::Run(opts))
}

impl Opts {
    /// Parse process arguments and environment, exiting on help, version
    /// or error.
    pub fn parse() -> Self {
        match parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("tipkit-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str]) -> Opts {
        match parse_from(args.iter().copied(), no_env) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.delay_ms, 200);
        assert_eq!(opts.position, Placement::Top);
        assert_eq!(opts.viewport, (1024, 768));
        assert!(!opts.log_json);
        assert_eq!(opts.record, None);
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_flags() {
        assert!(HELP_TEXT.contains("--delay=N"));
        assert!(HELP_TEXT.contains("--record=PATH"));
        assert!(HELP_TEXT.contains("TIPKIT_DEMO_VIEWPORT"));
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run(&[
            "--delay=300",
            "--position=Bottom",
            "--viewport=640x480",
            "--log-json",
            "--record=out.jsonl",
        ]);
        assert_eq!(opts.delay_ms, 300);
        assert_eq!(opts.position, Placement::Bottom);
        assert_eq!(opts.viewport, (640, 480));
        assert!(opts.log_json);
        assert_eq!(opts.record, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_from(["-h", "--bogus"], no_env), Ok(Command::Help));
        assert_eq!(parse_from(["--version"], no_env), Ok(Command::Version));
    }

    #[test]
    fn bad_flags_are_errors() {
        assert!(parse_from(["--delay=soon"], no_env).is_err());
        assert!(parse_from(["--position=left"], no_env).is_err());
        assert!(parse_from(["--viewport=0x10"], no_env).is_err());
        assert_eq!(
            parse_from(["--frobnicate"], no_env),
            Err("Unknown argument: --frobnicate".to_string())
        );
    }

    #[test]
    fn env_overrides_defaults_and_flags_override_env() {
        let env: HashMap<&str, &str> = [
            ("TIPKIT_DEMO_DELAY", "450"),
            ("TIPKIT_DEMO_POSITION", "bottom"),
            ("TIPKIT_DEMO_VIEWPORT", "300x200"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        match parse_from(["--delay=10"], lookup) {
            Ok(Command::Run(opts)) => {
                assert_eq!(opts.delay_ms, 10);
                assert_eq!(opts.position, Placement::Bottom);
                assert_eq!(opts.viewport, (300, 200));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let lookup = |k: &str| (k == "TIPKIT_DEMO_DELAY").then(|| "later".to_string());
        match parse_from(Vec::<String>::new(), lookup) {
            Ok(Command::Run(opts)) => assert_eq!(opts.delay_ms, 200),
            other => panic!("expected run, got {other:?}"),
        }
    }
}
