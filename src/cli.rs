//! Command-line surface.
//!
//! Flags are parsed with clap and then collapsed into an immutable
//! [`Options`] value. An empty argument vector is not an error: it becomes
//! [`Invocation::Usage`] so the binary can print help and exit cleanly.
//! Tokens that are not flags of this command are dropped before parsing.

use std::ffi::OsString;

use clap::{Arg, Command, CommandFactory, Parser};
use tracing::debug;

use crate::error::{Error, Result};

pub const CITIES_ENV: &str = "DATA_CUACA_CITIES";

const EXAMPLES: &str = "\
Examples:
  data-cuaca --list
  data-cuaca --list --path data
  data-cuaca --path data/aceh.json
  data-cuaca --path README.md --raw
  data-cuaca --city \"Banda Aceh\" --cities cities.json";

/// Browse and fetch files from the infoBMKG/data-cuaca repository.
#[derive(Debug, Parser)]
#[command(
    name = "data-cuaca",
    version,
    after_help = EXAMPLES,
    args_override_self = true
)]
struct Cli {
    /// List contents from the GitHub contents API.
    #[arg(long)]
    list: bool,

    /// Path inside infoBMKG/data-cuaca.
    #[arg(long, value_name = "PATH", num_args = 0..=1, allow_hyphen_values = true)]
    path: Option<Option<String>>,

    /// Do not parse JSON when fetching raw content.
    #[arg(long)]
    raw: bool,

    /// Look up a city by name and fetch its data/<code>.json.
    #[arg(long, value_name = "NAME", conflicts_with = "path", allow_hyphen_values = true)]
    city: Option<String>,

    /// City index used by --city: a JSON array of {code, name} objects.
    #[arg(long, value_name = "PATH|URL", env = CITIES_ENV, allow_hyphen_values = true)]
    cities: Option<String>,
}

/// Parsed flags for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub list: bool,
    pub raw: bool,
    pub path: Option<String>,
    pub city: Option<String>,
    pub cities: Option<String>,
}

impl Cli {
    fn into_options(self) -> Options {
        Options {
            list: self.list,
            raw: self.raw,
            // `--path` with no value, or an empty one, leaves the path unset.
            path: self.path.flatten().filter(|p| !p.is_empty()),
            city: self.city.filter(|c| !c.is_empty()),
            cities: self.cities.filter(|c| !c.is_empty()),
        }
    }
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// No arguments at all: show usage and succeed.
    Usage,
    Fetch(Options),
}

impl Invocation {
    /// Parse a full argument vector, program name included.
    pub fn from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() <= 1 {
            return Ok(Invocation::Usage);
        }
        let cli = Cli::try_parse_from(known_tokens(args))?;
        Ok(Invocation::Fetch(cli.into_options()))
    }
}

/// Keep the program name, known flags, and the token following each flag
/// that takes a value. Everything else is ignored.
fn known_tokens(args: Vec<OsString>) -> Vec<OsString> {
    let mut cmd = Cli::command();
    cmd.build();

    let mut kept = Vec::with_capacity(args.len());
    let mut tokens = args.into_iter();
    kept.extend(tokens.next());

    while let Some(token) = tokens.next() {
        let Some((arg, inline_value)) = token.to_str().and_then(|t| find_arg(&cmd, t)) else {
            debug!(?token, "ignoring unrecognized argument");
            continue;
        };
        let takes_value = arg.get_action().takes_values() && !inline_value;
        kept.push(token);
        if takes_value {
            kept.extend(tokens.next());
        }
    }
    kept
}

/// Look up a `--long[=value]` or `-s` token; the flag tells whether a value
/// was attached with `=`.
fn find_arg<'a>(cmd: &'a Command, token: &str) -> Option<(&'a Arg, bool)> {
    if let Some(long) = token.strip_prefix("--") {
        let (name, inline_value) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        return cmd
            .get_arguments()
            .find(|a| a.get_long() == Some(name))
            .map(|a| (a, inline_value));
    }
    let mut shorts = token.strip_prefix('-')?.chars();
    let short = shorts.next()?;
    if shorts.next().is_some() {
        return None;
    }
    cmd.get_arguments()
        .find(|a| a.get_short() == Some(short))
        .map(|a| (a, false))
}

/// Resolved fetch mode for a set of [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Query the contents API, optionally below a path.
    Listing { path: Option<&'a str> },
    /// Fetch raw content and print it untouched.
    Raw { path: &'a str },
    /// Fetch raw content and re-print it as pretty JSON.
    Json { path: &'a str },
}

impl Options {
    pub fn mode(&self) -> Result<Mode<'_>> {
        if self.list {
            return Ok(Mode::Listing {
                path: self.path.as_deref(),
            });
        }
        let path = self.path.as_deref().ok_or(Error::MissingPath)?;
        if self.raw {
            Ok(Mode::Raw { path })
        } else {
            Ok(Mode::Json { path })
        }
    }
}

/// Help text printed for an empty invocation and for `--help`.
pub fn usage() -> String {
    Cli::command().render_long_help().to_string()
}
