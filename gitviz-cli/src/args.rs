use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::anyhow;
use log::Level;

use gitviz::render::Format;

pub const NAME: &str = "gitviz";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HEAD: &str = env!("GIT_HEAD");
pub const USAGE: &str = r#"
Usage

    gitviz [<path>] [<option>...]

    Draws the object graph of the git repository at <path>, which defaults
    to the current directory. The Graphviz document is written to
    `<output>/graph` and rendered to `<output>/graph.<format>`.

Options

    --output, -o <dir>     Output directory (default: <path>)
    --format, -T <format>  One of `pdf`, `png` or `svg` (default: pdf)
    --no-render            Only write the document
    --stdout               Print the document instead of writing it
    --verbose, -v          Verbose output
    --quiet, -q            Only output errors
    --version              Print version
    --help, -h             Print help

Environment

    GITVIZ_DOT             Graphviz program to render with (default: dot)
    RUST_LOG               Log level, when neither -v nor -q is given
"#;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// If this error is returned from argument parsing, help is displayed.
    #[error("help invoked")]
    Help,
    /// If this error is returned from argument parsing, the version is displayed.
    #[error("version invoked")]
    Version,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    /// Log level for this verbosity, falling back to `default` when not set explicitly.
    pub fn level(&self, default: Option<Level>) -> Level {
        match self {
            Self::Quiet => Level::Error,
            Self::Verbose => Level::Debug,
            Self::Normal => default.unwrap_or(Level::Info),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Format,
    pub render: bool,
    pub stdout: bool,
    pub verbosity: Verbosity,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            output: None,
            format: Format::default(),
            render: true,
            stdout: false,
            verbosity: Verbosity::default(),
        }
    }
}

impl Options {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_args(std::env::args_os().skip(1).collect())
    }

    pub fn from_args(args: Vec<OsString>) -> anyhow::Result<Self> {
        use lexopt::prelude::*;

        let mut parser = lexopt::Parser::from_args(args);
        let mut options = Options::default();
        let mut path: Option<PathBuf> = None;

        while let Some(arg) = parser.next()? {
            match arg {
                Long("help") | Short('h') => {
                    return Err(Error::Help.into());
                }
                Long("version") => {
                    return Err(Error::Version.into());
                }
                Long("output") | Short('o') => {
                    options.output = Some(PathBuf::from(parser.value()?));
                }
                Long("format") | Short('T') => {
                    options.format = parse_value("format", parser.value()?)?;
                }
                Long("no-render") => {
                    options.render = false;
                }
                Long("stdout") => {
                    options.stdout = true;
                    options.render = false;
                }
                Long("verbose") | Short('v') => {
                    options.verbosity = Verbosity::Verbose;
                }
                Long("quiet") | Short('q') => {
                    options.verbosity = Verbosity::Quiet;
                }
                Value(val) if path.is_none() => {
                    path = Some(PathBuf::from(val));
                }
                _ => return Err(anyhow!(arg.unexpected())),
            }
        }
        if let Some(path) = path {
            options.path = path;
        }
        Ok(options)
    }

    /// Directory the document is written to.
    pub fn output(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.path.clone())
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: OsString) -> anyhow::Result<T>
where
    <T as std::str::FromStr>::Err: std::error::Error,
{
    value
        .into_string()
        .map_err(|_| anyhow!("the value specified for '--{}' is not valid unicode", flag))?
        .parse()
        .map_err(|e| anyhow!("invalid value specified for '--{}' ({})", flag, e))
}
