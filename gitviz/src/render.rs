//! Persisting and rendering DOT documents.
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::str::FromStr;
use std::{env, fmt, fs, io};

use thiserror::Error;

/// File name of the written document.
pub const DOCUMENT_NAME: &str = "graph";
/// Environment variable overriding the renderer program.
pub const RENDERER_ENV: &str = "GITVIZ_DOT";
/// Default renderer program.
pub const RENDERER: &str = "dot";

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write document `{path}`: {err}")]
    Write {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("failed to run `{program}` on `{document}`: {err}")]
    Spawn {
        program: String,
        document: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("`{program}` exited with {status} on `{document}`: {stderr}")]
    Failed {
        program: String,
        document: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

impl Error {
    /// The document that was being rendered, if it was written.
    pub fn document(&self) -> Option<&Path> {
        match self {
            Self::Write { .. } => None,
            Self::Spawn { document, .. } | Self::Failed { document, .. } => Some(document),
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown output format `{0}`, expected one of `pdf`, `png` or `svg`")]
pub struct FormatError(String);

/// Output format of the rendered artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Pdf,
    Png,
    Svg,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(FormatError(s.to_owned())),
        }
    }
}

/// Renderer options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Directory the document and the artifact are written to.
    pub output: PathBuf,
    pub format: Format,
    /// The Graphviz program to run.
    pub program: String,
}

impl Options {
    /// Default options for the given output directory.
    ///
    /// The program is taken from `GITVIZ_DOT`, if set.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            format: Format::default(),
            program: env::var(RENDERER_ENV).unwrap_or_else(|_| RENDERER.to_owned()),
        }
    }

    pub fn with_format(self, format: Format) -> Self {
        Self { format, ..self }
    }

    /// Path of the written document.
    pub fn document(&self) -> PathBuf {
        self.output.join(DOCUMENT_NAME)
    }

    /// Path of the rendered artifact.
    pub fn artifact(&self) -> PathBuf {
        self.output.join(format!("{DOCUMENT_NAME}.{}", self.format))
    }
}

/// Persists documents and turns them into visual artifacts.
pub trait Renderer {
    /// Persist the document, returning where it was written.
    fn write_document(&self, text: &str) -> Result<PathBuf, Error>;
    /// Render a persisted document, returning the artifact path.
    fn render(&self, document: &Path) -> Result<PathBuf, Error>;
}

/// Renders documents with Graphviz.
#[derive(Clone, Debug)]
pub struct Dot {
    options: Options,
}

impl Dot {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl Renderer for Dot {
    fn write_document(&self, text: &str) -> Result<PathBuf, Error> {
        let path = self.options.document();
        fs::write(&path, text).map_err(|err| Error::Write {
            path: path.clone(),
            err,
        })?;

        Ok(path)
    }

    fn render(&self, document: &Path) -> Result<PathBuf, Error> {
        let program = self.options.program.as_str();
        let artifact = self.options.artifact();
        let output = Command::new(program)
            .arg(document)
            .arg("-T")
            .arg(self.options.format.as_str())
            .arg("-o")
            .arg(&artifact)
            .output()
            .map_err(|err| Error::Spawn {
                program: program.to_owned(),
                document: document.to_path_buf(),
                err,
            })?;

        if !output.status.success() {
            return Err(Error::Failed {
                program: program.to_owned(),
                document: document.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(artifact)
    }
}

/// Paths produced by a successful render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub document: PathBuf,
    pub artifact: PathBuf,
}

/// Write the document, then render it.
///
/// If rendering fails, the document is left in place.
pub fn run<R: Renderer>(renderer: &R, text: &str) -> Result<Rendered, Error> {
    let document = renderer.write_document(text)?;
    log::debug!(target: "gitviz", "Wrote document to {}", document.display());

    let artifact = renderer.render(&document)?;
    log::debug!(target: "gitviz", "Rendered {}", artifact.display());

    Ok(Rendered { document, artifact })
}
