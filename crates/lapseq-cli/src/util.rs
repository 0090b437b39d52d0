use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use lapseq_dataset::dataset::PrepareConfig;
use lapseq_session::Session;

use crate::schema::CleanedSessionCollection;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Lists the `*.json` files of a directory in file-name order.
///
/// # Errors
///
/// Returns error if the directory cannot be read
pub fn discover_session_files<P>(dir: P) -> anyhow::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read session directory: {}", dir.display()))?;

    let mut files = vec![];
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list session directory: {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read one raw session from a JSON file
///
/// A session without a name is named after the file stem.
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_session_file<P>(path: P) -> anyhow::Result<Session>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut session: Session = read_json_file("session", path)?;
    if session.name.is_empty()
        && let Some(stem) = path.file_stem()
    {
        session.name = stem.to_string_lossy().into_owned();
    }
    Ok(session)
}

/// Read cleaned sessions written by the `clean` command
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_cleaned_sessions_file<P>(path: P) -> anyhow::Result<CleanedSessionCollection>
where
    P: AsRef<Path>,
{
    read_json_file("cleaned sessions", path)
}

/// Read a base dataset configuration
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_config_file<P>(path: P) -> anyhow::Result<PrepareConfig>
where
    P: AsRef<Path>,
{
    read_json_file("config", path)
}
