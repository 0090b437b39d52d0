use std::path::{Path, PathBuf};

use lapseq_cleaning::{
    cleaner::{CleanedSession, clean_session},
    validity::ValidityRules,
};
use lapseq_session::GRID_SIZE;

use crate::{
    schema::CleanedSessionCollection,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CleanArg {
    /// Directory containing one JSON file per raw session
    dir: PathBuf,
    /// Drivers a session must have to be kept
    #[arg(long, default_value_t = GRID_SIZE)]
    required_drivers: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CleanArg) -> anyhow::Result<()> {
    let CleanArg {
        dir,
        required_drivers,
        output,
    } = arg;

    let rules = ValidityRules {
        required_drivers: *required_drivers,
    };
    let cleaned = clean_directory(dir, &rules)?;
    let collection = CleanedSessionCollection::new(cleaned);
    Output::save_json(&collection, output.clone())?;
    Ok(())
}

/// Loads, validates and cleans every session file of a directory.
///
/// Unreadable and invalid sessions are skipped with a warning.
pub(crate) fn clean_directory(
    dir: &Path,
    rules: &ValidityRules,
) -> anyhow::Result<Vec<CleanedSession>> {
    let files = util::discover_session_files(dir)?;
    eprintln!("Found {} session files in {}", files.len(), dir.display());

    let mut cleaned = vec![];
    for (i, path) in files.iter().enumerate() {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        eprintln!("Processing {}/{}: {file_name}", i + 1, files.len());

        let session = match util::read_session_file(path) {
            Ok(session) => session,
            Err(e) => {
                log::warn!("skipping {file_name}: {e:#}");
                continue;
            }
        };
        if let Err(e) = rules.check(&session) {
            log::warn!("skipping {}: {e}", session.display_name());
            continue;
        }
        cleaned.push(clean_session(&session));
    }

    eprintln!(
        "Cleaned {} of {} sessions",
        cleaned.len(),
        files.len()
    );
    Ok(cleaned)
}
