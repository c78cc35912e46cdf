//! `vcr show` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::cassette::store::load_cassette_file;

/// Render one line per interaction of the cassette at `path`.
///
/// # Errors
///
/// Returns an error string if the cassette cannot be loaded.
pub fn run(path: &Path) -> Result<String, String> {
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let cassette = load_cassette_file(path, &name).map_err(|e| e.to_string())?;

    let mut out = format!(
        "Cassette: {}\nRecorded: {}\nInteractions: {}\n",
        cassette.name,
        cassette.recorded_at.to_rfc3339(),
        cassette.interactions.len()
    );
    for interaction in &cassette.interactions {
        let _ = writeln!(
            out,
            "  {:>3}  {:<6} {} -> {}",
            interaction.seq,
            interaction.request.method,
            interaction.request.url,
            interaction.response.status
        );
    }
    Ok(out)
}
