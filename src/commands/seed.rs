//! `vcr seed` command.

use crate::config::VcrConfig;
use crate::ports::env::EnvProvider;
use crate::random::parse_seed;

/// Render the seed recorded for `test` under `VCR_PATH`.
///
/// # Errors
///
/// Returns an error string if `VCR_PATH` is unset or the seed file is
/// missing or malformed.
pub fn run(env: &dyn EnvProvider, test: &str) -> Result<String, String> {
    let store = VcrConfig::from_env(env).store().ok_or("VCR_PATH is not set")?;
    let path = store.seed_path(test);
    let bytes = std::fs::read(&path)
        .map_err(|e| format!("Failed to read seed file {}: {e}", path.display()))?;
    let seed = parse_seed(&bytes, &path).map_err(|e| e.to_string())?;
    Ok(format!("{seed}\n"))
}
