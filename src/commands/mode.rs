//! `vcr mode` command.

use crate::config::VcrConfig;
use crate::ports::env::EnvProvider;

/// Render the resolved mode and storage directory.
///
/// # Errors
///
/// Returns an error string if the mode selector is unsupported.
pub fn run(env: &dyn EnvProvider) -> Result<String, String> {
    let config = VcrConfig::from_env(env);
    let mode = config.resolve().map_err(|e| e.to_string())?;
    let path =
        config.path.as_ref().map_or_else(|| "(unset)".to_string(), |p| p.display().to_string());
    Ok(format!("mode: {mode}\npath: {path}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::env::MockEnv;

    #[test]
    fn reports_disabled_without_path() {
        let env = MockEnv::new().with_var("VCR_MODE", "RECORD_ONLY");
        assert_eq!(run(&env).unwrap(), "mode: disabled\npath: (unset)\n");
    }

    #[test]
    fn reports_recording() {
        let env = MockEnv::new().with_var("VCR_MODE", "RECORD_ONLY").with_var("VCR_PATH", "/t");
        assert_eq!(run(&env).unwrap(), "mode: recording\npath: /t\n");
    }

    #[test]
    fn unsupported_mode_is_an_error() {
        let env = MockEnv::new().with_var("VCR_MODE", "nope").with_var("VCR_PATH", "/t");
        assert!(run(&env).unwrap_err().contains("nope"));
    }
}
