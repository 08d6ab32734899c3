//! Credential resolution from the process environment.
//!
//! Secrets are resolved in priority order:
//!
//! 1. **Env var value** - the variable itself holds the secret (e.g. `DTC_PASSWORD`)
//! 2. **File reference** - a `<VAR>_FILE` companion variable points at a file
//!    containing the secret (Docker secrets pattern)

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Environment variable '{name}' is not set (nor is '{name}_FILE')")]
    NotConfigured { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    NotUnicode { name: String },

    #[error("Failed to read secret from file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret named `name` from the environment.
///
/// Checks the variable itself first, then `<name>_FILE` as a path to a file
/// holding the secret. Values are trimmed (env vars and secret files often
/// carry trailing newlines).
pub fn resolve_secret(name: &str) -> Result<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            return Ok(SecretString::from(value.trim().to_string()));
        }
        Ok(_) => {}
        Err(std::env::VarError::NotPresent) => {}
        Err(std::env::VarError::NotUnicode(_)) => {
            return Err(SecretError::NotUnicode {
                name: name.to_string(),
            })
        }
    }

    let file_var = format!("{name}_FILE");
    if let Ok(path) = std::env::var(&file_var) {
        if !path.is_empty() {
            return match fs::read_to_string(&path) {
                Ok(content) => Ok(SecretString::from(content.trim().to_string())),
                Err(e) => Err(SecretError::FileRead { path, source: e }),
            };
        }
    }

    Err(SecretError::NotConfigured {
        name: name.to_string(),
    })
}

/// Reads a required, non-secret environment variable.
pub fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::NotConfigured {
            name: name.to_string(),
        }),
        Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::NotUnicode {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Tests that modify environment variables must run serially to avoid race conditions
    #[test]
    #[serial]
    fn test_env_value_takes_priority() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("SR_TEST_SECRET_1", "env_value");
        std::env::set_var("SR_TEST_SECRET_1_FILE", temp_file.path());
        let result = resolve_secret("SR_TEST_SECRET_1").unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("SR_TEST_SECRET_1");
        std::env::remove_var("SR_TEST_SECRET_1_FILE");
    }

    #[test]
    #[serial]
    fn test_file_fallback() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "  file_value  ").unwrap();

        std::env::set_var("SR_TEST_SECRET_2_FILE", temp_file.path());
        let result = resolve_secret("SR_TEST_SECRET_2").unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("SR_TEST_SECRET_2_FILE");
    }

    #[test]
    #[serial]
    fn test_missing_secret_error() {
        let result = resolve_secret("SR_DEFINITELY_NOT_SET_12345");
        assert!(matches!(result, Err(SecretError::NotConfigured { .. })));
    }

    #[test]
    #[serial]
    fn test_empty_value_falls_through() {
        std::env::set_var("SR_TEST_SECRET_3", "");
        let result = resolve_secret("SR_TEST_SECRET_3");
        assert!(matches!(result, Err(SecretError::NotConfigured { .. })));
        std::env::remove_var("SR_TEST_SECRET_3");
    }

    #[test]
    #[serial]
    fn test_file_not_found_error() {
        std::env::set_var("SR_TEST_SECRET_4_FILE", "/nonexistent/path/to/secret");
        let result = resolve_secret("SR_TEST_SECRET_4");
        assert!(matches!(result, Err(SecretError::FileRead { .. })));
        std::env::remove_var("SR_TEST_SECRET_4_FILE");
    }

    #[test]
    #[serial]
    fn test_require_var() {
        std::env::set_var("SR_TEST_PLAIN", "  operator1  ");
        assert_eq!(require_var("SR_TEST_PLAIN").unwrap(), "operator1");
        std::env::remove_var("SR_TEST_PLAIN");

        assert!(matches!(
            require_var("SR_TEST_PLAIN_MISSING"),
            Err(SecretError::NotConfigured { .. })
        ));
    }
}
