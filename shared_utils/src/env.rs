use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an environment variable, falling back to `default` when unset.
pub fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_is_an_error() {
        let err = get_env_var("GAME_SYNC_DEFINITELY_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("GAME_SYNC_DEFINITELY_UNSET_VAR"));
    }

    #[test]
    fn var_or_falls_back() {
        assert_eq!(var_or("GAME_SYNC_DEFINITELY_UNSET_VAR", "x.db"), "x.db");
    }
}
