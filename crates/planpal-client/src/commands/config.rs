//! Configuration commands.

use crate::bootstrap::Bootstrap;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
///
/// The backend URL and redirect URI must parse. When a client id is set it
/// must resolve, and the sign-in flow is built to check that the redirect
/// URI is a loopback address the client can listen on.
pub fn validate(bootstrap: &Bootstrap) -> ClientResult<()> {
    let config = bootstrap.config();
    config.backend_url().map_err(ClientError::Config)?;
    config.redirect_uri().map_err(ClientError::Config)?;

    if bootstrap.has_client_id() {
        bootstrap.login()?;
        println!("Google sign-in settings are valid.");
    } else {
        println!("No Google client id configured; sign-in will not be available.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_defaults() {
        let bootstrap = Bootstrap::new(ClientConfig::default(), None);
        assert!(validate(&bootstrap).is_ok());
    }

    #[test]
    fn validate_rejects_bad_backend_url() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "planpal without scheme".to_string();
        let bootstrap = Bootstrap::new(config, None);
        assert!(matches!(validate(&bootstrap), Err(ClientError::Config(_))));
    }

    #[test]
    fn validate_rejects_non_loopback_redirect_with_client_id() {
        let mut config = ClientConfig::default();
        config.google.redirect_uri = "https://planpal.example.com/callback".to_string();
        let bootstrap = Bootstrap::new(config, Some("id.apps.googleusercontent.com".to_string()));
        assert!(matches!(validate(&bootstrap), Err(ClientError::Backend(_))));
    }

    #[test]
    fn validate_reports_unresolvable_client_id() {
        let mut config = ClientConfig::default();
        config.google.client_id = Some("env::_PLANPAL_VALIDATE_UNSET_4711".to_string());
        let bootstrap = Bootstrap::new(config, None);
        let err = validate(&bootstrap).unwrap_err();
        assert!(err.to_string().contains("google.client_id"));
    }

    #[test]
    fn dump_serializes_defaults() {
        assert!(dump(&ClientConfig::default()).is_ok());
    }
}
