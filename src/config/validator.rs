use super::{RunConfig, Settings, AUTH_COOKIE, PRIMARY_SERVER};
use crate::{Error, Result};

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check every required key and produce the typed run configuration
    ///
    /// Keys are checked in the order given; the first one that is absent or
    /// blank after trimming is reported. `PRIMARY_SERVER` and `AUTH_COOKIE` are
    /// always required in addition to `required`.
    pub fn validate(settings: &Settings, required: &[&str]) -> Result<RunConfig> {
        for key in [PRIMARY_SERVER, AUTH_COOKIE].iter().chain(required) {
            Self::validate_key(settings, key)?;
        }

        let primary_server = settings.get(PRIMARY_SERVER).unwrap_or_default();
        if primary_server.contains(|c: char| c == '/' || c.is_whitespace()) {
            return Err(Error::Config(format!(
                "{} must be a bare server name, got '{}'",
                PRIMARY_SERVER, primary_server
            )));
        }

        Ok(RunConfig::new(
            primary_server.to_string(),
            settings.get(AUTH_COOKIE).unwrap_or_default().to_string(),
            settings.clone(),
        ))
    }

    pub fn validate_key(settings: &Settings, key: &str) -> Result<()> {
        match settings.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(Error::MissingConfigKey {
                key: key.to_string(),
            }),
        }
    }
}
