//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [catalog] section
    if let Some(section) = ini.section(Some("catalog")) {
        if let Some(v) = section.get("service") {
            config.catalog.service = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "catalog".to_string(),
                key: "service".to_string(),
                value: v.to_string(),
                reason: "must be one of: copernicus, earthexplorer, google_cloud".to_string(),
            })?;
        }
        if let Some(v) = section.get("download_directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.catalog.download_directory = expand_tilde(v);
            }
        }
    }

    // [credentials] section
    if let Some(section) = ini.section(Some("credentials")) {
        config.credentials.username = non_empty(section.get("username"));
        config.credentials.password = non_empty(section.get("password"));
    }

    // [http] section
    if let Some(section) = ini.section(Some("http")) {
        if let Some(v) = section.get("timeout_secs") {
            config.http.timeout_secs = parse_seconds("timeout_secs", v)?;
        }
        if let Some(v) = section.get("connect_timeout_secs") {
            config.http.connect_timeout_secs = parse_seconds("connect_timeout_secs", v)?;
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_seconds(key: &str, value: &str) -> Result<u64, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigFileError::InvalidValue {
            section: "http".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer (seconds)".to_string(),
        }),
    }
}

/// Expand `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DEFAULT_DOWNLOAD_DIRECTORY;
    use crate::provider::ServiceKind;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
[catalog]
service = earthexplorer
download_directory = /data/scenes

[credentials]
username = alice
password = secret

[http]
timeout_secs = 600
connect_timeout_secs = 10
"#,
        )
        .unwrap();

        assert_eq!(config.catalog.service, ServiceKind::EarthExplorer);
        assert_eq!(config.catalog.download_directory, PathBuf::from("/data/scenes"));
        assert_eq!(config.credentials.username.as_deref(), Some("alice"));
        assert_eq!(config.credentials.password.as_deref(), Some("secret"));
        assert_eq!(config.http.timeout_secs, 600);
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn test_partial_config() {
        let config = parse(
            r#"
[catalog]
service = google_cloud
"#,
        )
        .unwrap();

        assert_eq!(config.catalog.service, ServiceKind::GoogleCloud);
        assert_eq!(
            config.catalog.download_directory,
            PathBuf::from(DEFAULT_DOWNLOAD_DIRECTORY)
        );
        assert!(config.credentials.username.is_none());
        assert_eq!(config.http.timeout_secs, 300);
    }

    #[test]
    fn test_invalid_service() {
        let err = parse("[catalog]\nservice = planet\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "catalog");
                assert_eq!(key, "service");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(matches!(
            parse("[http]\ntimeout_secs = soon\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("[http]\nconnect_timeout_secs = 0\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_credentials_are_unset() {
        let config = parse("[credentials]\nusername =\npassword = \n").unwrap();
        assert!(config.credentials.username.is_none());
        assert!(config.credentials.password.is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
