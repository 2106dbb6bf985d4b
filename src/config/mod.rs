//! Configuration file handling.
//!
//! Profiles live in a TOML file under the user configuration directory, one table per profile.
//! Values can be overridden through `MONGODB_ATLAS_*` environment variables.
use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use tracing::debug;

mod profile;

pub use profile::{Profile, ProfileProperty, Service};

pub const DEFAULT_PROFILE: &str = "default";
/// Prefix of the environment variables overriding profile properties.
pub const ENV_PREFIX: &str = "MONGODB_ATLAS_";
const CONFIG_DIR_NAME: &str = "atlascli";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from {path}: {err}")]
    Parse {
        path: PathBuf,
        #[source]
        err: Box<figment::Error>,
    },
    #[error("invalid environment override: {0}")]
    Env(#[source] Box<figment::Error>),
    #[error("failed to write config to {path}: {err}")]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine the user configuration directory")]
    NoConfigDir,
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("invalid value '{value}' for property '{property}'")]
    InvalidValue {
        property: ProfileProperty,
        value: String,
    },
    #[error("profile '{profile}' has no '{property}' configured")]
    MissingProperty {
        profile: String,
        property: ProfileProperty,
    },
    #[error("profile '{0}' does not exist")]
    ProfileNotFound(String),
    #[error("profile '{0}' already exists")]
    ProfileExists(String),
}

/// Profiles loaded from a configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

/// Directory holding the configuration file for the current platform.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    user_config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(target_os = "windows")]
fn user_config_dir() -> Option<PathBuf> {
    env_path("APPDATA")
}

#[cfg(target_os = "macos")]
fn user_config_dir() -> Option<PathBuf> {
    env_path("HOME").map(|home| home.join("Library").join("Application Support"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn user_config_dir() -> Option<PathBuf> {
    env_path("XDG_CONFIG_HOME").or_else(|| env_path("HOME").map(|home| home.join(".config")))
}

impl ConfigStore {
    /// Load the configuration file from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load the configuration from `path`. A missing file yields an empty store.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, starting empty");
        }

        let mut profiles: BTreeMap<String, Profile> = Figment::from(Toml::file(&path))
            .extract()
            .map_err(|err| ConfigError::Parse {
                path: path.clone(),
                err: Box::new(err),
            })?;

        for (name, profile) in profiles.iter_mut() {
            profile.name = name.clone();
        }

        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// The stored profile, without environment overrides.
    pub fn stored_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// The profile `name` with environment overrides applied.
    ///
    /// An unknown name yields an empty profile so that environment-only setups work.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        let stored = self
            .profiles
            .get(name)
            .cloned()
            .unwrap_or_else(|| Profile::new(name));

        let properties = ProfileProperty::ALL.map(|property| property.as_str());
        let mut profile: Profile = Figment::from(Serialized::defaults(stored))
            .merge(Env::prefixed(ENV_PREFIX).only(&properties))
            .extract()
            .map_err(|err| ConfigError::Env(Box::new(err)))?;
        profile.name = name.to_string();

        Ok(profile)
    }

    pub fn set(
        &mut self,
        profile: &str,
        property: ProfileProperty,
        value: &str,
    ) -> Result<(), ConfigError> {
        self.profiles
            .entry(profile.to_string())
            .or_insert_with(|| Profile::new(profile))
            .set(property, value)
    }

    /// Replace a whole profile.
    pub fn insert_profile(&mut self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    pub fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        self.profiles
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    pub fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), ConfigError> {
        if self.profiles.contains_key(new) {
            return Err(ConfigError::ProfileExists(new.to_string()));
        }

        let mut profile = self
            .profiles
            .remove(old)
            .ok_or_else(|| ConfigError::ProfileNotFound(old.to_string()))?;
        profile.name = new.to_string();
        self.profiles.insert(new.to_string(), profile);

        Ok(())
    }

    /// Write the store back to its file, readable by the current user only.
    pub fn save(&self) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(&self.profiles)?;
        let write_err = |err| ConfigError::Write {
            path: self.path.clone(),
            err,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
        let mut file = options.open(&self.path).map_err(write_err)?;

        // An existing file keeps its mode on open.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }
        file.write_all(contents.as_bytes()).map_err(write_err)?;

        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[default]
public_api_key = "public"
private_api_key = "private"
project_id = "5e2211c17a3e5a48f5497de3"

[gov]
service = "cloudgov"
output = "json"
"#;

    fn write_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, CONFIG).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("missing.toml")).unwrap();
        assert!(store.profile_names().is_empty());
    }

    #[test]
    fn test_load_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(write_config(&dir)).unwrap();

        assert_eq!(store.profile_names(), vec!["default", "gov"]);
        let default = store.stored_profile("default").unwrap();
        assert_eq!(default.name, "default");
        assert_eq!(default.public_api_key.as_deref(), Some("public"));
        assert_eq!(
            store.stored_profile("gov").unwrap().service().unwrap(),
            Service::CloudGov
        );
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[default\n").unwrap();

        assert!(matches!(
            ConfigStore::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_set_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut store = ConfigStore::load_from(&path).unwrap();
        store
            .set("default", ProfileProperty::OrgId, "5e2211c17a3e5a48f5497de4")
            .unwrap();
        store.save().unwrap();

        let reloaded = ConfigStore::load_from(&path).unwrap();
        assert_eq!(
            reloaded.stored_profile("default").unwrap().org_id.as_deref(),
            Some("5e2211c17a3e5a48f5497de4")
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = ConfigStore::load_from(&path).unwrap();
        store
            .set("default", ProfileProperty::PrivateApiKey, "rotated")
            .unwrap();
        store.save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            ConfigStore::load_from(&path)
                .unwrap()
                .stored_profile("default")
                .unwrap()
                .private_api_key
                .as_deref(),
            Some("rotated")
        );
    }

    #[test]
    fn test_env_overrides_stored_profile() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", CONFIG)?;
            jail.set_env("MONGODB_ATLAS_PROJECT_ID", "5e2211c17a3e5a48f5497de4");
            jail.set_env("MONGODB_ATLAS_OUTPUT", "json");
            jail.set_env("MONGODB_ATLAS_PUBLIC_API_KEY", "12345");
            jail.set_env("MONGODB_ATLAS_UNRELATED", "ignored");

            let store = ConfigStore::load_from(jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;
            let profile = store.profile("default").map_err(|e| e.to_string())?;

            assert_eq!(profile.name, "default");
            assert_eq!(profile.project_id.as_deref(), Some("5e2211c17a3e5a48f5497de4"));
            assert_eq!(profile.public_api_key.as_deref(), Some("12345"));
            assert_eq!(profile.private_api_key.as_deref(), Some("private"));
            assert_eq!(profile.output_format(), crate::formatting::Format::Json);

            // The stored profile is untouched.
            assert_eq!(
                store.stored_profile("default").unwrap().project_id.as_deref(),
                Some("5e2211c17a3e5a48f5497de3")
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_only_profile() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MONGODB_ATLAS_ACCESS_TOKEN", "token");

            let store = ConfigStore::load_from(jail.directory().join("missing.toml"))
                .map_err(|e| e.to_string())?;
            let profile = store.profile("ci").map_err(|e| e.to_string())?;

            assert_eq!(profile.name, "ci");
            assert_eq!(
                profile.credentials(),
                crate::client::Credentials::AccessToken("token".to_string())
            );
            Ok(())
        });
    }

    #[test]
    fn test_rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(write_config(&dir)).unwrap();

        assert!(matches!(
            store.rename_profile("default", "gov"),
            Err(ConfigError::ProfileExists(_))
        ));

        store.rename_profile("default", "prod").unwrap();
        assert_eq!(store.stored_profile("prod").unwrap().name, "prod");
        assert!(store.stored_profile("default").is_none());

        store.delete_profile("prod").unwrap();
        assert!(matches!(
            store.delete_profile("prod"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }
}
