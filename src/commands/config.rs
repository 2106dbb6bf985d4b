//! Profile management: everything here works on the local configuration file only.
use std::fmt::Display;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Serialize, ser::SerializeMap};
use tracing::{debug, info};

use crate::{
    args::config as args,
    commands::{
        CommandWithOutput,
        delete::{DeleteResult, ResourceKind, confirm_deletion, delete_question},
        validators::{ObjectIdValidator, RequiredValidator, UrlValidator},
    },
    config::{ConfigStore, Profile, ProfileProperty, Service},
    interaction::{
        ConfirmationPrompt, InputPrompt, InputPromptOptions, InputPromptResult,
        InputPromptValidator, InputValidator, Interaction, PasswordPrompt, SelectPrompt,
        SelectPromptOptions, SelectPromptResult,
    },
    table::Table,
    template::Templated,
};

const LIST_TEMPLATE: &str = "PROFILE NAME{{range .}}\n{{.}}{{end}}\n";
const REDACTED: &str = "redacted";
const OUTPUT_OPTIONS: [&str; 2] = ["plaintext", "json"];

/// Outcome of the commands that change the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfigResult {
    Saved { profile: String },
    Updated { profile: String, property: ProfileProperty },
    Renamed { old_name: String, new_name: String },
    Canceled { profile: String },
}

impl Display for ConfigResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved { profile } => write!(
                f,
                "Your profile '{profile}' is now configured.\nYou can use [atlas config set] to change these settings at a later time."
            ),
            Self::Updated { profile, property } => {
                write!(f, "Updated property '{property}' of profile '{profile}'")
            }
            Self::Renamed { old_name, new_name } => {
                write!(f, "The profile {old_name} was renamed to {new_name}.")
            }
            Self::Canceled { profile } => write!(f, "Profile '{profile}' not configured"),
        }
    }
}

// Interaction dependencies for the init command
pub trait InitInteraction: InputPrompt + PasswordPrompt + SelectPrompt + Send + Sync {}
impl<T: InputPrompt + PasswordPrompt + SelectPrompt + Send + Sync> InitInteraction for T {}

pub struct Init {
    store: ConfigStore,
    interaction: Box<dyn InitInteraction>,
    profile_name: String,
    gov: bool,
}

impl Init {
    pub fn new(args: args::Init, store: ConfigStore, profile_name: String) -> Self {
        Self {
            store,
            interaction: Box::new(Interaction::new()),
            profile_name,
            gov: args.gov,
        }
    }

    /// Prompt for one property, keeping the stored value as the default.
    ///
    /// Returns `None` when the user cancels.
    fn prompt(
        &self,
        profile: &Profile,
        property: ProfileProperty,
        message: &str,
        validator: impl InputValidator + Send + Sync + 'static,
    ) -> Result<Option<String>> {
        let options = InputPromptOptions::builder()
            .message(message.to_string())
            .validator(InputPromptValidator::new(validator))
            .default_opt(profile.get(property).map(ToString::to_string))
            .build();

        match self
            .interaction
            .input(options)
            .with_context(|| format!("prompting for {property}"))?
        {
            InputPromptResult::Input(value) => Ok(Some(value)),
            InputPromptResult::Canceled => Ok(None),
        }
    }

    fn prompt_profile(&self, mut profile: Profile) -> Result<Option<Profile>> {
        if self.gov {
            profile.set(ProfileProperty::Service, &Service::CloudGov.to_string())?;
        }

        if profile.service()? == Service::OpsManager {
            let Some(url) = self.prompt(
                &profile,
                ProfileProperty::OpsManagerUrl,
                "URL to Access Ops Manager:",
                UrlValidator,
            )?
            else {
                return Ok(None);
            };
            profile.set(ProfileProperty::OpsManagerUrl, &url)?;
        }

        let Some(public_key) = self.prompt(
            &profile,
            ProfileProperty::PublicApiKey,
            "Public API Key:",
            RequiredValidator,
        )?
        else {
            return Ok(None);
        };
        profile.set(ProfileProperty::PublicApiKey, &public_key)?;

        let private_key = match self
            .interaction
            .password("Private API Key:")
            .context("prompting for private_api_key")?
        {
            InputPromptResult::Input(value) => value,
            InputPromptResult::Canceled => return Ok(None),
        };
        // An empty answer keeps the stored key.
        if !private_key.is_empty() {
            profile.set(ProfileProperty::PrivateApiKey, &private_key)?;
        }

        for (property, message) in [
            (ProfileProperty::OrgId, "Default Org ID:"),
            (ProfileProperty::ProjectId, "Default Project ID:"),
        ] {
            let Some(value) = self.prompt(&profile, property, message, ObjectIdValidator)? else {
                return Ok(None);
            };
            profile.set(property, &value)?;
        }

        let output = self
            .interaction
            .select(
                SelectPromptOptions::builder()
                    .message("Default Output Format:")
                    .options(OUTPUT_OPTIONS)
                    .build(),
            )
            .context("prompting for output")?;
        match output {
            SelectPromptResult::Selected(value) => profile.set(ProfileProperty::Output, &value)?,
            SelectPromptResult::Canceled => return Ok(None),
        }

        Ok(Some(profile))
    }
}

#[async_trait]
impl CommandWithOutput for Init {
    type Output = ConfigResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let profile = self
            .store
            .stored_profile(&self.profile_name)
            .cloned()
            .unwrap_or_else(|| Profile::new(&self.profile_name));

        let Some(profile) = self.prompt_profile(profile)? else {
            return Ok(ConfigResult::Canceled {
                profile: self.profile_name.clone(),
            });
        };

        self.store.insert_profile(profile);
        self.store.save().context("saving configuration")?;
        info!(profile = %self.profile_name, "profile configured");

        Ok(ConfigResult::Saved {
            profile: self.profile_name.clone(),
        })
    }
}

pub struct List {
    store: ConfigStore,
}

impl List {
    pub fn new(_args: args::List, store: ConfigStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Vec<String>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        Ok(Templated::new(LIST_TEMPLATE, self.store.profile_names()))
    }
}

/// Settings of a profile, in property order, with secrets redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings(Vec<(ProfileProperty, String)>);

impl ProfileSettings {
    pub fn from_profile(profile: &Profile) -> Self {
        Self(
            ProfileProperty::ALL
                .into_iter()
                .filter_map(|property| {
                    let value = profile.get(property)?;
                    let value = if property.is_secret() {
                        REDACTED.to_string()
                    } else {
                        value.to_string()
                    };
                    Some((property, value))
                })
                .collect(),
        )
    }
}

impl Serialize for ProfileSettings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (property, value) in &self.0 {
            map.serialize_entry(property.as_str(), value)?;
        }
        map.end()
    }
}

impl Display for ProfileSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = Table::new(
            vec!["SETTING".to_string(), "VALUE".to_string()],
            self.0
                .iter()
                .map(|(property, value)| vec![property.to_string(), value.clone()])
                .collect(),
        );
        write!(f, "{table}")
    }
}

pub struct Describe {
    store: ConfigStore,
    name: String,
}

impl Describe {
    pub fn new(args: args::Describe, store: ConfigStore) -> Self {
        Self {
            store,
            name: args.name,
        }
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = ProfileSettings;

    async fn execute(&mut self) -> Result<Self::Output> {
        let profile = self
            .store
            .stored_profile(&self.name)
            .ok_or_else(|| crate::config::ConfigError::ProfileNotFound(self.name.clone()))?;

        Ok(ProfileSettings::from_profile(profile))
    }
}

pub struct Set {
    store: ConfigStore,
    profile_name: String,
    property: String,
    value: String,
}

impl Set {
    pub fn new(args: args::Set, store: ConfigStore, profile_name: String) -> Self {
        Self {
            store,
            profile_name,
            property: args.property,
            value: args.value,
        }
    }
}

#[async_trait]
impl CommandWithOutput for Set {
    type Output = ConfigResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let property: ProfileProperty = self.property.parse()?;
        self.store
            .set(&self.profile_name, property, &self.value)
            .with_context(|| format!("setting {property}"))?;
        self.store.save().context("saving configuration")?;
        debug!(profile = %self.profile_name, %property, "property updated");

        Ok(ConfigResult::Updated {
            profile: self.profile_name.clone(),
            property,
        })
    }
}

pub struct Delete {
    store: ConfigStore,
    interaction: Box<dyn ConfirmationPrompt + Send + Sync>,
    name: String,
    force: bool,
}

impl Delete {
    pub fn new(args: args::Delete, store: ConfigStore) -> Self {
        Self {
            store,
            interaction: Box::new(Interaction::new()),
            name: args.name,
            force: args.force,
        }
    }
}

#[async_trait]
impl CommandWithOutput for Delete {
    type Output = DeleteResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        if self.store.stored_profile(&self.name).is_none() {
            return Err(crate::config::ConfigError::ProfileNotFound(self.name.clone()).into());
        }

        let confirmed = confirm_deletion(
            self.interaction.as_ref(),
            self.force,
            delete_question(&self.name),
            None,
        )?;
        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::Profile,
                name: self.name.clone(),
            });
        }

        self.store.delete_profile(&self.name)?;
        self.store.save().context("saving configuration")?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::Profile,
            name: self.name.clone(),
        })
    }
}

pub struct Rename {
    store: ConfigStore,
    old_name: String,
    new_name: String,
}

impl Rename {
    pub fn new(args: args::Rename, store: ConfigStore) -> Self {
        Self {
            store,
            old_name: args.old_name,
            new_name: args.new_name,
        }
    }
}

#[async_trait]
impl CommandWithOutput for Rename {
    type Output = ConfigResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        self.store.rename_profile(&self.old_name, &self.new_name)?;
        self.store.save().context("saving configuration")?;

        Ok(ConfigResult::Renamed {
            old_name: self.old_name.clone(),
            new_name: self.new_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::interaction::{ConfirmationPromptResult, mocks::MockInteraction};

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";
    const ORG_ID: &str = "5e2211c17a3e5a48f5497de9";

    fn store_with_default(dir: &Path) -> ConfigStore {
        let mut store = ConfigStore::load_from(dir.join("config.toml")).unwrap();
        store
            .set("default", ProfileProperty::PublicApiKey, "public")
            .unwrap();
        store
            .set("default", ProfileProperty::PrivateApiKey, "private")
            .unwrap();
        store
            .set("default", ProfileProperty::ProjectId, PROJECT_ID)
            .unwrap();
        store.save().unwrap();
        store
    }

    fn reload(dir: &Path) -> ConfigStore {
        ConfigStore::load_from(dir.join("config.toml")).unwrap()
    }

    fn init_command(store: ConfigStore, interaction: MockInteraction, gov: bool) -> Init {
        Init {
            store,
            interaction: Box::new(interaction),
            profile_name: "staging".to_string(),
            gov,
        }
    }

    #[tokio::test]
    async fn test_init_saves_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();

        let mut answers = vec![PROJECT_ID, ORG_ID, "public"];
        let mut interaction = MockInteraction::new();
        interaction
            .expect_input()
            .times(3)
            .returning(move |_| Ok(InputPromptResult::Input(answers.pop().unwrap().to_string())));
        interaction
            .expect_password()
            .withf(|message| message == "Private API Key:")
            .return_once(|_| Ok(InputPromptResult::Input("private".to_string())));
        interaction
            .expect_select()
            .return_once(|_| Ok(SelectPromptResult::Selected("json".to_string())));

        let output = init_command(store, interaction, true)
            .execute()
            .await
            .unwrap();
        assert_eq!(
            output,
            ConfigResult::Saved {
                profile: "staging".to_string()
            }
        );

        let store = reload(dir.path());
        let profile = store.stored_profile("staging").unwrap();
        assert_eq!(profile.service.as_deref(), Some("cloudgov"));
        assert_eq!(profile.public_api_key.as_deref(), Some("public"));
        assert_eq!(profile.private_api_key.as_deref(), Some("private"));
        assert_eq!(profile.org_id.as_deref(), Some(ORG_ID));
        assert_eq!(profile.project_id.as_deref(), Some(PROJECT_ID));
        assert_eq!(profile.output.as_deref(), Some("json"));
    }

    #[tokio::test]
    async fn test_init_prompts_for_ops_manager_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        store
            .set("staging", ProfileProperty::Service, "opsmanager")
            .unwrap();

        let mut answers = vec!["", "", "public", "https://om.example.com"];
        let mut interaction = MockInteraction::new();
        interaction
            .expect_input()
            .times(4)
            .returning(move |_| Ok(InputPromptResult::Input(answers.pop().unwrap().to_string())));
        interaction
            .expect_password()
            .return_once(|_| Ok(InputPromptResult::Input("private".to_string())));
        interaction
            .expect_select()
            .return_once(|_| Ok(SelectPromptResult::Selected("plaintext".to_string())));

        init_command(store, interaction, false)
            .execute()
            .await
            .unwrap();

        let store = reload(dir.path());
        let profile = store.stored_profile("staging").unwrap();
        assert_eq!(
            profile.ops_manager_url.as_deref(),
            Some("https://om.example.com")
        );
        assert_eq!(profile.org_id, None);
    }

    #[tokio::test]
    async fn test_init_canceled_does_not_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();

        let mut interaction = MockInteraction::new();
        interaction
            .expect_input()
            .return_once(|_| Ok(InputPromptResult::Canceled));
        interaction.expect_password().never();

        let output = init_command(store, interaction, false)
            .execute()
            .await
            .unwrap();

        assert_eq!(output.to_string(), "Profile 'staging' not configured");
        assert!(!dir.path().join("config.toml").exists());
    }

    #[tokio::test]
    async fn test_list_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_default(dir.path());
        store.set("staging", ProfileProperty::Output, "json").unwrap();

        let output = List { store }.execute().await.unwrap();

        assert_eq!(output.to_string(), "PROFILE NAME\ndefault\nstaging\n");
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            serde_json::json!(["default", "staging"])
        );
    }

    #[tokio::test]
    async fn test_describe_redacts_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let output = Describe {
            store,
            name: "default".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "SETTING            VALUE\npublic_api_key     public\nprivate_api_key    redacted\nproject_id         5e2211c17a3e5a48f5497de3\n"
        );
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            serde_json::json!({
                "public_api_key": "public",
                "private_api_key": "redacted",
                "project_id": PROJECT_ID,
            })
        );
    }

    #[tokio::test]
    async fn test_describe_unknown_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let err = Describe {
            store,
            name: "missing".to_string(),
        }
        .execute()
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "profile 'missing' does not exist");
    }

    #[tokio::test]
    async fn test_set_property() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let output = Set {
            store,
            profile_name: "default".to_string(),
            property: "output".to_string(),
            value: "json".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(
            output.to_string(),
            "Updated property 'output' of profile 'default'"
        );
        assert_eq!(
            reload(dir.path())
                .stored_profile("default")
                .unwrap()
                .output
                .as_deref(),
            Some("json")
        );
    }

    #[tokio::test]
    async fn test_set_unknown_property() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let err = Set {
            store,
            profile_name: "default".to_string(),
            property: "color".to_string(),
            value: "blue".to_string(),
        }
        .execute()
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "unknown property 'color'");
    }

    #[tokio::test]
    async fn test_delete_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let mut interaction = MockInteraction::new();
        interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::Yes));

        let output = Delete {
            store,
            interaction: Box::new(interaction),
            name: "default".to_string(),
            force: false,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Profile 'default' deleted");
        assert!(reload(dir.path()).profile_names().is_empty());
    }

    #[tokio::test]
    async fn test_delete_declined_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let mut interaction = MockInteraction::new();
        interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::No));

        let output = Delete {
            store,
            interaction: Box::new(interaction),
            name: "default".to_string(),
            force: false,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Profile not deleted");
        assert_eq!(reload(dir.path()).profile_names(), vec!["default"]);
    }

    #[tokio::test]
    async fn test_rename_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_default(dir.path());

        let output = Rename {
            store,
            old_name: "default".to_string(),
            new_name: "prod".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "The profile default was renamed to prod.");
        let store = reload(dir.path());
        assert_eq!(store.profile_names(), vec!["prod"]);
        assert_eq!(
            store.stored_profile("prod").unwrap().project_id.as_deref(),
            Some(PROJECT_ID)
        );
    }
}
