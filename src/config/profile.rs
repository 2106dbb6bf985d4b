//! Profiles stored in the configuration file.
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{client::Credentials, config::ConfigError, formatting::Format};

pub const CLOUD_URL: &str = "https://cloud.mongodb.com/";
pub const CLOUD_GOV_URL: &str = "https://cloud.mongodbgov.com/";

/// Service a profile talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Service {
    #[default]
    Cloud,
    CloudGov,
    OpsManager,
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "cloud" => Ok(Self::Cloud),
            "cloudgov" => Ok(Self::CloudGov),
            "opsmanager" => Ok(Self::OpsManager),
            other => Err(ConfigError::InvalidValue {
                property: ProfileProperty::Service,
                value: other.to_string(),
            }),
        }
    }
}

impl Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cloud => write!(f, "cloud"),
            Self::CloudGov => write!(f, "cloudgov"),
            Self::OpsManager => write!(f, "opsmanager"),
        }
    }
}

/// Settable profile properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileProperty {
    Service,
    PublicApiKey,
    PrivateApiKey,
    ClientId,
    ClientSecret,
    AccessToken,
    OpsManagerUrl,
    OrgId,
    ProjectId,
    Output,
}

impl ProfileProperty {
    pub const ALL: [ProfileProperty; 10] = [
        Self::Service,
        Self::PublicApiKey,
        Self::PrivateApiKey,
        Self::ClientId,
        Self::ClientSecret,
        Self::AccessToken,
        Self::OpsManagerUrl,
        Self::OrgId,
        Self::ProjectId,
        Self::Output,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::PublicApiKey => "public_api_key",
            Self::PrivateApiKey => "private_api_key",
            Self::ClientId => "client_id",
            Self::ClientSecret => "client_secret",
            Self::AccessToken => "access_token",
            Self::OpsManagerUrl => "ops_manager_url",
            Self::OrgId => "org_id",
            Self::ProjectId => "project_id",
            Self::Output => "output",
        }
    }

    /// Secrets are never printed back to the user.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            Self::PrivateApiKey | Self::ClientSecret | Self::AccessToken
        )
    }

}

impl FromStr for ProfileProperty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|property| property.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownProperty(s.to_string()))
    }
}

impl Display for ProfileProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProfileProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A named set of connection settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub service: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_api_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub private_api_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_secret: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub ops_manager_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub org_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "property_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<String>,
}

/// Environment values arrive parsed as numbers or booleans when they look like one.
/// Empty values leave the property unset.
fn property_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    });

    Ok(value.filter(|value| !value.is_empty()))
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("service", &self.service)
            .field("public_api_key", &self.public_api_key)
            .field("private_api_key", &self.private_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("ops_manager_url", &self.ops_manager_url)
            .field("org_id", &self.org_id)
            .field("project_id", &self.project_id)
            .field("output", &self.output)
            .finish()
    }
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, property: ProfileProperty) -> Option<&str> {
        match property {
            ProfileProperty::Service => self.service.as_deref(),
            ProfileProperty::PublicApiKey => self.public_api_key.as_deref(),
            ProfileProperty::PrivateApiKey => self.private_api_key.as_deref(),
            ProfileProperty::ClientId => self.client_id.as_deref(),
            ProfileProperty::ClientSecret => self.client_secret.as_deref(),
            ProfileProperty::AccessToken => self.access_token.as_deref(),
            ProfileProperty::OpsManagerUrl => self.ops_manager_url.as_deref(),
            ProfileProperty::OrgId => self.org_id.as_deref(),
            ProfileProperty::ProjectId => self.project_id.as_deref(),
            ProfileProperty::Output => self.output.as_deref(),
        }
    }

    fn slot(&mut self, property: ProfileProperty) -> &mut Option<String> {
        match property {
            ProfileProperty::Service => &mut self.service,
            ProfileProperty::PublicApiKey => &mut self.public_api_key,
            ProfileProperty::PrivateApiKey => &mut self.private_api_key,
            ProfileProperty::ClientId => &mut self.client_id,
            ProfileProperty::ClientSecret => &mut self.client_secret,
            ProfileProperty::AccessToken => &mut self.access_token,
            ProfileProperty::OpsManagerUrl => &mut self.ops_manager_url,
            ProfileProperty::OrgId => &mut self.org_id,
            ProfileProperty::ProjectId => &mut self.project_id,
            ProfileProperty::Output => &mut self.output,
        }
    }

    /// Set a property, validating values that have a fixed vocabulary.
    ///
    /// An empty value clears the property.
    pub fn set(&mut self, property: ProfileProperty, value: &str) -> Result<(), ConfigError> {
        match property {
            ProfileProperty::Service => {
                value.parse::<Service>()?;
            }
            ProfileProperty::Output => {
                value
                    .parse::<Format>()
                    .map_err(|_| ConfigError::InvalidValue {
                        property,
                        value: value.to_string(),
                    })?;
            }
            ProfileProperty::OpsManagerUrl if !value.is_empty() => {
                url::Url::parse(value).map_err(|_| ConfigError::InvalidValue {
                    property,
                    value: value.to_string(),
                })?;
            }
            _ => {}
        }

        *self.slot(property) = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }

    pub fn service(&self) -> Result<Service, ConfigError> {
        self.service.as_deref().unwrap_or_default().parse()
    }

    /// Base URL of the API, always ending with a slash.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let url = match (self.service()?, self.ops_manager_url.as_deref()) {
            (_, Some(url)) if !url.is_empty() => url.to_string(),
            (Service::Cloud, _) => CLOUD_URL.to_string(),
            (Service::CloudGov, _) => CLOUD_GOV_URL.to_string(),
            (Service::OpsManager, _) => {
                return Err(ConfigError::MissingProperty {
                    profile: self.name.clone(),
                    property: ProfileProperty::OpsManagerUrl,
                });
            }
        };

        Ok(if url.ends_with('/') {
            url
        } else {
            format!("{url}/")
        })
    }

    /// Credentials to authenticate with.
    ///
    /// An access token wins over a service account, which wins over API keys.
    pub fn credentials(&self) -> Credentials {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        if let Some(token) = non_empty(&self.access_token) {
            return Credentials::AccessToken(token);
        }

        if let (Some(client_id), Some(client_secret)) =
            (non_empty(&self.client_id), non_empty(&self.client_secret))
        {
            return Credentials::ServiceAccount {
                client_id,
                client_secret,
            };
        }

        if let (Some(public_key), Some(private_key)) = (
            non_empty(&self.public_api_key),
            non_empty(&self.private_api_key),
        ) {
            return Credentials::ApiKeys {
                public_key,
                private_key,
            };
        }

        Credentials::None
    }

    pub fn output_format(&self) -> Format {
        self.output
            .as_deref()
            .and_then(|output| output.parse().ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_round_trip() {
        for property in ProfileProperty::ALL {
            assert_eq!(property.as_str().parse::<ProfileProperty>().unwrap(), property);
        }
        assert!(matches!(
            "unknown".parse::<ProfileProperty>(),
            Err(ConfigError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_deserialize_scalar_values() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "public_api_key": 12345,
            "org_id": "",
            "output": "json",
        }))
        .unwrap();

        assert_eq!(profile.public_api_key.as_deref(), Some("12345"));
        assert_eq!(profile.org_id, None);
        assert_eq!(profile.output_format(), Format::Json);
    }

    #[test]
    fn test_base_url() {
        let mut profile = Profile::new("default");
        assert_eq!(profile.base_url().unwrap(), CLOUD_URL);

        profile.set(ProfileProperty::Service, "cloudgov").unwrap();
        assert_eq!(profile.base_url().unwrap(), CLOUD_GOV_URL);

        profile.set(ProfileProperty::Service, "opsmanager").unwrap();
        assert!(matches!(
            profile.base_url(),
            Err(ConfigError::MissingProperty { .. })
        ));

        profile
            .set(ProfileProperty::OpsManagerUrl, "http://localhost:8080")
            .unwrap();
        assert_eq!(profile.base_url().unwrap(), "http://localhost:8080/");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut profile = Profile::new("default");
        assert!(profile.set(ProfileProperty::Service, "azure").is_err());
        assert!(profile.set(ProfileProperty::Output, "xml").is_err());
        assert!(profile.set(ProfileProperty::OpsManagerUrl, "not a url").is_err());
    }

    #[test]
    fn test_set_empty_clears() {
        let mut profile = Profile::new("default");
        profile.set(ProfileProperty::OrgId, "abc").unwrap();
        profile.set(ProfileProperty::OrgId, "").unwrap();
        assert_eq!(profile.org_id, None);
    }

    #[test]
    fn test_credentials_precedence() {
        let mut profile = Profile::new("default");
        assert_eq!(profile.credentials(), Credentials::None);

        profile.public_api_key = Some("public".to_string());
        profile.private_api_key = Some("private".to_string());
        assert_eq!(
            profile.credentials(),
            Credentials::ApiKeys {
                public_key: "public".to_string(),
                private_key: "private".to_string()
            }
        );

        profile.client_id = Some("mdb_sa_id".to_string());
        profile.client_secret = Some("secret".to_string());
        assert!(matches!(
            profile.credentials(),
            Credentials::ServiceAccount { .. }
        ));

        profile.access_token = Some("token".to_string());
        assert_eq!(
            profile.credentials(),
            Credentials::AccessToken("token".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut profile = Profile::new("default");
        profile.private_api_key = Some("very-secret".to_string());
        let debug = format!("{profile:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
