use anyhow::{Context, Result};

use crate::{client::AtlasClient, commands::validators::validate_object_id, config::Profile};

/// Build a command from its arguments, the selected profile and an API client.
pub trait TryFromWithAtlasClient<T>: Sized {
    fn try_from_with_atlas(value: T, context: &AtlasContext) -> Result<Self>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MissingIdError {
    #[error(
        "no project ID provided, use the --projectId flag, the MONGODB_ATLAS_PROJECT_ID environment variable or set project_id in your profile"
    )]
    ProjectId,
    #[error(
        "no organization ID provided, use the --orgId flag, the MONGODB_ATLAS_ORG_ID environment variable or set org_id in your profile"
    )]
    OrgId,
}

/// The profile and client a command runs against.
#[derive(Debug, Clone)]
pub struct AtlasContext {
    pub profile: Profile,
    pub client: AtlasClient,
}

impl AtlasContext {
    pub fn from_profile(profile: Profile) -> Result<Self> {
        let client = AtlasClient::from_profile(&profile)
            .with_context(|| format!("creating API client for profile '{}'", profile.name))?;
        Ok(Self { profile, client })
    }

    /// Project ID from the flag, falling back to the profile (which includes the environment).
    pub fn project_id(&self, flag: Option<String>) -> Result<String> {
        let project_id = flag
            .or_else(|| self.profile.project_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(MissingIdError::ProjectId)?;
        validate_object_id(&project_id).context("invalid project ID")?;
        Ok(project_id)
    }

    /// Organization ID from the flag, falling back to the profile (which includes the environment).
    pub fn org_id(&self, flag: Option<String>) -> Result<String> {
        let org_id = flag
            .or_else(|| self.profile.org_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(MissingIdError::OrgId)?;
        validate_object_id(&org_id).context("invalid organization ID")?;
        Ok(org_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::Credentials, config::Service};

    fn context(project_id: Option<&str>) -> AtlasContext {
        let mut profile = Profile::new("default");
        profile.project_id = project_id.map(str::to_string);
        AtlasContext {
            profile,
            client: AtlasClient::new(
                "https://cloud.mongodb.com/",
                Service::Cloud,
                Credentials::None,
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_project_id_flag_takes_precedence() {
        let context = context(Some("5e2211c17a3e5a48f5497de3"));
        assert_eq!(
            context
                .project_id(Some("6e2211c17a3e5a48f5497de3".to_string()))
                .unwrap(),
            "6e2211c17a3e5a48f5497de3"
        );
        assert_eq!(context.project_id(None).unwrap(), "5e2211c17a3e5a48f5497de3");
    }

    #[test]
    fn test_missing_project_id() {
        let err = context(None).project_id(None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MissingIdError>(),
            Some(&MissingIdError::ProjectId)
        );
    }

    #[test]
    fn test_invalid_project_id() {
        assert!(context(Some("not-an-id")).project_id(None).is_err());
    }
}
