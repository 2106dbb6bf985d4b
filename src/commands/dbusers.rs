use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    args::dbusers as args,
    client::{ListOptions, Paginated},
    commands::{
        CommandWithOutput,
        delete::{DeleteInteraction, DeleteResult, ResourceKind, confirm_deletion, delete_question},
        with_atlas::{AtlasContext, TryFromWithAtlasClient},
    },
    dependencies::{
        DatabaseUserCreator, DatabaseUserDeleter, DatabaseUserDescriber, DatabaseUserLister,
        DatabaseUserUpdater,
    },
    interaction::{InputPromptResult, Interaction, PasswordPrompt},
    models::{ADMIN_DB, DatabaseRole, DatabaseUser, EXTERNAL_AUTH_DB, UserScope},
    template::Templated,
};

const LIST_TEMPLATE: &str = "USERNAME\tDATABASE{{range .results}}\n{{.username}}\t{{.databaseName}}{{end}}\n";
const DESCRIBE_TEMPLATE: &str = "USERNAME\tDATABASE\n{{.username}}\t{{.databaseName}}\n";
const CREATE_TEMPLATE: &str = "Database user '{{.username}}' successfully created.\n";
const UPDATE_TEMPLATE: &str = "Successfully updated database user '{{.username}}'.\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbUserError {
    #[error("at least one --role is required")]
    MissingRole,
    #[error("password prompt canceled")]
    PasswordCanceled,
}

/// Authentication database implied by the external auth flags.
fn auth_db_for(user: &DatabaseUser) -> &'static str {
    let external = |value: &Option<String>| value.as_deref().is_some_and(|v| v != "NONE");
    if external(&user.x509_type)
        || external(&user.aws_iam_type)
        || external(&user.ldap_auth_type)
        || external(&user.oidc_auth_type)
    {
        EXTERNAL_AUTH_DB
    } else {
        ADMIN_DB
    }
}

fn parse_roles(roles: &[String]) -> Option<Vec<DatabaseRole>> {
    (!roles.is_empty()).then(|| roles.iter().map(|r| DatabaseRole::parse(r)).collect())
}

fn parse_scopes(scopes: &[String]) -> Option<Vec<UserScope>> {
    (!scopes.is_empty()).then(|| scopes.iter().map(|s| UserScope::parse(s)).collect())
}

pub struct List {
    store: Box<dyn DatabaseUserLister + Send + Sync>,
    project_id: String,
    options: ListOptions,
}

impl TryFromWithAtlasClient<args::List> for List {
    fn try_from_with_atlas(args: args::List, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            options: ListOptions::from(&args.list),
        })
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = Templated<Paginated<DatabaseUser>>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let page = self
            .store
            .list_database_users(&self.project_id, &self.options)
            .await
            .context("listing database users")?;

        Ok(Templated::new(LIST_TEMPLATE, page))
    }
}

pub struct Describe {
    store: Box<dyn DatabaseUserDescriber + Send + Sync>,
    project_id: String,
    auth_db: String,
    username: String,
}

impl TryFromWithAtlasClient<args::Describe> for Describe {
    fn try_from_with_atlas(args: args::Describe, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            auth_db: args.auth_db,
            username: args.username,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = Templated<DatabaseUser>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let user = self
            .store
            .describe_database_user(&self.project_id, &self.auth_db, &self.username)
            .await
            .with_context(|| format!("describing database user '{}'", self.username))?;

        Ok(Templated::new(DESCRIBE_TEMPLATE, user))
    }
}

pub struct Create {
    store: Box<dyn DatabaseUserCreator + Send + Sync>,
    interaction: Box<dyn PasswordPrompt + Send + Sync>,
    project_id: String,
    user: DatabaseUser,
}

impl TryFromWithAtlasClient<args::Create> for Create {
    fn try_from_with_atlas(args: args::Create, context: &AtlasContext) -> Result<Self> {
        let roles = parse_roles(&args.roles).ok_or(DbUserError::MissingRole)?;
        let project_id = context.project_id(args.project.project_id)?;

        let mut user = DatabaseUser {
            username: args.username,
            group_id: Some(project_id.clone()),
            password: args.password,
            roles: Some(roles),
            scopes: parse_scopes(&args.scopes),
            delete_after_date: args.delete_after,
            x509_type: args.x509_type,
            aws_iam_type: args.aws_iam_type,
            ldap_auth_type: args.ldap_type,
            oidc_auth_type: args.oidc_type,
            ..Default::default()
        };
        user.database_name = auth_db_for(&user).to_string();

        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id,
            user,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Create {
    type Output = Templated<DatabaseUser>;

    async fn execute(&mut self) -> Result<Self::Output> {
        // Only SCRAM users authenticate with a password.
        if self.user.database_name == ADMIN_DB && self.user.password.is_none() {
            match self.interaction.password("Password:")? {
                InputPromptResult::Input(password) => self.user.password = Some(password),
                InputPromptResult::Canceled => return Err(DbUserError::PasswordCanceled.into()),
            }
        }

        info!(username = %self.user.username, auth_db = %self.user.database_name, "creating database user");
        let user = self
            .store
            .create_database_user(&self.project_id, &self.user)
            .await
            .with_context(|| format!("creating database user '{}'", self.user.username))?;

        Ok(Templated::new(CREATE_TEMPLATE, user))
    }
}

pub trait UpdateDatabaseUserStore: DatabaseUserDescriber + DatabaseUserUpdater + Send + Sync {}
impl<T: DatabaseUserDescriber + DatabaseUserUpdater + Send + Sync> UpdateDatabaseUserStore for T {}

/// Changes `dbusers update` applies on top of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseUserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub roles: Vec<String>,
    pub scopes: Vec<String>,
    pub x509_type: Option<String>,
}

impl DatabaseUserPatch {
    pub fn apply(&self, user: &mut DatabaseUser) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        // The API never returns passwords; only send one when it changes.
        user.password = self.password.clone();
        if let Some(roles) = parse_roles(&self.roles) {
            user.roles = Some(roles);
        }
        if let Some(scopes) = parse_scopes(&self.scopes) {
            user.scopes = Some(scopes);
        }
        if let Some(x509_type) = &self.x509_type {
            user.x509_type = Some(x509_type.clone());
            user.database_name = auth_db_for(user).to_string();
        }
    }
}

pub struct Update {
    store: Box<dyn UpdateDatabaseUserStore>,
    project_id: String,
    current_username: String,
    auth_db: String,
    patch: DatabaseUserPatch,
}

impl TryFromWithAtlasClient<args::Update> for Update {
    fn try_from_with_atlas(args: args::Update, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            project_id: context.project_id(args.project.project_id)?,
            current_username: args.current_username,
            auth_db: args.auth_db.unwrap_or_else(|| ADMIN_DB.to_string()),
            patch: DatabaseUserPatch {
                username: args.username,
                password: args.password,
                roles: args.roles,
                scopes: args.scopes,
                x509_type: args.x509_type,
            },
        })
    }
}

#[async_trait]
impl CommandWithOutput for Update {
    type Output = Templated<DatabaseUser>;

    async fn execute(&mut self) -> Result<Self::Output> {
        let mut user = self
            .store
            .describe_database_user(&self.project_id, &self.auth_db, &self.current_username)
            .await
            .with_context(|| format!("describing database user '{}'", self.current_username))?;

        self.patch.apply(&mut user);
        debug!(username = %user.username, "updating database user");

        let updated = self
            .store
            .update_database_user(&self.project_id, &self.auth_db, &self.current_username, &user)
            .await
            .with_context(|| format!("updating database user '{}'", self.current_username))?;

        Ok(Templated::new(UPDATE_TEMPLATE, updated))
    }
}

pub struct Delete {
    store: Box<dyn DatabaseUserDeleter + Send + Sync>,
    interaction: Box<dyn DeleteInteraction>,
    project_id: String,
    auth_db: String,
    username: String,
    force: bool,
}

impl TryFromWithAtlasClient<args::Delete> for Delete {
    fn try_from_with_atlas(args: args::Delete, context: &AtlasContext) -> Result<Self> {
        Ok(Self {
            store: Box::new(context.client.clone()),
            interaction: Box::new(Interaction::new()),
            project_id: context.project_id(args.project.project_id)?,
            auth_db: args.auth_db,
            username: args.username,
            force: args.force,
        })
    }
}

#[async_trait]
impl CommandWithOutput for Delete {
    type Output = DeleteResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let confirmed = confirm_deletion(
            self.interaction.as_ref(),
            self.force,
            delete_question(&self.username),
            None,
        )?;
        if !confirmed {
            return Ok(DeleteResult::Canceled {
                resource: ResourceKind::DatabaseUser,
                name: self.username.clone(),
            });
        }

        self.store
            .delete_database_user(&self.project_id, &self.auth_db, &self.username)
            .await
            .with_context(|| format!("deleting database user '{}'", self.username))?;

        Ok(DeleteResult::Deleted {
            resource: ResourceKind::DatabaseUser,
            name: self.username.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dependencies::mocks::MockAtlas, interaction::mocks::MockInteraction};

    const PROJECT_ID: &str = "5e2211c17a3e5a48f5497de3";

    fn user(username: &str) -> DatabaseUser {
        DatabaseUser {
            username: username.to_string(),
            database_name: ADMIN_DB.to_string(),
            roles: parse_roles(&["readWrite@sales".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_external_auth_db() {
        let mut user = user("CN=app");
        assert_eq!(auth_db_for(&user), ADMIN_DB);

        user.x509_type = Some("NONE".to_string());
        assert_eq!(auth_db_for(&user), ADMIN_DB);

        user.x509_type = Some("MANAGED".to_string());
        assert_eq!(auth_db_for(&user), EXTERNAL_AUTH_DB);
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut store = MockAtlas::new();
        store
            .expect_list_database_users()
            .return_once(|_, _| Ok(Paginated::new(vec![user("app")])));

        let output = List {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            options: ListOptions::default(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "USERNAME    DATABASE\napp         admin\n");
    }

    #[tokio::test]
    async fn test_describe_user() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_database_user()
            .withf(|_, auth_db, username| auth_db == "$external" && username == "CN=app")
            .return_once(|_, _, username| Ok(user(username)));

        let output = Describe {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            auth_db: EXTERNAL_AUTH_DB.to_string(),
            username: "CN=app".to_string(),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(serde_json::to_value(&output).unwrap()["roles"][0]["roleName"], "readWrite");
    }

    #[tokio::test]
    async fn test_create_prompts_for_password() {
        let mut store = MockAtlas::new();
        store
            .expect_create_database_user()
            .withf(|project, user| {
                project == PROJECT_ID && user.password.as_deref() == Some("s3cr3t")
            })
            .return_once(|_, user| {
                Ok(DatabaseUser {
                    password: None,
                    ..user.clone()
                })
            });
        let mut interaction = MockInteraction::new();
        interaction
            .expect_password()
            .return_once(|_| Ok(InputPromptResult::Input("s3cr3t".to_string())));

        let output = Create {
            store: Box::new(store),
            interaction: Box::new(interaction),
            project_id: PROJECT_ID.to_string(),
            user: user("app"),
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Database user 'app' successfully created.\n");
    }

    #[tokio::test]
    async fn test_create_external_user_skips_password() {
        let mut store = MockAtlas::new();
        store
            .expect_create_database_user()
            .withf(|_, user| user.password.is_none() && user.database_name == EXTERNAL_AUTH_DB)
            .return_once(|_, user| Ok(user.clone()));
        let mut interaction = MockInteraction::new();
        interaction.expect_password().never();

        let mut external = user("arn:aws:iam::123456789012:role/app");
        external.aws_iam_type = Some("ROLE".to_string());
        external.database_name = auth_db_for(&external).to_string();

        Create {
            store: Box::new(store),
            interaction: Box::new(interaction),
            project_id: PROJECT_ID.to_string(),
            user: external,
        }
        .execute()
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_canceled_password() {
        let mut store = MockAtlas::new();
        store.expect_create_database_user().never();
        let mut interaction = MockInteraction::new();
        interaction
            .expect_password()
            .return_once(|_| Ok(InputPromptResult::Canceled));

        let err = Create {
            store: Box::new(store),
            interaction: Box::new(interaction),
            project_id: PROJECT_ID.to_string(),
            user: user("app"),
        }
        .execute()
        .await
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<DbUserError>(),
            Some(&DbUserError::PasswordCanceled)
        );
    }

    #[tokio::test]
    async fn test_update_patches_current_user() {
        let mut store = MockAtlas::new();
        store
            .expect_describe_database_user()
            .withf(|_, auth_db, username| auth_db == "admin" && username == "app")
            .return_once(|_, _, username| {
                Ok(DatabaseUser {
                    scopes: parse_scopes(&["Cluster0".to_string()]),
                    ..user(username)
                })
            });
        store
            .expect_update_database_user()
            .withf(|_, _, username, user| {
                username == "app"
                    && user.username == "app2"
                    && user.roles == parse_roles(&["read@reporting".to_string()])
                    && user.scopes == parse_scopes(&["Cluster0".to_string()])
                    && user.password.is_none()
            })
            .return_once(|_, _, _, user| Ok(user.clone()));

        let output = Update {
            store: Box::new(store),
            project_id: PROJECT_ID.to_string(),
            current_username: "app".to_string(),
            auth_db: ADMIN_DB.to_string(),
            patch: DatabaseUserPatch {
                username: Some("app2".to_string()),
                roles: vec!["read@reporting".to_string()],
                ..Default::default()
            },
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Successfully updated database user 'app2'.\n");
    }

    #[tokio::test]
    async fn test_delete_with_force() {
        let mut store = MockAtlas::new();
        store
            .expect_delete_database_user()
            .withf(|_, auth_db, username| auth_db == "admin" && username == "app")
            .return_once(|_, _, _| Ok(()));

        let output = Delete {
            store: Box::new(store),
            interaction: Box::new(MockInteraction::new()),
            project_id: PROJECT_ID.to_string(),
            auth_db: ADMIN_DB.to_string(),
            username: "app".to_string(),
            force: true,
        }
        .execute()
        .await
        .unwrap();

        assert_eq!(output.to_string(), "Database user 'app' deleted");
    }
}
