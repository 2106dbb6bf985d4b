use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ADMIN_DB: &str = "admin";
pub const EXTERNAL_AUTH_DB: &str = "$external";

const DEFAULT_SCOPE_TYPE: &str = "CLUSTER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<DatabaseRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<UserScope>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_after_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x509_type: Option<String>,
    #[serde(default, rename = "awsIAMType", skip_serializing_if = "Option::is_none")]
    pub aws_iam_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldap_auth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_auth_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRole {
    pub role_name: String,
    pub database_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

impl DatabaseRole {
    /// Parse `role@db[.collection]`. Without a database the role applies to `admin`.
    pub fn parse(value: &str) -> Self {
        let (role_name, target) = match value.split_once('@') {
            Some((role, target)) => (role, target),
            None => (value, ADMIN_DB),
        };
        let (database_name, collection_name) = match target.split_once('.') {
            Some((db, collection)) if !collection.is_empty() => (db, Some(collection.to_string())),
            Some((db, _)) => (db, None),
            None => (target, None),
        };

        Self {
            role_name: role_name.to_string(),
            database_name: database_name.to_string(),
            collection_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScope {
    pub name: String,
    #[serde(rename = "type")]
    pub scope_type: String,
}

impl UserScope {
    /// Parse `name[:TYPE]`, where the type defaults to `CLUSTER`.
    pub fn parse(value: &str) -> Self {
        let (name, scope_type) = match value.split_once(':') {
            Some((name, scope_type)) if !scope_type.is_empty() => {
                (name, scope_type.to_ascii_uppercase())
            }
            Some((name, _)) => (name, DEFAULT_SCOPE_TYPE.to_string()),
            None => (value, DEFAULT_SCOPE_TYPE.to_string()),
        };

        Self {
            name: name.to_string(),
            scope_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(
            DatabaseRole::parse("readWrite@sales.orders"),
            DatabaseRole {
                role_name: "readWrite".to_string(),
                database_name: "sales".to_string(),
                collection_name: Some("orders".to_string()),
            }
        );
        assert_eq!(
            DatabaseRole::parse("read@sales"),
            DatabaseRole {
                role_name: "read".to_string(),
                database_name: "sales".to_string(),
                collection_name: None,
            }
        );
        assert_eq!(DatabaseRole::parse("atlasAdmin").database_name, "admin");
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(
            UserScope::parse("Cluster0"),
            UserScope {
                name: "Cluster0".to_string(),
                scope_type: "CLUSTER".to_string()
            }
        );
        assert_eq!(UserScope::parse("lake:data_lake").scope_type, "DATA_LAKE");
    }

    #[test]
    fn test_password_not_serialized_when_absent() {
        let user = DatabaseUser {
            username: "app".to_string(),
            database_name: ADMIN_DB.to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["databaseName"], "admin");
    }
}
