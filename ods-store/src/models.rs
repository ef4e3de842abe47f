//! Domain entities for the server directory
//!
//! Role maps are composite values: they live in a single JSONB column and
//! round-trip through [`Column::json`] on the way in and `#[sqlx(json)]` on
//! the way out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::{Column, EncodeError, TableEntity};

/// A game server registered in the directory, keyed by its numeric tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GameServer {
    /// Directory tag, the natural key
    pub tag: i32,
    /// Chat-platform role id mapped to the role's display name
    #[sqlx(json)]
    pub roles: HashMap<i64, String>,
    /// Invite link, if one has been published
    pub invite_url: Option<String>,
    /// Set by the store on first insert
    pub created_at: Option<DateTime<Utc>>,
}

impl TableEntity for GameServer {
    type Id = i32;

    fn id_column() -> &'static str {
        "tag"
    }

    fn id(&self) -> i32 {
        self.tag
    }

    fn columns(&self) -> Result<Vec<Column>, EncodeError> {
        Ok(vec![
            Column::new("tag", self.tag),
            Column::json("roles", &self.roles)?,
            Column::optional("invite_url", self.invite_url.clone()),
            Column::optional("created_at", self.created_at),
        ])
    }
}

/// A chat-platform user with per-server role memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Chat-platform user id
    pub id: i64,
    /// Server tag mapped to the roles this user holds there
    #[sqlx(json)]
    pub servers: HashMap<i32, Vec<String>>,
    /// Touched by the store on every write
    pub updated_at: Option<DateTime<Utc>>,
}

impl TableEntity for User {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Result<Vec<Column>, EncodeError> {
        Ok(vec![
            Column::new("id", self.id),
            Column::json("servers", &self.servers)?,
            Column::optional("updated_at", self.updated_at),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SqlValue;

    fn sample_server() -> GameServer {
        let mut roles = HashMap::new();
        roles.insert(1001_i64, "member".to_string());
        GameServer {
            tag: 7,
            roles,
            invite_url: None,
            created_at: None,
        }
    }

    #[test]
    fn test_server_identifier() {
        assert_eq!(GameServer::id_column(), "tag");
        assert_eq!(sample_server().id(), 7);
    }

    #[test]
    fn test_server_columns_in_declaration_order() {
        let columns = sample_server().columns().unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["tag", "roles", "invite_url", "created_at"]);
    }

    #[test]
    fn test_absent_optionals_are_marked_absent() {
        let columns = sample_server().columns().unwrap();
        assert!(columns[2].value.is_none());
        assert!(columns[3].value.is_none());
    }

    #[test]
    fn test_roles_serialize_to_json() {
        let columns = sample_server().columns().unwrap();
        match &columns[1].value {
            Some(SqlValue::Json(doc)) => assert_eq!(doc["1001"], "member"),
            other => panic!("expected Json roles, got {other:?}"),
        }
    }

    #[test]
    fn test_user_uses_default_id_column() {
        assert_eq!(User::id_column(), "id");
    }

    #[test]
    fn test_user_columns() {
        let mut servers = HashMap::new();
        servers.insert(7_i32, vec!["member".to_string(), "mod".to_string()]);
        let user = User {
            id: 42,
            servers,
            updated_at: Some(Utc::now()),
        };

        let columns = user.columns().unwrap();
        assert_eq!(columns[0].value, Some(SqlValue::Int(42)));
        assert!(matches!(columns[1].value, Some(SqlValue::Json(_))));
        assert!(matches!(columns[2].value, Some(SqlValue::Timestamp(_))));
    }
}
