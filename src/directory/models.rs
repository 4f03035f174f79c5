use serde::{Deserialize, Serialize};

/// Project as seen by the core: identity and display name only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id: owner_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
