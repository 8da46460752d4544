use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Participant,
    Organiser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Participant => "participant",
            Role::Organiser => "organiser",
        }
    }

    /// Unknown values fall back to the participant role.
    pub fn parse(s: &str) -> Self {
        match s {
            "organiser" => Role::Organiser,
            _ => Role::Participant,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::parse(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
}

impl User {
    pub fn new(email: String, display_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            display_name,
            role: Role::Participant,
            photo_url: None,
            phone: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
