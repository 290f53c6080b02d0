use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HabitDefinition {
    pub id: Uuid,
    pub name: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl HabitDefinition {
    pub fn new(name: String, user: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            user,
            created_at: Utc::now(),
        }
    }

    /// First eight characters of the id, as shown in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
