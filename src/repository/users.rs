use crate::database::Database;
use crate::error::AppResult;
use crate::models::User;

/// Profiles cached on this device. The local table is the only source.
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.db.get_user(id).await?)
    }

    pub async fn upsert_user(&self, user: &User) -> AppResult<()> {
        Ok(self.db.upsert_user(user).await?)
    }
}
