// file: src/database/users.rs
use crate::models::User;
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, profile_image_url, updated_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn upsert(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, profile_image_url, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            profile_image_url = excluded.profile_image_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.profile_image_url)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_database;

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let db = create_test_database().await;
        let user = User::new(
            "u1".to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            None,
        );
        upsert(&db.pool, &user).await.unwrap();

        let stored = get_by_id(&db.pool, "u1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
        assert!(stored.profile_image_url.is_none());

        let renamed = User {
            name: "Ada L.".to_string(),
            profile_image_url: Some("file:///profiles/u1/a.jpg".to_string()),
            ..user
        };
        upsert(&db.pool, &renamed).await.unwrap();

        let stored = get_by_id(&db.pool, "u1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada L.");
        assert_eq!(stored.profile_image_url.as_deref(), Some("file:///profiles/u1/a.jpg"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
