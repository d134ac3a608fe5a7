use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

use super::patch_nullable;

/// Profile of the dashboard operator; a single row seeded by migration
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip)]
    #[ts(skip)]
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub office: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub office: Option<Option<String>>,
}

impl UserProfile {
    pub async fn get(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = 1")
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        data: &UpdateUserProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::get(pool).await? else {
            return Ok(None);
        };
        sqlx::query_as::<_, UserProfile>(
            r#"UPDATE user_profiles
               SET full_name = $1, email = $2, role = $3, office = $4, updated_at = $5
               WHERE id = 1
               RETURNING *"#,
        )
        .bind(data.full_name.as_ref().unwrap_or(&existing.full_name))
        .bind(data.email.as_ref().unwrap_or(&existing.email))
        .bind(data.role.as_ref().unwrap_or(&existing.role))
        .bind(patch_nullable(&data.office, &existing.office))
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn seeded_profile_is_updatable() {
        let db = DBService::new_in_memory().await.unwrap();
        let profile = UserProfile::get(&db.pool).await.unwrap().unwrap();
        assert_eq!(profile.role, "administrator");

        let updated = UserProfile::update(
            &db.pool,
            &UpdateUserProfile {
                office: Some(Some("DSWD Field Office XI".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.office.as_deref(), Some("DSWD Field Office XI"));
        assert_eq!(updated.full_name, "SLP Administrator");
    }
}
