//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    AdminCredential, BlogPost, CreatePostRequest, PostStatus, Session, SiteConfig,
    UpdateConfigRequest, UpdatePostRequest,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== ADMIN OPERATIONS ====================

    /// Seed the admin credential if none exists. Returns true when a new
    /// credential was created.
    pub async fn seed_admin(
        &self,
        identifier: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT OR IGNORE INTO admins (id, identifier, password_hash, created_at) VALUES (1, ?, ?, ?)"
        )
        .bind(identifier)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the admin credential, if one exists.
    pub async fn get_admin(&self) -> Result<Option<AdminCredential>, AppError> {
        let row = sqlx::query("SELECT identifier, password_hash, created_at FROM admins WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(admin_from_row))
    }

    /// Look up the admin credential by identifier.
    pub async fn find_admin(&self, identifier: &str) -> Result<Option<AdminCredential>, AppError> {
        let row = sqlx::query(
            "SELECT identifier, password_hash, created_at FROM admins WHERE identifier = ?",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(admin_from_row))
    }

    // ==================== SESSION OPERATIONS ====================

    /// Create a new session with the given lifetime.
    pub async fn create_session(&self, ttl_secs: i64) -> Result<Session, AppError> {
        let now = Utc::now();
        // Whole-second timestamps keep the stored strings fixed-width, so the
        // purge query's string comparison matches chronological order.
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            expires_at: (now + chrono::Duration::seconds(ttl_secs))
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        };

        sqlx::query(
            "INSERT INTO sessions (token, admin_id, created_at, expires_at) VALUES (?, 1, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.created_at)
        .bind(&session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Look up a session that has not expired. Expiry is checked on the
    /// parsed timestamp, not the stored string.
    pub async fn find_valid_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query("SELECT token, created_at, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let session = row.map(|row| Session {
            token: row.get("token"),
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        });

        Ok(session.filter(|s| {
            DateTime::parse_from_rfc3339(&s.expires_at)
                .map(|expires| expires > Utc::now())
                .unwrap_or(false)
        }))
    }

    /// Delete a session. Returns true when a session was revoked.
    pub async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove expired sessions. Called lazily from the auth layer.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ==================== POST OPERATIONS ====================

    /// List all posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, content, seo_title, seo_description, status, created_at FROM posts ORDER BY created_at DESC, id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Option<BlogPost>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, content, seo_title, seo_description, status, created_at FROM posts WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// Create a new post.
    pub async fn create_post(&self, request: &CreatePostRequest) -> Result<BlogPost, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let status = request.status.unwrap_or_default();

        sqlx::query(
            "INSERT INTO posts (id, title, content, seo_title, seo_description, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.seo_title)
        .bind(&request.seo_description)
        .bind(status.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(BlogPost {
            id,
            title: request.title.clone(),
            content: request.content.clone(),
            seo_title: request.seo_title.clone(),
            seo_description: request.seo_description.clone(),
            status,
            created_at: now,
        })
    }

    /// Update a post. Supplied keys overwrite prior values; omitted keys are
    /// retained. Never creates a record for an unknown id.
    pub async fn update_post(
        &self,
        id: &str,
        request: &UpdatePostRequest,
    ) -> Result<BlogPost, AppError> {
        let existing = self
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

        let title = request.title.as_ref().unwrap_or(&existing.title);
        let content = request.content.as_ref().unwrap_or(&existing.content);
        let seo_title = request.seo_title.clone().or(existing.seo_title.clone());
        let seo_description = request
            .seo_description
            .clone()
            .or(existing.seo_description.clone());
        let status = request.status.unwrap_or(existing.status);

        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "Content must not be empty".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE posts SET title = ?, content = ?, seo_title = ?, seo_description = ?, status = ? WHERE id = ?"
        )
        .bind(title)
        .bind(content)
        .bind(&seo_title)
        .bind(&seo_description)
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(BlogPost {
            id: id.to_string(),
            title: title.clone(),
            content: content.clone(),
            seo_title,
            seo_description,
            status,
            created_at: existing.created_at,
        })
    }

    /// Delete a post. Deleting an unknown id fails, so a second delete of the
    /// same id yields NotFound rather than a silent success.
    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        Ok(())
    }

    // ==================== CONFIG OPERATIONS ====================

    /// Get the site configuration, falling back to the defaults when no record
    /// has been written yet.
    pub async fn get_config(&self) -> Result<SiteConfig, AppError> {
        let row = sqlx::query(CONFIG_SELECT).fetch_optional(&self.pool).await?;

        Ok(row
            .as_ref()
            .map(config_from_row)
            .unwrap_or_default())
    }

    /// Apply a partial update to the config singleton with a version-checked
    /// conditional write.
    ///
    /// `new_password_hash` is the already-verified rotation result; it is
    /// committed in the same transaction as the config write, so a lost
    /// version race never leaves a half-applied credential.
    pub async fn update_config(
        &self,
        request: &UpdateConfigRequest,
        new_password_hash: Option<&str>,
    ) -> Result<SiteConfig, AppError> {
        // Immediate transaction: the write lock is taken before the version
        // read, so a concurrent writer waits here instead of invalidating the
        // snapshot mid-transaction.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let existing = sqlx::query(CONFIG_SELECT)
            .fetch_optional(&mut *tx)
            .await?
            .as_ref()
            .map(config_from_row);

        let now = Utc::now().to_rfc3339();
        let base = existing.clone().unwrap_or_default();

        if let Some(expected) = request.expected_version {
            if base.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, base.version
                    ),
                    current_version: base.version,
                });
            }
        }

        // Merge supplied top-level keys; nested objects replace wholesale.
        let merged = SiteConfig {
            title: request.title.clone().unwrap_or(base.title),
            favicon: request.favicon.clone().unwrap_or(base.favicon),
            banner: request.banner.clone().unwrap_or(base.banner),
            seo: request.seo.clone().unwrap_or(base.seo),
            homepage_ad: request.homepage_ad.clone().unwrap_or(base.homepage_ad),
            admin_username: request
                .admin_username
                .clone()
                .unwrap_or(base.admin_username),
            updated_at: now,
            version: base.version + 1,
        };

        match existing {
            Some(prior) => {
                let result = sqlx::query(
                    r#"UPDATE site_config SET
                        title = ?, favicon = ?, banner_heading = ?, banner_subtext = ?,
                        seo_title = ?, seo_description = ?, homepage_ad_text = ?,
                        homepage_ad_image = ?, admin_username = ?, updated_at = ?, version = ?
                    WHERE id = 1 AND version = ?"#,
                )
                .bind(&merged.title)
                .bind(&merged.favicon)
                .bind(&merged.banner.heading)
                .bind(&merged.banner.subtext)
                .bind(&merged.seo.title)
                .bind(&merged.seo.description)
                .bind(&merged.homepage_ad.text)
                .bind(&merged.homepage_ad.image)
                .bind(&merged.admin_username)
                .bind(&merged.updated_at)
                .bind(merged.version)
                .bind(prior.version)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    // Lost the race between read and write
                    let current = sqlx::query(CONFIG_SELECT)
                        .fetch_optional(&self.pool)
                        .await?
                        .as_ref()
                        .map(config_from_row);
                    return Err(AppError::Conflict {
                        message: "Concurrent modification detected".to_string(),
                        current_version: current.map(|c| c.version).unwrap_or(0),
                    });
                }
            }
            None => {
                let result = sqlx::query(
                    r#"INSERT OR IGNORE INTO site_config (
                        id, title, favicon, banner_heading, banner_subtext,
                        seo_title, seo_description, homepage_ad_text, homepage_ad_image,
                        admin_username, updated_at, version
                    ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                )
                .bind(&merged.title)
                .bind(&merged.favicon)
                .bind(&merged.banner.heading)
                .bind(&merged.banner.subtext)
                .bind(&merged.seo.title)
                .bind(&merged.seo.description)
                .bind(&merged.homepage_ad.text)
                .bind(&merged.homepage_ad.image)
                .bind(&merged.admin_username)
                .bind(&merged.updated_at)
                .bind(merged.version)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    // A concurrent first write claimed the singleton row
                    return Err(AppError::Conflict {
                        message: "Concurrent modification detected".to_string(),
                        current_version: 0,
                    });
                }
            }
        }

        // Keep the canonical credential in step with the merged config: the
        // identifier always follows adminUsername, the hash only on rotation.
        if let Some(hash) = new_password_hash {
            let created = Utc::now().to_rfc3339();
            sqlx::query(
                r#"INSERT INTO admins (id, identifier, password_hash, created_at)
                   VALUES (1, ?, ?, ?)
                   ON CONFLICT(id) DO UPDATE SET
                       identifier = excluded.identifier,
                       password_hash = excluded.password_hash"#,
            )
            .bind(&merged.admin_username)
            .bind(hash)
            .bind(&created)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("UPDATE admins SET identifier = ? WHERE id = 1")
                .bind(&merged.admin_username)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(merged)
    }
}

const CONFIG_SELECT: &str = r#"SELECT title, favicon, banner_heading, banner_subtext,
       seo_title, seo_description, homepage_ad_text, homepage_ad_image,
       admin_username, updated_at, version
FROM site_config WHERE id = 1"#;

// Helper functions for row conversion

fn admin_from_row(row: &sqlx::sqlite::SqliteRow) -> AdminCredential {
    AdminCredential {
        identifier: row.get("identifier"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    let status: String = row.get("status");
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        seo_title: row.get("seo_title"),
        seo_description: row.get("seo_description"),
        status: PostStatus::from_str(&status).unwrap_or_default(),
        created_at: row.get("created_at"),
    }
}

fn config_from_row(row: &sqlx::sqlite::SqliteRow) -> SiteConfig {
    SiteConfig {
        title: row.get("title"),
        favicon: row.get("favicon"),
        banner: crate::models::Banner {
            heading: row.get("banner_heading"),
            subtext: row.get("banner_subtext"),
        },
        seo: crate::models::SeoMeta {
            title: row.get("seo_title"),
            description: row.get("seo_description"),
        },
        homepage_ad: crate::models::HomepageAd {
            text: row.get("homepage_ad_text"),
            image: row.get("homepage_ad_image"),
        },
        admin_username: row.get("admin_username"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}
