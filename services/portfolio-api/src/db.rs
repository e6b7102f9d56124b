// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SQLite storage for contact submissions, projects and skills.

use crate::{
    error::{AppError, Result},
    models::{
        encode_tech_stack, ContactFilter, ContactSubmission, NewContact, NewProject, NewSkill,
        Project, ProjectRow, Skill,
    },
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and make sure the tables exist.
    ///
    /// An in-memory URL (`sqlite::memory:`) gets a single pinned connection
    /// so every query sees the same database.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:");

        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        Self::init_schema(&pool).await?;
        info!(in_memory, "Database ready");

        Ok(Self { pool })
    }

    /// Initialize database schema
    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                is_spam BOOLEAN NOT NULL DEFAULT 0,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                source_addr TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                tech_stack TEXT NOT NULL DEFAULT '[]',
                repo_url TEXT,
                live_url TEXT,
                featured BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                proficiency INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a contact submission and return its id.
    pub async fn insert_contact(
        &self,
        contact: &NewContact,
        is_spam: bool,
        source_addr: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, subject, message, is_spam, is_read, created_at, source_addr)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.subject)
        .bind(&contact.message)
        .bind(is_spam)
        .bind(created_at)
        .bind(source_addr)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, is_spam, "Contact stored");
        Ok(id)
    }

    /// Get a contact submission by id.
    pub async fn get_contact(&self, id: i64) -> Result<Option<ContactSubmission>> {
        let contact = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT id, name, email, subject, message, is_spam, is_read, created_at, source_addr
            FROM contacts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// List contact submissions, newest first.
    pub async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<ContactSubmission>> {
        let contacts = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT id, name, email, subject, message, is_spam, is_read, created_at, source_addr
            FROM contacts
            WHERE (? = 0 OR is_read = 0)
              AND (? IS NULL OR is_spam = ?)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.unread_only)
        .bind(filter.spam)
        .bind(filter.spam)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    /// Set the read flag on a submission.
    pub async fn set_contact_read(&self, id: i64, is_read: bool) -> Result<ContactSubmission> {
        let result = sqlx::query("UPDATE contacts SET is_read = ? WHERE id = ?")
            .bind(is_read)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact {id}")));
        }

        self.get_contact(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact {id}")))
    }

    /// Store a project.
    pub async fn insert_project(&self, project: &NewProject) -> Result<Project> {
        let created_at = Utc::now();
        let tech_stack = encode_tech_stack(&project.tech_stack)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO projects (title, description, tech_stack, repo_url, live_url, featured, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project.title.trim())
        .bind(project.description.trim())
        .bind(&tech_stack)
        .bind(&project.repo_url)
        .bind(&project.live_url)
        .bind(project.featured)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, description, tech_stack, repo_url, live_url, featured, created_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Project::try_from(row).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// List projects, featured first, then newest first.
    pub async fn list_projects(&self, featured_only: bool) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, description, tech_stack, repo_url, live_url, featured, created_at
            FROM projects
            WHERE (? = 0 OR featured = 1)
            ORDER BY featured DESC, created_at DESC, id DESC
            "#,
        )
        .bind(featured_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Project::try_from(row).map_err(|e| AppError::Internal(e.to_string())))
            .collect()
    }

    /// Store a skill.
    pub async fn insert_skill(&self, skill: &NewSkill) -> Result<Skill> {
        let result = sqlx::query("INSERT INTO skills (name, category, proficiency) VALUES (?, ?, ?)")
            .bind(skill.name.trim())
            .bind(skill.category.trim())
            .bind(i64::from(skill.proficiency))
            .execute(&self.pool)
            .await?;

        Ok(Skill {
            id: result.last_insert_rowid(),
            name: skill.name.trim().to_string(),
            category: skill.category.trim().to_string(),
            proficiency: i64::from(skill.proficiency),
        })
    }

    /// List skills by category, strongest first within a category.
    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, category, proficiency
            FROM skills
            ORDER BY category ASC, proficiency DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(skills)
    }
}
