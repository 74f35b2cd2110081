// src/core/database.rs
//! Persistence for scraped raw data and analyzed profiles, keyed by profile identifier

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::linkedin_analysis::types::{Post, ProfileData};

// ===== Core Database Connection Management =====

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite file and run migrations
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database; a single connection keeps it alive.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS raw_data (
                id BLOB PRIMARY KEY NOT NULL,
                profile_id TEXT NOT NULL UNIQUE,
                linkedin_url TEXT,
                name TEXT,
                headline TEXT,
                location TEXT,
                about TEXT,
                experience TEXT,
                education TEXT,
                skills TEXT,
                connections_count TEXT,
                followers_count TEXT,
                current_company TEXT,
                highlights TEXT,
                services TEXT,
                licenses_and_certifications TEXT,
                activity TEXT,
                posts TEXT NOT NULL DEFAULT '[]',
                raw_json TEXT NOT NULL DEFAULT '{}',
                user_id BLOB,
                revision INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create raw_data table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analyzed_profiles (
                id BLOB PRIMARY KEY NOT NULL,
                profile_id TEXT NOT NULL UNIQUE,
                raw_data_id BLOB REFERENCES raw_data(id) ON DELETE SET NULL,
                user_id BLOB,
                name TEXT NOT NULL,
                headline TEXT,
                linkedin_profile TEXT,
                confidence INTEGER CHECK (confidence IS NULL OR confidence BETWEEN 0 AND 100),
                dominance INTEGER CHECK (dominance IS NULL OR dominance BETWEEN 0 AND 100),
                influence INTEGER CHECK (influence IS NULL OR influence BETWEEN 0 AND 100),
                steadiness INTEGER CHECK (steadiness IS NULL OR steadiness BETWEEN 0 AND 100),
                compliance INTEGER CHECK (compliance IS NULL OR compliance BETWEEN 0 AND 100),
                disc_primary TEXT,
                description TEXT,
                key_insights TEXT NOT NULL DEFAULT '[]',
                pain_points TEXT NOT NULL DEFAULT '[]',
                communication_style TEXT,
                sales_approach TEXT,
                best_approach TEXT,
                ideal_pitch TEXT,
                communication_dos TEXT NOT NULL DEFAULT '[]',
                communication_donts TEXT NOT NULL DEFAULT '[]',
                raw_data TEXT NOT NULL DEFAULT '{}',
                revision INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create analyzed_profiles table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_analyzed_profiles_created_at ON analyzed_profiles(created_at);",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_analyzed_profiles_disc_primary ON analyzed_profiles(disc_primary);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Models =====

/// Scraped, unanalyzed profile content as captured by the browser extension.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawData {
    pub id: Uuid,
    pub profile_id: String,
    pub linkedin_url: Option<String>,
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    pub connections_count: Option<String>,
    pub followers_count: Option<String>,
    pub current_company: Option<String>,
    pub highlights: Option<String>,
    pub services: Option<String>,
    pub licenses_and_certifications: Option<String>,
    pub activity: Option<String>,
    pub posts: Json<Vec<Post>>,
    pub raw_json: Json<Value>,
    pub user_id: Option<Uuid>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Model-derived DISC personality and sales strategy for one profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalyzedProfile {
    pub id: Uuid,
    pub profile_id: String,
    pub raw_data_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub headline: Option<String>,
    pub linkedin_profile: Option<String>,
    pub confidence: Option<i64>,
    pub dominance: Option<i64>,
    pub influence: Option<i64>,
    pub steadiness: Option<i64>,
    pub compliance: Option<i64>,
    pub disc_primary: Option<String>,
    pub description: Option<String>,
    pub key_insights: Json<Vec<String>>,
    pub pain_points: Json<Vec<String>>,
    pub communication_style: Option<String>,
    pub sales_approach: Option<String>,
    pub best_approach: Option<String>,
    pub ideal_pitch: Option<String>,
    pub communication_dos: Json<Vec<String>>,
    pub communication_donts: Json<Vec<String>>,
    pub raw_data: Json<Value>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Write inputs =====

#[derive(Debug, Clone)]
pub struct RawDataInput {
    pub profile_id: String,
    pub linkedin_url: Option<String>,
    pub profile: ProfileData,
    pub raw_json: Value,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFields {
    pub name: String,
    pub headline: Option<String>,
    pub confidence: Option<i64>,
    pub dominance: Option<i64>,
    pub influence: Option<i64>,
    pub steadiness: Option<i64>,
    pub compliance: Option<i64>,
    pub disc_primary: Option<String>,
    pub description: Option<String>,
    pub key_insights: Vec<String>,
    pub pain_points: Vec<String>,
    pub communication_style: Option<String>,
    pub sales_approach: Option<String>,
    pub best_approach: Option<String>,
    pub ideal_pitch: Option<String>,
    pub communication_dos: Vec<String>,
    pub communication_donts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyzedProfileInput {
    pub profile_id: String,
    pub linkedin_profile: Option<String>,
    pub user_id: Option<Uuid>,
    pub fields: AnalysisFields,
    /// Full request body kept as a backup.
    pub raw_backup: Value,
}

#[derive(Debug, Clone)]
pub struct ProfileSave {
    pub analysis: AnalyzedProfileInput,
    pub raw_data: Option<RawDataInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Created,
    Updated,
}

impl SaveAction {
    fn from_revision(revision: i64) -> Self {
        if revision <= 1 {
            SaveAction::Created
        } else {
            SaveAction::Updated
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub action: SaveAction,
    pub profile: AnalyzedProfile,
    pub raw_data: Option<RawData>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    /// Case-insensitive substring over name, headline and profile URL.
    pub search: Option<String>,
    pub disc_primary: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

// ===== Raw Data Repository =====

const RAW_DATA_COLUMNS: &str = "id, profile_id, linkedin_url, name, headline, location, about, \
    experience, education, skills, connections_count, followers_count, current_company, \
    highlights, services, licenses_and_certifications, activity, posts, raw_json, user_id, \
    revision, created_at, updated_at";

pub struct RawDataRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RawDataRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_profile_id(&self, profile_id: &str) -> Result<Option<RawData>> {
        let sql = format!("SELECT {} FROM raw_data WHERE profile_id = ?", RAW_DATA_COLUMNS);
        let raw = sqlx::query_as::<_, RawData>(&sql)
            .bind(profile_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(raw)
    }

    pub async fn upsert(&self, input: &RawDataInput) -> Result<RawData> {
        Self::upsert_with(self.pool, input).await
    }

    /// Insert or refresh the row for `input.profile_id` in one statement.
    pub async fn upsert_with<'e, E>(executor: E, input: &RawDataInput) -> Result<RawData>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let profile = &input.profile;

        let sql = format!(
            r#"
            INSERT INTO raw_data (
                id, profile_id, linkedin_url, name, headline, location, about, experience,
                education, skills, connections_count, followers_count, current_company,
                highlights, services, licenses_and_certifications, activity, posts, raw_json,
                user_id, revision, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT(profile_id) DO UPDATE SET
                linkedin_url = excluded.linkedin_url,
                name = excluded.name,
                headline = excluded.headline,
                location = excluded.location,
                about = excluded.about,
                experience = excluded.experience,
                education = excluded.education,
                skills = excluded.skills,
                connections_count = excluded.connections_count,
                followers_count = excluded.followers_count,
                current_company = excluded.current_company,
                highlights = excluded.highlights,
                services = excluded.services,
                licenses_and_certifications = excluded.licenses_and_certifications,
                activity = excluded.activity,
                posts = excluded.posts,
                raw_json = excluded.raw_json,
                user_id = COALESCE(excluded.user_id, raw_data.user_id),
                revision = raw_data.revision + 1,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            RAW_DATA_COLUMNS
        );

        let raw = sqlx::query_as::<_, RawData>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.profile_id)
            .bind(&input.linkedin_url)
            .bind(&profile.name)
            .bind(&profile.headline)
            .bind(&profile.location)
            .bind(&profile.about)
            .bind(&profile.experience)
            .bind(&profile.education)
            .bind(&profile.skills)
            .bind(&profile.connections_count)
            .bind(&profile.followers_count)
            .bind(&profile.current_company)
            .bind(&profile.highlights)
            .bind(&profile.services)
            .bind(&profile.licenses_and_certifications)
            .bind(&profile.activity)
            .bind(Json(&profile.posts))
            .bind(Json(&input.raw_json))
            .bind(input.user_id)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
            .with_context(|| format!("Failed to save raw data for {}", input.profile_id))?;

        Ok(raw)
    }
}

// ===== Analyzed Profile Repository =====

/// Search terms match literally: `%`, `_` and the escape char itself.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const ANALYZED_PROFILE_COLUMNS: &str = "id, profile_id, raw_data_id, user_id, name, headline, \
    linkedin_profile, confidence, dominance, influence, steadiness, compliance, disc_primary, \
    description, key_insights, pain_points, communication_style, sales_approach, best_approach, \
    ideal_pitch, communication_dos, communication_donts, raw_data, revision, created_at, updated_at";

pub struct AnalyzedProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnalyzedProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_profile_id(&self, profile_id: &str) -> Result<Option<AnalyzedProfile>> {
        let sql = format!(
            "SELECT {} FROM analyzed_profiles WHERE profile_id = ?",
            ANALYZED_PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, AnalyzedProfile>(&sql)
            .bind(profile_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(profile)
    }

    /// Newest first, optionally filtered.
    pub async fn list(&self, filter: &ProfileFilter) -> Result<Vec<AnalyzedProfile>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM analyzed_profiles WHERE 1 = 1",
            ANALYZED_PROFILE_COLUMNS
        ));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.trim().to_lowercase()));
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(COALESCE(headline, '')) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(COALESCE(linkedin_profile, '')) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(disc) = filter.disc_primary.as_deref().filter(|s| !s.trim().is_empty()) {
            builder.push(" AND disc_primary = ").push_bind(disc.trim().to_string());
        }

        builder
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let profiles = builder
            .build_query_as::<AnalyzedProfile>()
            .fetch_all(self.pool)
            .await?;

        Ok(profiles)
    }

    pub async fn upsert(
        &self,
        input: &AnalyzedProfileInput,
        raw_data_id: Option<Uuid>,
    ) -> Result<AnalyzedProfile> {
        Self::upsert_with(self.pool, input, raw_data_id).await
    }

    /// Insert or update the row for `input.profile_id` in one statement.
    /// An existing raw data link survives an update that carries none.
    pub async fn upsert_with<'e, E>(
        executor: E,
        input: &AnalyzedProfileInput,
        raw_data_id: Option<Uuid>,
    ) -> Result<AnalyzedProfile>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let fields = &input.fields;

        let sql = format!(
            r#"
            INSERT INTO analyzed_profiles (
                id, profile_id, raw_data_id, user_id, name, headline, linkedin_profile,
                confidence, dominance, influence, steadiness, compliance, disc_primary,
                description, key_insights, pain_points, communication_style, sales_approach,
                best_approach, ideal_pitch, communication_dos, communication_donts, raw_data,
                revision, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT(profile_id) DO UPDATE SET
                raw_data_id = COALESCE(excluded.raw_data_id, analyzed_profiles.raw_data_id),
                user_id = COALESCE(excluded.user_id, analyzed_profiles.user_id),
                name = excluded.name,
                headline = excluded.headline,
                linkedin_profile = excluded.linkedin_profile,
                confidence = excluded.confidence,
                dominance = excluded.dominance,
                influence = excluded.influence,
                steadiness = excluded.steadiness,
                compliance = excluded.compliance,
                disc_primary = excluded.disc_primary,
                description = excluded.description,
                key_insights = excluded.key_insights,
                pain_points = excluded.pain_points,
                communication_style = excluded.communication_style,
                sales_approach = excluded.sales_approach,
                best_approach = excluded.best_approach,
                ideal_pitch = excluded.ideal_pitch,
                communication_dos = excluded.communication_dos,
                communication_donts = excluded.communication_donts,
                raw_data = excluded.raw_data,
                revision = analyzed_profiles.revision + 1,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            ANALYZED_PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, AnalyzedProfile>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.profile_id)
            .bind(raw_data_id)
            .bind(input.user_id)
            .bind(&fields.name)
            .bind(&fields.headline)
            .bind(&input.linkedin_profile)
            .bind(fields.confidence)
            .bind(fields.dominance)
            .bind(fields.influence)
            .bind(fields.steadiness)
            .bind(fields.compliance)
            .bind(&fields.disc_primary)
            .bind(&fields.description)
            .bind(Json(&fields.key_insights))
            .bind(Json(&fields.pain_points))
            .bind(&fields.communication_style)
            .bind(&fields.sales_approach)
            .bind(&fields.best_approach)
            .bind(&fields.ideal_pitch)
            .bind(Json(&fields.communication_dos))
            .bind(Json(&fields.communication_donts))
            .bind(Json(&input.raw_backup))
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
            .with_context(|| format!("Failed to save analyzed profile for {}", input.profile_id))?;

        Ok(profile)
    }
}

// ===== Profile Service =====

pub struct ProfileService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert raw data (when present) and the analyzed profile in one transaction.
    pub async fn save(&self, save: ProfileSave) -> Result<SaveOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let raw_data = match &save.raw_data {
            Some(input) => Some(RawDataRepository::upsert_with(&mut *tx, input).await?),
            None => None,
        };

        let profile = AnalyzedProfileRepository::upsert_with(
            &mut *tx,
            &save.analysis,
            raw_data.as_ref().map(|raw| raw.id),
        )
        .await?;

        tx.commit().await.context("Failed to commit profile save")?;

        let action = SaveAction::from_revision(profile.revision);
        info!(
            "Analyzed profile {} {} (revision {})",
            profile.profile_id,
            match action {
                SaveAction::Created => "created",
                SaveAction::Updated => "updated",
            },
            profile.revision
        );

        Ok(SaveOutcome {
            action,
            profile,
            raw_data,
        })
    }

    pub async fn raw_data(&self, profile_id: &str) -> Result<Option<RawData>> {
        RawDataRepository::new(self.pool)
            .find_by_profile_id(profile_id)
            .await
    }

    pub async fn analyzed_profile(&self, profile_id: &str) -> Result<Option<AnalyzedProfile>> {
        AnalyzedProfileRepository::new(self.pool)
            .find_by_profile_id(profile_id)
            .await
    }

    pub async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<AnalyzedProfile>> {
        AnalyzedProfileRepository::new(self.pool).list(filter).await
    }
}
