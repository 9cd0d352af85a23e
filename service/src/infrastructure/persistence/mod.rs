use canal_common::database::Database;
use canal_common::{
    ID_FIELD_NAME, PUBLISH_AT_FIELD_NAME, PublicationStatus, STATUS_FIELD_NAME, Slug, Title,
    UPDATED_FIELD_NAME,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;

use crate::domain::content::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, Episode, EpisodeId, EpisodeUpdate,
    NewArticle, NewEpisode, NewProgram, Program, ProgramId,
};
use crate::domain::repository::{ContentRepository, RepositoryError};
use crate::domain::sweep::Transitioned;

const ARTICLE_COLUMNS: &str = r#""id", "title", "slug", "summary", "body", "image_url", "featured", "status", "publish_at", "created_at", "updated_at""#;
const PROGRAM_COLUMNS: &str = r#""id", "title", "slug", "description", "created_at", "updated_at""#;
const EPISODE_COLUMNS: &str = r#""id", "program_id", "title", "description", "audio_url", "duration_seconds", "status", "publish_at", "created_at", "updated_at""#;

/// The sweep transition is one conditional statement per kind: only rows
/// still in `scheduled` are flipped, so concurrent invocations select
/// disjoint sets and a re-run selects nothing.
const PUBLISH_DUE_ARTICLES_SQL: &str = r#"UPDATE "articles"
SET "status" = 'published', "updated_at" = now()
WHERE "status" = 'scheduled' AND "publish_at" <= $1
RETURNING "id", "title""#;

const PUBLISH_DUE_EPISODES_SQL: &str = r#"UPDATE "episodes"
SET "status" = 'published', "updated_at" = now()
WHERE "status" = 'scheduled' AND "publish_at" <= $1
RETURNING "id", "title""#;

#[derive(Clone)]
pub struct PostgresContentRepository {
    database: &'static Database,
}

impl PostgresContentRepository {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn pool(&self) -> &sqlx::PgPool {
        self.database.database_pool()
    }
}

impl ContentRepository for PostgresContentRepository {
    async fn create_article(&self, new: NewArticle) -> Result<Article, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO "articles" ("title", "slug", "summary", "body", "image_url", "featured", "status", "publish_at")
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING {ARTICLE_COLUMNS}"#
        );

        let row: ArticleRow = sqlx::query_as(&sql)
            .bind(new.title.into_inner())
            .bind(new.slug.into_inner())
            .bind(new.summary)
            .bind(new.body)
            .bind(new.image_url)
            .bind(new.featured)
            .bind(new.publication.status.as_str())
            .bind(new.publication.publish_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn update_article(
        &self,
        id: ArticleId,
        update: ArticleUpdate,
    ) -> Result<Article, RepositoryError> {
        let (sql, params) = build_article_update(update);

        let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
        for param in params {
            query = param.bind_to_query_as(query);
        }

        let row = query
            .bind(id.0)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_article(&self, id: ArticleId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "articles" WHERE "id" = $1"#)
            .bind(id.0)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_article_status(
        &self,
        id: ArticleId,
        status: PublicationStatus,
    ) -> Result<Article, RepositoryError> {
        let sql = format!(
            r#"UPDATE "articles" SET "status" = $1, "updated_at" = now() WHERE "id" = $2 RETURNING {ARTICLE_COLUMNS}"#
        );

        let row: Option<ArticleRow> = sqlx::query_as(&sql)
            .bind(status.as_str())
            .bind(id.0)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn find_published_article_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<Article>, RepositoryError> {
        let sql = format!(
            r#"SELECT {ARTICLE_COLUMNS} FROM "articles"
WHERE "slug" = $1 AND "status" = 'published' AND "publish_at" <= now()"#
        );

        let row: Option<ArticleRow> = sqlx::query_as(&sql)
            .bind(slug.as_ref())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(Article::try_from).transpose()
    }

    async fn list_published_articles(
        &self,
        filter: ArticleFilter,
    ) -> Result<Vec<Article>, RepositoryError> {
        let mut conditions = vec![
            r#""status" = 'published'"#.to_owned(),
            r#""publish_at" <= now()"#.to_owned(),
        ];
        let mut params: Vec<SqlParameter> = Vec::new();

        if let Some(featured) = filter.featured {
            params.push(SqlParameter::Boolean(featured));
            conditions.push(format!(r#""featured" = ${}"#, params.len()));
        }

        params.push(SqlParameter::Integer(filter.limit));
        let limit_position = params.len();
        params.push(SqlParameter::Integer(filter.offset));
        let offset_position = params.len();

        let sql = format!(
            r#"SELECT {ARTICLE_COLUMNS} FROM "articles"
WHERE {}
ORDER BY "publish_at" DESC
LIMIT ${limit_position} OFFSET ${offset_position}"#,
            conditions.join(" AND "),
        );

        let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
        for param in params {
            query = param.bind_to_query_as(query);
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Article::try_from).collect()
    }

    async fn publish_due_articles(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transitioned>, RepositoryError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(PUBLISH_DUE_ARTICLES_SQL)
            .bind(now)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, title)| Transitioned { id, title })
            .collect())
    }

    async fn create_program(&self, new: NewProgram) -> Result<Program, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO "programs" ("title", "slug", "description")
VALUES ($1, $2, $3)
RETURNING {PROGRAM_COLUMNS}"#
        );

        let row: ProgramRow = sqlx::query_as(&sql)
            .bind(new.title.into_inner())
            .bind(new.slug.into_inner())
            .bind(new.description)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn list_programs(&self) -> Result<Vec<Program>, RepositoryError> {
        let sql = format!(r#"SELECT {PROGRAM_COLUMNS} FROM "programs" ORDER BY "title""#);

        let rows: Vec<ProgramRow> = sqlx::query_as(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Program::try_from).collect()
    }

    async fn create_episode(&self, new: NewEpisode) -> Result<Episode, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO "episodes" ("program_id", "title", "description", "audio_url", "duration_seconds", "status", "publish_at")
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING {EPISODE_COLUMNS}"#
        );

        let row: EpisodeRow = sqlx::query_as(&sql)
            .bind(new.program_id.0)
            .bind(new.title.into_inner())
            .bind(new.description)
            .bind(new.audio_url)
            .bind(new.duration_seconds)
            .bind(new.publication.status.as_str())
            .bind(new.publication.publish_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn update_episode(
        &self,
        id: EpisodeId,
        update: EpisodeUpdate,
    ) -> Result<Episode, RepositoryError> {
        let (sql, params) = build_episode_update(update);

        let mut query = sqlx::query_as::<_, EpisodeRow>(&sql);
        for param in params {
            query = param.bind_to_query_as(query);
        }

        let row = query
            .bind(id.0)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_episode(&self, id: EpisodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "episodes" WHERE "id" = $1"#)
            .bind(id.0)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_episode_status(
        &self,
        id: EpisodeId,
        status: PublicationStatus,
    ) -> Result<Episode, RepositoryError> {
        let sql = format!(
            r#"UPDATE "episodes" SET "status" = $1, "updated_at" = now() WHERE "id" = $2 RETURNING {EPISODE_COLUMNS}"#
        );

        let row: Option<EpisodeRow> = sqlx::query_as(&sql)
            .bind(status.as_str())
            .bind(id.0)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn list_published_episodes(
        &self,
        program: Option<ProgramId>,
    ) -> Result<Vec<Episode>, RepositoryError> {
        let mut conditions = vec![
            r#""status" = 'published'"#.to_owned(),
            r#""publish_at" <= now()"#.to_owned(),
        ];
        let mut params: Vec<SqlParameter> = Vec::new();

        if let Some(program) = program {
            params.push(SqlParameter::Integer(program.0));
            conditions.push(format!(r#""program_id" = ${}"#, params.len()));
        }

        let sql = format!(
            r#"SELECT {EPISODE_COLUMNS} FROM "episodes"
WHERE {}
ORDER BY "publish_at" DESC"#,
            conditions.join(" AND "),
        );

        let mut query = sqlx::query_as::<_, EpisodeRow>(&sql);
        for param in params {
            query = param.bind_to_query_as(query);
        }

        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Episode::try_from).collect()
    }

    async fn publish_due_episodes(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transitioned>, RepositoryError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(PUBLISH_DUE_EPISODES_SQL)
            .bind(now)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, title)| Transitioned { id, title })
            .collect())
    }
}

// Row types mirror the tables; conversion into domain entities revalidates
// the text columns so a corrupted row surfaces as a store error, not a panic.

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    slug: String,
    summary: Option<String>,
    body: String,
    image_url: Option<String>,
    featured: bool,
    status: String,
    publish_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = RepositoryError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Article {
            id: ArticleId(row.id),
            title: parse_title(row.title)?,
            slug: parse_slug(row.slug)?,
            summary: row.summary,
            body: row.body,
            image_url: row.image_url,
            featured: row.featured,
            status: parse_status(&row.status)?,
            publish_at: row.publish_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProgramRow {
    id: i64,
    title: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProgramRow> for Program {
    type Error = RepositoryError;

    fn try_from(row: ProgramRow) -> Result<Self, Self::Error> {
        Ok(Program {
            id: ProgramId(row.id),
            title: parse_title(row.title)?,
            slug: parse_slug(row.slug)?,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EpisodeRow {
    id: i64,
    program_id: i64,
    title: String,
    description: Option<String>,
    audio_url: String,
    duration_seconds: Option<i32>,
    status: String,
    publish_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = RepositoryError;

    fn try_from(row: EpisodeRow) -> Result<Self, Self::Error> {
        Ok(Episode {
            id: EpisodeId(row.id),
            program_id: ProgramId(row.program_id),
            title: parse_title(row.title)?,
            description: row.description,
            audio_url: row.audio_url,
            duration_seconds: row.duration_seconds,
            status: parse_status(&row.status)?,
            publish_at: row.publish_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_status(status: &str) -> Result<PublicationStatus, RepositoryError> {
    status
        .parse()
        .map_err(|e| RepositoryError::DatabaseError(format!("failed to parse status: {e}")))
}

fn parse_title(title: String) -> Result<Title, RepositoryError> {
    Title::try_new(title)
        .map_err(|e| RepositoryError::DatabaseError(format!("failed to parse title: {e}")))
}

fn parse_slug(slug: String) -> Result<Slug, RepositoryError> {
    Slug::try_new(slug)
        .map_err(|e| RepositoryError::DatabaseError(format!("failed to parse slug: {e}")))
}

// SQL parameter that will be bound to a query in `$n` order.
#[derive(Debug, Clone)]
enum SqlParameter {
    Text(String),
    NullableText(Option<String>),
    Boolean(bool),
    Integer(i64),
    NullableInteger(Option<i32>),
    NullableInstant(Option<DateTime<Utc>>),
}

impl SqlParameter {
    fn bind_to_query_as<'q, O>(
        self,
        query: QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    ) -> QueryAs<'q, sqlx::Postgres, O, PgArguments> {
        match self {
            SqlParameter::Text(value) => query.bind(value),
            SqlParameter::NullableText(value) => query.bind(value),
            SqlParameter::Boolean(value) => query.bind(value),
            SqlParameter::Integer(value) => query.bind(value),
            SqlParameter::NullableInteger(value) => query.bind(value),
            SqlParameter::NullableInstant(value) => query.bind(value),
        }
    }
}

/// SET list in `$n` order; the row id always binds last.
fn build_article_update(update: ArticleUpdate) -> (String, Vec<SqlParameter>) {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<SqlParameter> = Vec::new();

    if let Some(title) = update.title {
        params.push(SqlParameter::Text(title.into_inner()));
        sets.push(format!(r#""title" = ${}"#, params.len()));
    }
    if let Some(slug) = update.slug {
        params.push(SqlParameter::Text(slug.into_inner()));
        sets.push(format!(r#""slug" = ${}"#, params.len()));
    }
    if let Some(summary) = update.summary {
        params.push(SqlParameter::NullableText(Some(summary)));
        sets.push(format!(r#""summary" = ${}"#, params.len()));
    }
    if let Some(body) = update.body {
        params.push(SqlParameter::Text(body));
        sets.push(format!(r#""body" = ${}"#, params.len()));
    }
    if let Some(image_url) = update.image_url {
        params.push(SqlParameter::NullableText(Some(image_url)));
        sets.push(format!(r#""image_url" = ${}"#, params.len()));
    }
    if let Some(featured) = update.featured {
        params.push(SqlParameter::Boolean(featured));
        sets.push(format!(r#""featured" = ${}"#, params.len()));
    }
    if let Some(publication) = update.publication {
        params.push(SqlParameter::Text(publication.status.as_str().to_owned()));
        sets.push(format!(r#""{STATUS_FIELD_NAME}" = ${}"#, params.len()));
        params.push(SqlParameter::NullableInstant(publication.publish_at));
        sets.push(format!(r#""{PUBLISH_AT_FIELD_NAME}" = ${}"#, params.len()));
    }
    sets.push(format!(r#""{UPDATED_FIELD_NAME}" = now()"#));

    let sql = format!(
        r#"UPDATE "articles" SET {} WHERE "{ID_FIELD_NAME}" = ${} RETURNING {}"#,
        sets.join(", "),
        params.len() + 1,
        ARTICLE_COLUMNS,
    );

    (sql, params)
}

fn build_episode_update(update: EpisodeUpdate) -> (String, Vec<SqlParameter>) {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<SqlParameter> = Vec::new();

    if let Some(title) = update.title {
        params.push(SqlParameter::Text(title.into_inner()));
        sets.push(format!(r#""title" = ${}"#, params.len()));
    }
    if let Some(description) = update.description {
        params.push(SqlParameter::NullableText(Some(description)));
        sets.push(format!(r#""description" = ${}"#, params.len()));
    }
    if let Some(audio_url) = update.audio_url {
        params.push(SqlParameter::Text(audio_url));
        sets.push(format!(r#""audio_url" = ${}"#, params.len()));
    }
    if let Some(duration_seconds) = update.duration_seconds {
        params.push(SqlParameter::NullableInteger(Some(duration_seconds)));
        sets.push(format!(r#""duration_seconds" = ${}"#, params.len()));
    }
    if let Some(publication) = update.publication {
        params.push(SqlParameter::Text(publication.status.as_str().to_owned()));
        sets.push(format!(r#""{STATUS_FIELD_NAME}" = ${}"#, params.len()));
        params.push(SqlParameter::NullableInstant(publication.publish_at));
        sets.push(format!(r#""{PUBLISH_AT_FIELD_NAME}" = ${}"#, params.len()));
    }
    sets.push(format!(r#""{UPDATED_FIELD_NAME}" = now()"#));

    let sql = format!(
        r#"UPDATE "episodes" SET {} WHERE "{ID_FIELD_NAME}" = ${} RETURNING {}"#,
        sets.join(", "),
        params.len() + 1,
        EPISODE_COLUMNS,
    );

    (sql, params)
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::UniqueViolation(db.message().to_owned())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            RepositoryError::ValidationFailed(db.message().to_owned())
        }
        _ => RepositoryError::DatabaseError(e.to_string()),
    }
}
