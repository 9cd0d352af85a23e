use canal_common::database::Database;

/// One batch of DDL applied inside a single transaction.
pub struct MigrationStep {
    pub ctx: &'static str,
    pub ddls: Vec<String>,
}

/// The content schema, in dependency order. All statements are written
/// `IF NOT EXISTS` so re-running the binary against a migrated database
/// is a no-op.
pub fn migration_steps() -> Vec<MigrationStep> {
    vec![
        MigrationStep {
            ctx: "CREATE TABLE programs",
            ddls: vec![
                r#"CREATE TABLE IF NOT EXISTS "programs" (
    "id" BIGSERIAL PRIMARY KEY,
    "title" TEXT NOT NULL,
    "slug" TEXT NOT NULL UNIQUE,
    "description" TEXT,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#
                .to_owned(),
            ],
        },
        MigrationStep {
            ctx: "CREATE TABLE articles",
            ddls: vec![
                r#"CREATE TABLE IF NOT EXISTS "articles" (
    "id" BIGSERIAL PRIMARY KEY,
    "title" TEXT NOT NULL,
    "slug" TEXT NOT NULL UNIQUE,
    "summary" TEXT,
    "body" TEXT NOT NULL,
    "image_url" TEXT,
    "featured" BOOLEAN NOT NULL DEFAULT false,
    "status" TEXT NOT NULL DEFAULT 'draft',
    "publish_at" TIMESTAMPTZ,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#
                .to_owned(),
                // The sweep selects on exactly this pair.
                r#"CREATE INDEX IF NOT EXISTS "articles_status_publish_at_idx" ON "articles" ("status", "publish_at")"#
                    .to_owned(),
            ],
        },
        MigrationStep {
            ctx: "CREATE TABLE episodes",
            ddls: vec![
                r#"CREATE TABLE IF NOT EXISTS "episodes" (
    "id" BIGSERIAL PRIMARY KEY,
    "program_id" BIGINT NOT NULL REFERENCES "programs" ("id") ON DELETE CASCADE,
    "title" TEXT NOT NULL,
    "description" TEXT,
    "audio_url" TEXT NOT NULL,
    "duration_seconds" INTEGER,
    "status" TEXT NOT NULL DEFAULT 'draft',
    "publish_at" TIMESTAMPTZ,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#
                .to_owned(),
                r#"CREATE INDEX IF NOT EXISTS "episodes_status_publish_at_idx" ON "episodes" ("status", "publish_at")"#
                    .to_owned(),
            ],
        },
    ]
}

pub async fn apply_migration_steps(
    steps: Vec<MigrationStep>,
    database: &Database,
) -> Result<(), anyhow::Error> {
    use futures::stream::{self, StreamExt};

    let mut stream = stream::iter(steps);
    while let Some(step) = stream.next().await {
        database.execute_in_transaction(step.ddls, step.ctx).await?;
    }

    Ok(())
}
