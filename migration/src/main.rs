use crate::settings::Settings;
use canal_common::database;

mod settings;
mod tables;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let database = database::connect(&settings.database).await?;
    println!("Connected to DB");

    tables::apply_migration_steps(tables::migration_steps(), database).await?;
    println!("Schema migrated");

    Ok(())
}
