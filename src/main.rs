mod auth;
mod config;
mod db;
mod engine;
mod executor;
mod fetch;
mod gmail;
mod models;
mod process;
mod rules;

use anyhow::Context;
use google_gmail1::Gmail;

use crate::config::Config;
use crate::gmail::GmailClient;
use crate::rules::RuleSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::load();

    let command = std::env::args().nth(1);
    match command.as_deref() {
        Some("fetch") => {
            let db = open_database(&config).await?;
            let client = build_client(&config).await?;
            fetch::run(&client, &db).await
        }
        Some("process") => {
            // A bad rule set aborts before any provider call is made.
            let rules = RuleSet::load(&config.rules_path)?;
            let db = open_database(&config).await?;
            let client = build_client(&config).await?;
            process::run(&db, &client, &rules).await
        }
        Some("reset-token") => {
            auth::RingStorage.clear_token().await?;
            println!("Token cleared. Run `grules fetch` to re-authenticate.");
            Ok(())
        }
        _ => {
            eprintln!("Usage: grules <fetch|process|reset-token>");
            std::process::exit(2);
        }
    }
}

async fn open_database(config: &Config) -> anyhow::Result<db::Database> {
    let database = db::Database::new(&config.database_url).await?;
    database.run_migrations().await?;
    Ok(database)
}

async fn build_client(config: &Config) -> anyhow::Result<GmailClient> {
    let secret = auth::Authenticator::load_secret(&config.credentials_path).await?;
    let authenticator = auth::Authenticator::authenticate(secret).await?;

    // Force the interactive flow (or a silent refresh) up front so the batch
    // never stalls on auth halfway through.
    authenticator
        .token(auth::SCOPES)
        .await
        .context("Failed to obtain access token")?;

    let hub = Gmail::new(
        hyper::Client::builder().build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .context("Failed to load native roots")?
                .https_only()
                .enable_http1()
                .build(),
        ),
        authenticator,
    );

    Ok(GmailClient::new(hub))
}
