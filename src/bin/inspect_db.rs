use sqlx::Row;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <search_query>", args[0]);
        eprintln!("Search query matches against sender or subject.");
        std::process::exit(1);
    }

    let query = &args[1];
    let search_term = format!("%{}%", query);

    let database_url = "sqlite://grules.db";
    let pool = SqlitePoolOptions::new()
        .connect(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    let rows = sqlx::query(
        "SELECT id, from_address, subject, date, snippet
         FROM emails
         WHERE from_address LIKE ? OR subject LIKE ?
         LIMIT 20",
    )
    .bind(&search_term)
    .bind(&search_term)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No messages found matching '{}'", query);
        return Ok(());
    }

    for row in rows {
        let id: String = row.get("id");
        let from: String = row.get("from_address");
        let subject: String = row.get("subject");
        let date: String = row.get("date");
        let snippet: String = row.get("snippet");

        println!("ID: {}", id);
        println!("From: {}", from);
        println!("Subject: {}", subject);
        println!("Date: {}", date);
        println!("Snippet: {}", snippet);
        println!(
            "--------------------------------------------------------------------------------"
        );
    }

    Ok(())
}
