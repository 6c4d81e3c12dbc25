//! `stored` command.

use console::style;

use crate::config::Config;
use crate::notion::StoredItems;

use super::helpers::notion_client;

/// Show the published pages and the ones beyond `limit`.
pub async fn cmd_stored(config: &Config, limit: Option<usize>) -> anyhow::Result<()> {
    let notion = notion_client(config)?;
    let database_id = config.database_id()?;
    let stored = StoredItems::load(&notion, database_id).await?;

    println!(
        "\n{}",
        style(format!("Stored pages: {}", database_id)).bold()
    );
    println!("{}", "-".repeat(40));
    println!("{:<16} {}", "Pages:", stored.len());

    let Some(limit) = limit.or(config.capacity) else {
        println!("{:<16} {}", "Capacity:", style("not set").dim());
        return Ok(());
    };
    println!("{:<16} {}", "Capacity:", limit);

    let evictable: Vec<String> = stored
        .eviction_candidates(limit)
        .into_iter()
        .flatten()
        .collect();
    if evictable.is_empty() {
        println!("{} Nothing beyond capacity", style("✓").green());
        return Ok(());
    }

    println!(
        "\n{} {} pages beyond capacity (oldest last):",
        style("!").yellow(),
        evictable.len()
    );
    for entry in stored.iter().skip(limit) {
        let page_id = entry.page_id.as_deref().unwrap_or("-");
        println!("  {}  {}", page_id, style(&entry.guid).dim());
    }
    for page_id in stored.duplicates() {
        println!("  {}  {}", page_id, style("(duplicate guid)").dim());
    }
    Ok(())
}
