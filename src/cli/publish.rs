//! `send` and `ocr` commands.

use std::path::Path;

use console::style;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{expand_path, Config};
use crate::services::{BatchReport, PublishEvent};

use super::helpers::{build_publisher, read_change_items};

/// Publish the files listed in a change list file.
pub async fn cmd_send(config: &Config, input: &Path) -> anyhow::Result<()> {
    let path = expand_path(&input.to_string_lossy());
    let items = read_change_items(&path).await?;

    let (event_tx, printer) = spawn_event_printer();
    let publisher = build_publisher(config)?.with_events(event_tx);
    let result = publisher.send(items).await;
    drop(publisher);
    printer.await?;

    print_report(&result?);
    Ok(())
}

/// OCR every configured scan folder.
pub async fn cmd_ocr(config: &Config) -> anyhow::Result<()> {
    let (event_tx, printer) = spawn_event_printer();
    let publisher = build_publisher(config)?.with_events(event_tx);
    let result = publisher.ocr().await;
    drop(publisher);
    printer.await?;

    print_report(&result?);
    Ok(())
}

fn spawn_event_printer() -> (mpsc::Sender<PublishEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<PublishEvent>(32);
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PublishEvent::Filtered { received, eligible } => {
                    println!(
                        "{} {} of {} files waiting for OCR",
                        style("→").cyan(),
                        eligible,
                        received
                    );
                }
                PublishEvent::Created {
                    title, page_id, ..
                } => {
                    println!("  {} {} {}", style("✓").green(), title, style(page_id).dim());
                }
                PublishEvent::Skipped { guid, page_id } => {
                    println!(
                        "  {} {} already published as {}",
                        style("-").yellow(),
                        guid,
                        style(page_id).dim()
                    );
                }
                PublishEvent::Marked { count } if count > 0 => {
                    println!("{} Marked {} files as processed", style("→").cyan(), count);
                }
                PublishEvent::Marked { .. } => {}
            }
        }
    });
    (tx, handle)
}

fn print_report(report: &BatchReport) {
    println!();
    println!(
        "{} {} created, {} skipped, {} marked",
        style("Done:").bold(),
        report.created.len(),
        report.skipped.len(),
        report.marked
    );
    if !report.evictable.is_empty() {
        println!(
            "{} {} pages exceed the configured capacity (run `ocr2notion stored` to list them)",
            style("!").yellow(),
            report.evictable.len()
        );
    }
}
