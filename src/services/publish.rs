//! Batch driver.
//!
//! Takes a Drive change list, runs it through the pipelines, creates the
//! Notion pages and finally marks the source files as processed. Progress is
//! reported through an optional event channel so the CLI can render it.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::markers::ProcessedMarkers;
use crate::drive::{DocumentReader, DriveError, FileStore};
use crate::models::{OcrOptions, WriteCommand};
use crate::notion::{Destination, NotionError, PageRef, StoredItems};
use crate::pipeline::{filter_eligible, normalize_change_records, Pipeline, PipelineError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid change list: {0}")]
    Input(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),

    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("{0} commands are not supported")]
    Unsupported(&'static str),
}

/// Events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum PublishEvent {
    /// Change list filtered down to the files waiting for OCR
    Filtered { received: usize, eligible: usize },
    /// Page created
    Created {
        guid: String,
        title: String,
        page_id: String,
    },
    /// File already has a page, only its marker is written
    Skipped { guid: String, page_id: String },
    /// Processed markers written
    Marked { count: usize },
}

/// A page created during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub guid: String,
    pub page_id: String,
}

/// Outcome of one or more batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub received: usize,
    pub eligible: usize,
    pub created: Vec<CreatedPage>,
    /// Guids that already had a page.
    pub skipped: Vec<String>,
    pub marked: usize,
    /// Page ids beyond the configured capacity, oldest last.
    pub evictable: Vec<String>,
}

impl BatchReport {
    pub fn merge(&mut self, other: BatchReport) {
        self.received += other.received;
        self.eligible += other.eligible;
        self.created.extend(other.created);
        self.skipped.extend(other.skipped);
        self.marked += other.marked;
        self.evictable = other.evictable;
    }
}

/// What the publisher needs to know about the destination and the folders.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub database_id: String,
    pub ocr_options: Vec<OcrOptions>,
    /// Number of pages to keep. Enables duplicate detection through
    /// [`StoredItems`] when set.
    pub capacity: Option<usize>,
    pub thumbnail_domain: String,
}

/// Runs batches against one database.
pub struct Publisher {
    destination: Arc<dyn Destination>,
    store: Arc<dyn FileStore>,
    pipeline: Pipeline,
    settings: PublishSettings,
    events: Option<mpsc::Sender<PublishEvent>>,
}

impl Publisher {
    /// Create a publisher with the default OCR and cover stages.
    pub fn new(
        destination: Arc<dyn Destination>,
        store: Arc<dyn FileStore>,
        reader: Arc<dyn DocumentReader>,
        settings: PublishSettings,
    ) -> Self {
        let pipeline = Pipeline::with_defaults(
            settings.ocr_options.clone(),
            store.clone(),
            reader,
            &settings.thumbnail_domain,
        );
        Self {
            destination,
            store,
            pipeline,
            settings,
            events: None,
        }
    }

    /// Replace the stage pipeline.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Report progress on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<PublishEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    async fn emit(&self, event: PublishEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Load the registry of published pages.
    pub async fn stored_items(&self) -> Result<StoredItems, PublishError> {
        Ok(StoredItems::load(&*self.destination, &self.settings.database_id).await?)
    }

    /// Process a change list (Drive files or change records as raw JSON).
    ///
    /// Any failed remote call aborts the batch. Pages created before the
    /// failure are kept, but no file is marked as processed.
    pub async fn send(&self, items: Vec<Value>) -> Result<BatchReport, PublishError> {
        let received = items.len();
        let records = normalize_change_records(items)?;
        let picked = filter_eligible(&self.settings.ocr_options, records);

        let mut report = BatchReport {
            received,
            eligible: picked.len(),
            ..Default::default()
        };
        self.emit(PublishEvent::Filtered {
            received,
            eligible: picked.len(),
        })
        .await;

        if picked.is_empty() {
            debug!("Nothing to publish out of {} items", received);
            return Ok(report);
        }

        let database_id = self.settings.database_id.as_str();
        let schema = self.destination.retrieve_schema(database_id).await?;
        let mut stored = match self.settings.capacity {
            Some(_) => Some(self.stored_items().await?),
            None => None,
        };
        let mut markers = ProcessedMarkers::default();

        let mut commands = self
            .pipeline
            .commands(&*self.store, database_id, &schema, picked);
        while let Some(next) = commands.next().await {
            let (command, item, file) = next?;

            let existing = stored
                .as_ref()
                .and_then(|s| s.record_id(&item.guid))
                .map(String::from);
            if let (Some(page_id), Some(stored)) = (existing, stored.as_mut()) {
                info!("{} already has page {}, not creating another", item.guid, page_id);
                stored.updated(&item.guid);
                markers.add(&item.guid, &item.text);
                report.skipped.push(item.guid.clone());
                self.emit(PublishEvent::Skipped {
                    guid: item.guid,
                    page_id,
                })
                .await;
                continue;
            }

            let page = self.execute(&command).await?;
            info!("Created page {} for {}", page.id, file.title);
            if let Some(stored) = stored.as_mut() {
                stored.created(&item.guid);
            }
            markers.add(&item.guid, &item.text);
            report.created.push(CreatedPage {
                guid: item.guid.clone(),
                page_id: page.id.clone(),
            });
            self.emit(PublishEvent::Created {
                guid: item.guid,
                title: file.title,
                page_id: page.id,
            })
            .await;
        }

        report.marked = markers.apply(&*self.store).await?;
        self.emit(PublishEvent::Marked {
            count: report.marked,
        })
        .await;

        if let (Some(stored), Some(capacity)) = (stored.as_ref(), self.settings.capacity) {
            report.evictable = stored
                .eviction_candidates(capacity)
                .into_iter()
                .flatten()
                .collect();
            if !report.evictable.is_empty() {
                warn!(
                    "{} pages exceed the capacity of {}; they are left in place",
                    report.evictable.len(),
                    capacity
                );
            }
        }

        Ok(report)
    }

    /// List every configured scan folder and send its files.
    pub async fn ocr(&self) -> Result<BatchReport, PublishError> {
        let mut total = BatchReport::default();
        for opts in &self.settings.ocr_options {
            let items = self.store.list_folder(&opts.scan_folder_id).await?;
            info!("{} files in scan folder {}", items.len(), opts.scan_folder_id);
            total.merge(self.send(items).await?);
        }
        Ok(total)
    }

    async fn execute(&self, command: &WriteCommand) -> Result<PageRef, PublishError> {
        match command {
            WriteCommand::Create(page) => Ok(self.destination.create_page(page).await?),
            WriteCommand::Update(_) | WriteCommand::Delete(_) => {
                Err(PublishError::Unsupported(command.kind()))
            }
        }
    }
}
