//! Lazy stage pipelines turning change records into write commands.
//!
//! Two pipelines are chained:
//!
//! 1. the file pipeline ([`files`]) turns Drive files into [`FileItem`]s,
//!    running OCR on the way;
//! 2. the parameter pipeline ([`params`]) turns those items into
//!    [`WriteCommand`]s gated on the database schema.
//!
//! Every stage consumes the previous one as a stream. Nothing runs until the
//! final stream is polled, and each stream can be consumed only once: stages
//! take their input by value, so replaying a pipeline means building it
//! again.

pub mod changes;
pub mod files;
pub mod params;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use thiserror::Error;

use crate::drive::{DocumentReader, DriveError, FileStore};
use crate::models::{ChangeRecord, DriveFile, FileItem, OcrOptions, WriteCommand};
use crate::notion::{DatabaseSchema, NotionError};

pub use changes::{filter_eligible, normalize_change_records};
pub use files::{changed_items, OcrStage, NO_TEXT_PLACEHOLDER};
pub use params::{build_create_commands, ThumbnailCoverStage, DEFAULT_THUMBNAIL_DOMAIN};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),
}

/// Items flowing through the file pipeline.
pub type FileStream<'a> = BoxStream<'a, Result<(FileItem, DriveFile), PipelineError>>;

/// Commands flowing through the parameter pipeline.
pub type ParamStream<'a> =
    BoxStream<'a, Result<(WriteCommand, FileItem, DriveFile), PipelineError>>;

/// Source of the "now" timestamp written to new pages.
pub type Clock = fn() -> DateTime<Utc>;

/// A stage of the file pipeline.
///
/// Implementations must pull from `input` lazily and yield as they go. An
/// error from upstream should be passed on and end the stream.
pub trait FileTransformer: Send + Sync {
    fn name(&self) -> &str;

    fn transform<'a>(&'a self, input: FileStream<'a>) -> FileStream<'a>;
}

/// A stage of the parameter pipeline. Same contract as [`FileTransformer`].
pub trait ParamTransformer: Send + Sync {
    fn name(&self) -> &str;

    fn transform<'a>(&'a self, input: ParamStream<'a>) -> ParamStream<'a>;
}

/// Ordered file and parameter stages, composed left to right.
pub struct Pipeline {
    file_stages: Vec<Box<dyn FileTransformer>>,
    param_stages: Vec<Box<dyn ParamTransformer>>,
    clock: Clock,
}

impl Pipeline {
    pub fn new(
        file_stages: Vec<Box<dyn FileTransformer>>,
        param_stages: Vec<Box<dyn ParamTransformer>>,
    ) -> Self {
        Self {
            file_stages,
            param_stages,
            clock: Utc::now,
        }
    }

    /// The OCR stage followed by the thumbnail cover stage.
    pub fn with_defaults(
        ocr_options: Vec<OcrOptions>,
        store: Arc<dyn FileStore>,
        reader: Arc<dyn DocumentReader>,
        thumbnail_domain: &str,
    ) -> Self {
        Self::new(
            vec![Box::new(OcrStage::new(ocr_options, store, reader))],
            vec![Box::new(ThumbnailCoverStage::new(thumbnail_domain))],
        )
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.file_stages
            .iter()
            .map(|s| s.name())
            .chain(self.param_stages.iter().map(|s| s.name()))
            .collect()
    }

    /// File pipeline over the files of `records`.
    pub fn files<'a>(
        &'a self,
        store: &'a dyn FileStore,
        records: Vec<ChangeRecord>,
    ) -> FileStream<'a> {
        let files = records.into_iter().filter_map(|r| r.file).collect();
        self.file_stages
            .iter()
            .fold(changed_items(store, files), |stream, stage| stage.transform(stream))
    }

    /// Full pipeline: file stages, command building, then parameter stages.
    pub fn commands<'a>(
        &'a self,
        store: &'a dyn FileStore,
        database_id: &'a str,
        schema: &'a DatabaseSchema,
        records: Vec<ChangeRecord>,
    ) -> ParamStream<'a> {
        let items = self.files(store, records);
        let commands = build_create_commands(database_id, schema, items, self.clock);
        self.param_stages
            .iter()
            .fold(commands, |stream, stage| stage.transform(stream))
    }
}
