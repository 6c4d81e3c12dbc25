//! File pipeline: Drive files to OCR'd [`FileItem`]s.

use std::sync::Arc;

use async_stream::stream;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::StreamExt;
use tracing::{debug, info};

use super::{FileStream, FileTransformer, PipelineError};
use crate::drive::{DocumentReader, FileStore};
use crate::models::{DriveFile, FileItem, OcrOptions};
use crate::utils::{classify_type, derive_excerpt};

/// Text stored when OCR produced nothing.
pub const NO_TEXT_PLACEHOLDER: &str = "OCR - テキストは生成されませんでした。";

/// Format a Drive timestamp as UTC ISO-8601 with milliseconds.
///
/// Missing or unparseable values fall back to `now`.
pub fn iso_timestamp(value: Option<&str>, now: DateTime<Utc>) -> String {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn item_shell(file: &DriveFile, link: String) -> FileItem {
    let mime_type = file.mime_type.clone().unwrap_or_default();
    FileItem {
        guid: file.id.clone(),
        file_type: classify_type(&mime_type),
        mime_type,
        description: file.description.clone().unwrap_or_default(),
        link,
        modified: iso_timestamp(file.modified_date.as_deref(), Utc::now()),
        thumbnail_link: file.thumbnail_link.clone(),
        ..Default::default()
    }
}

/// Base of the file pipeline.
///
/// Resolves each file's link and yields an item with empty text and excerpt.
pub fn changed_items<'a>(store: &'a dyn FileStore, files: Vec<DriveFile>) -> FileStream<'a> {
    Box::pin(stream! {
        for file in files {
            let link = match store.file_link(&file).await {
                Ok(link) => link,
                Err(e) => {
                    yield Err(PipelineError::from(e));
                    break;
                }
            };
            let item = item_shell(&file, link);
            yield Ok((item, file));
        }
    })
}

/// Copies each file with OCR and reads the text back.
///
/// Files outside every configured scan folder, and files whose copy returns
/// nothing, are dropped.
pub struct OcrStage {
    options: Vec<OcrOptions>,
    store: Arc<dyn FileStore>,
    reader: Arc<dyn DocumentReader>,
}

impl OcrStage {
    pub fn new(
        options: Vec<OcrOptions>,
        store: Arc<dyn FileStore>,
        reader: Arc<dyn DocumentReader>,
    ) -> Self {
        Self {
            options,
            store,
            reader,
        }
    }

    /// First option whose scan folder is a parent of `file`.
    fn options_for(&self, file: &DriveFile) -> Option<&OcrOptions> {
        self.options
            .iter()
            .find(|o| file.has_parent(&o.scan_folder_id))
    }

    async fn process(
        &self,
        mut item: FileItem,
        file: DriveFile,
    ) -> Result<Option<(FileItem, DriveFile)>, PipelineError> {
        let Some(opts) = self.options_for(&file) else {
            debug!("No OCR options match {} ({}), dropping", file.title, file.id);
            return Ok(None);
        };

        let copied = self
            .store
            .copy_with_ocr(&file, &opts.ocr_folder_id, &opts.ocr_language)
            .await?;
        let Some(document_id) = copied else {
            debug!("OCR copy of {} returned nothing, dropping", file.id);
            return Ok(None);
        };

        let text = self.reader.read_text(&document_id).await?;
        let text = if text.is_empty() {
            NO_TEXT_PLACEHOLDER.to_string()
        } else {
            text
        };

        item.excerpt = derive_excerpt(&text);
        item.text = text;
        item.tags = opts.tags.clone();
        item.ocr_options = Some(opts.clone());

        if opts.remove_ocr_file {
            self.store.remove(&document_id).await?;
        }

        info!("OCR done for {} ({} chars)", file.title, item.text.chars().count());
        Ok(Some((item, file)))
    }
}

impl FileTransformer for OcrStage {
    fn name(&self) -> &str {
        "ocr"
    }

    fn transform<'a>(&'a self, mut input: FileStream<'a>) -> FileStream<'a> {
        Box::pin(stream! {
            while let Some(next) = input.next().await {
                let (item, file) = match next {
                    Ok(pair) => pair,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };
                match self.process(item, file).await {
                    Ok(Some(pair)) => yield Ok(pair),
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }
}
