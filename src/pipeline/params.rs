//! Parameter pipeline: [`FileItem`]s to Notion write commands.

use std::collections::BTreeMap;

use async_stream::stream;
use chrono::SecondsFormat;
use futures::StreamExt;
use tracing::debug;
use url::Url;

use super::{Clock, FileStream, ParamStream, ParamTransformer};
use crate::models::{DriveFile, FileItem, WriteCommand};
use crate::notion::{
    Block, Cover, CreatePage, DatabaseSchema, Parent, PropertyKind, PropertyValue,
};
use crate::utils::text::{chunk_chars, BLOCK_CHUNK_CHARS};

/// Property that always receives the file title.
pub const TITLE_PROPERTY: &str = "title";

/// Host that serves stable Drive thumbnails.
pub const DEFAULT_THUMBNAIL_DOMAIN: &str = "googleusercontent.com";

struct FieldContext<'a> {
    item: &'a FileItem,
    now: &'a str,
}

/// Optional page property, written only when the database declares a column
/// with this name and kind. Empty values are written as they are.
struct OptionalField {
    name: &'static str,
    kind: PropertyKind,
    value: fn(&FieldContext<'_>) -> PropertyValue,
}

fn entry_updated(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::date(ctx.now)
}

fn guid(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::rich_text(&ctx.item.guid)
}

fn mime_type(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::select(&ctx.item.mime_type)
}

fn file_type(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::select(&ctx.item.file_type)
}

fn tags(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::multi_select(ctx.item.tags.iter().cloned())
}

fn excerpt(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::rich_text(&ctx.item.excerpt)
}

fn description(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::rich_text(&ctx.item.description)
}

fn link(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::Url(ctx.item.link.clone())
}

fn modified(ctx: &FieldContext<'_>) -> PropertyValue {
    PropertyValue::date(&ctx.item.modified)
}

static OPTIONAL_FIELDS: &[OptionalField] = &[
    OptionalField {
        name: "entryUpdated",
        kind: PropertyKind::Date,
        value: entry_updated,
    },
    OptionalField {
        name: "guid",
        kind: PropertyKind::RichText,
        value: guid,
    },
    OptionalField {
        name: "mimeType",
        kind: PropertyKind::Select,
        value: mime_type,
    },
    OptionalField {
        name: "type",
        kind: PropertyKind::Select,
        value: file_type,
    },
    OptionalField {
        name: "tags",
        kind: PropertyKind::MultiSelect,
        value: tags,
    },
    OptionalField {
        name: "タグ",
        kind: PropertyKind::MultiSelect,
        value: tags,
    },
    OptionalField {
        name: "excerpt",
        kind: PropertyKind::RichText,
        value: excerpt,
    },
    OptionalField {
        name: "description",
        kind: PropertyKind::RichText,
        value: description,
    },
    OptionalField {
        name: "link",
        kind: PropertyKind::Url,
        value: link,
    },
    OptionalField {
        name: "modified",
        kind: PropertyKind::Date,
        value: modified,
    },
];

/// Page payload for one item.
///
/// The title is always set. Every other property is written only if the
/// schema has a column of that name and kind.
pub fn create_page(
    database_id: &str,
    schema: &DatabaseSchema,
    item: &FileItem,
    file: &DriveFile,
    now: &str,
) -> CreatePage {
    let ctx = FieldContext { item, now };
    let mut properties = BTreeMap::new();
    properties.insert(TITLE_PROPERTY.to_string(), PropertyValue::title(&file.title));

    for field in OPTIONAL_FIELDS {
        if schema.has(field.name, field.kind) {
            properties.insert(field.name.to_string(), (field.value)(&ctx));
        }
    }

    CreatePage {
        parent: Parent {
            database_id: database_id.to_string(),
        },
        properties,
        children: chunk_chars(&item.text, BLOCK_CHUNK_CHARS)
            .into_iter()
            .map(Block::paragraph)
            .collect(),
        cover: None,
    }
}

/// Base of the parameter pipeline: one create command per item.
///
/// Files in the trash never produce a command.
pub fn build_create_commands<'a>(
    database_id: &'a str,
    schema: &'a DatabaseSchema,
    mut input: FileStream<'a>,
    clock: Clock,
) -> ParamStream<'a> {
    Box::pin(stream! {
        while let Some(next) = input.next().await {
            let (item, file) = match next {
                Ok(pair) => pair,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            if file.labels.trashed {
                debug!("Skipping trashed file {}", file.id);
                continue;
            }
            let now = clock().to_rfc3339_opts(SecondsFormat::Millis, true);
            let page = create_page(database_id, schema, &item, &file, &now);
            yield Ok((WriteCommand::Create(page), item, file));
        }
    })
}

/// Uses the file thumbnail as the page cover when the URL is stable.
///
/// Thumbnail URLs with a query string are signed and expire, so only bare
/// URLs on the allowed domain (or a subdomain) are accepted.
pub struct ThumbnailCoverStage {
    domain: String,
}

impl ThumbnailCoverStage {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn is_stable(&self, link: &str) -> bool {
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        if url.query().is_some_and(|q| !q.is_empty()) {
            return false;
        }
        match url.host_str() {
            Some(host) => {
                host == self.domain
                    || host
                        .strip_suffix(self.domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            None => false,
        }
    }

    fn cover_for(&self, item: &FileItem) -> Option<Cover> {
        item.thumbnail_link
            .as_deref()
            .filter(|link| self.is_stable(link))
            .map(Cover::external)
    }
}

impl Default for ThumbnailCoverStage {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_DOMAIN)
    }
}

impl ParamTransformer for ThumbnailCoverStage {
    fn name(&self) -> &str {
        "thumbnail-cover"
    }

    fn transform<'a>(&'a self, mut input: ParamStream<'a>) -> ParamStream<'a> {
        Box::pin(stream! {
            while let Some(next) = input.next().await {
                let (mut command, item, file) = match next {
                    Ok(triple) => triple,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };
                if let Some(cover) = self.cover_for(&item) {
                    match &mut command {
                        WriteCommand::Create(page) => page.cover = Some(cover),
                        WriteCommand::Update(page) => page.cover = Some(cover),
                        WriteCommand::Delete(_) => {}
                    }
                }
                yield Ok((command, item, file));
            }
        })
    }
}
