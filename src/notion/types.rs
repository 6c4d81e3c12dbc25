//! Notion API request and response shapes.
//!
//! Only the subset used for publishing pages is modelled.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Database a page is created in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub database_id: String,
}

/// Rich text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
            },
        }
    }

    pub fn content(&self) -> &str {
        match self {
            RichText::Text { text } => &text.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

/// Value written to a page property.
///
/// Serializes as `{"<kind>": <value>}`, e.g. `{"select": {"name": "pdf"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Select(SelectOption),
    MultiSelect(Vec<SelectOption>),
    Date(DateValue),
    Url(String),
}

impl PropertyValue {
    pub fn title(content: impl Into<String>) -> Self {
        PropertyValue::Title(vec![RichText::plain(content)])
    }

    pub fn rich_text(content: impl Into<String>) -> Self {
        PropertyValue::RichText(vec![RichText::plain(content)])
    }

    pub fn select(name: impl Into<String>) -> Self {
        PropertyValue::Select(SelectOption::new(name))
    }

    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::MultiSelect(names.into_iter().map(SelectOption::new).collect())
    }

    pub fn date(start: impl Into<String>) -> Self {
        PropertyValue::Date(DateValue {
            start: start.into(),
        })
    }

    /// Kind of database column this value can be written to.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Title(_) => PropertyKind::Title,
            PropertyValue::RichText(_) => PropertyKind::RichText,
            PropertyValue::Select(_) => PropertyKind::Select,
            PropertyValue::MultiSelect(_) => PropertyKind::MultiSelect,
            PropertyValue::Date(_) => PropertyKind::Date,
            PropertyValue::Url(_) => PropertyKind::Url,
        }
    }
}

/// Paragraph content of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

/// A child block of a page. Only paragraphs are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub object: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub paragraph: Paragraph,
}

impl Block {
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self {
            object: "block".to_string(),
            kind: "paragraph".to_string(),
            paragraph: Paragraph {
                rich_text: vec![RichText::plain(content)],
            },
        }
    }

    /// Text of the paragraph.
    pub fn text(&self) -> String {
        self.paragraph
            .rich_text
            .iter()
            .map(RichText::content)
            .collect()
    }
}

/// Page cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cover {
    External { external: ExternalUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrl {
    pub url: String,
}

impl Cover {
    pub fn external(url: impl Into<String>) -> Self {
        Cover::External {
            external: ExternalUrl { url: url.into() },
        }
    }
}

/// Body of `POST /v1/pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePage {
    pub parent: Parent,
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
}

/// Body of `PATCH /v1/pages/{page_id}`. The id goes into the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePage {
    #[serde(skip)]
    pub page_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
}

impl UpdatePage {
    /// Payload that archives (deletes) a page.
    pub fn archive(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            properties: BTreeMap::new(),
            archived: Some(true),
            cover: None,
        }
    }
}

/// Reference to a page returned by create/update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRef {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Type of a database column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    CreatedTime,
    LastEditedTime,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertySchema {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
}

/// Columns of a database, from `GET /v1/databases/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseSchema {
    #[serde(default)]
    pub properties: HashMap<String, PropertySchema>,
}

impl DatabaseSchema {
    /// Build a schema from `(name, kind)` pairs.
    pub fn from_kinds<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, PropertyKind)>,
        S: Into<String>,
    {
        let properties = columns
            .into_iter()
            .map(|(name, kind)| {
                (
                    name.into(),
                    PropertySchema {
                        id: String::new(),
                        kind,
                    },
                )
            })
            .collect();
        Self { properties }
    }

    /// Whether the database has a column `name` of the given kind.
    pub fn has(&self, name: &str, kind: PropertyKind) -> bool {
        self.properties.get(name).is_some_and(|p| p.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

/// Body of `POST /v1/databases/{id}/query`.
///
/// `database_id` must not appear in the body; the API rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl QueryRequest {
    pub fn sorted_by(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sorts: vec![Sort {
                property: property.into(),
                direction,
            }],
            start_cursor: None,
        }
    }
}

/// A page row returned by a database query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl PageObject {
    /// Plain text of a rich_text property: the `plain_text` of every `text`
    /// run, concatenated. `None` when the property is absent.
    pub fn plain_text(&self, name: &str) -> Option<String> {
        let property = self.properties.get(name)?;
        let runs = property.get("rich_text").and_then(|v| v.as_array());
        let text = runs
            .into_iter()
            .flatten()
            .filter(|run| run.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|run| run.get("plain_text").and_then(|t| t.as_str()))
            .collect();
        Some(text)
    }
}

/// One page of database query results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
