//! ocr2notion - OCR newly scanned Google Drive files and publish them to Notion.
//!
//! Scanned PDFs and images dropped into configured Drive folders are copied
//! with Drive's OCR enabled, their text is read back, and one Notion page is
//! created per file. The source file's description is then set to a text
//! excerpt, which keeps it out of later batches.
//!
//! The moving parts:
//! - [`pipeline`]: lazy file and parameter stages that turn change records
//!   into [`models::WriteCommand`]s
//! - [`notion`]: the Notion REST client and the [`notion::StoredItems`]
//!   registry of already published pages
//! - [`drive`]: the Google Drive collaborator traits and REST client
//! - [`services::publish`]: the batch driver (`send` / `ocr`)

pub mod cli;
pub mod config;
pub mod drive;
pub mod http_client;
pub mod models;
pub mod notion;
pub mod pipeline;
pub mod services;
pub mod utils;
