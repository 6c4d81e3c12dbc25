//! Data models for ocr2notion.

mod command;
mod drive_file;
mod file_item;
mod ocr_options;

pub use command::WriteCommand;
pub use drive_file::{ChangeRecord, DriveFile, Labels, ParentRef};
pub use file_item::FileItem;
pub use ocr_options::OcrOptions;
