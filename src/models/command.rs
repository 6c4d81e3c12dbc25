//! Pending writes against the destination database.

use crate::notion::{CreatePage, UpdatePage};

/// A write produced by the parameter pipeline.
///
/// Only [`WriteCommand::Create`] is executed by the publisher; the other
/// variants are modelled so stages can produce them, and executing one is an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCommand {
    Create(CreatePage),
    Update(UpdatePage),
    Delete(UpdatePage),
}

impl WriteCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            WriteCommand::Create(_) => "create",
            WriteCommand::Update(_) => "update",
            WriteCommand::Delete(_) => "delete",
        }
    }

    /// Payload of a create command.
    pub fn as_create(&self) -> Option<&CreatePage> {
        match self {
            WriteCommand::Create(page) => Some(page),
            _ => None,
        }
    }
}
