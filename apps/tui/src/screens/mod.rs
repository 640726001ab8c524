//! TUI screen definitions.

mod research;

pub(crate) use research::{Action, ResearchScreen};
