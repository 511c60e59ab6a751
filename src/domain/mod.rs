//! Domain module for the todo board.
//!
//! This module contains the todo record, its validated input form, and
//! the clock used to stamp records.

pub mod todo;

pub use todo::{
    Clock, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, SharedClock, SystemClock, Timestamp, Todo,
    TodoDraft, TodoId, ValidationError,
};
