//! Shared minutes state.
//!
//! The record is only changed through [`MinutesAction`]s reduced by a pure
//! function, and the [`MinutesHandle`] applies each action as one snapshot.

pub mod handle;
pub mod model;
pub mod reducer;

pub use handle::{MinutesHandle, RequestTag};
pub use model::{ChatMessage, DeliveryStatus, Minutes, Role};
pub use reducer::{reduce, MinutesAction, TranscriptMerge};
