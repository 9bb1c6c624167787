//! Selection of rows, columns and whole tables in the host document.

mod tracker;

pub use tracker::{on_selection_changed, CurrentTableRef, SelectionTracker};
