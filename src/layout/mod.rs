//! Table layout: text measurement, cell construction, table assembly.

mod builder;
mod cache;
mod cell;
mod measure;

pub use builder::{RowLayout, TableBuilder, TableGroup};
pub use cache::WidthCache;
pub use cell::{create_cell, text_anchor, CellBox, CellRequest};
pub use measure::{chunk_token, TextMeasurer};
