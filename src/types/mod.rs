//! Data types shared by layout, selection and the host boundary.

mod metadata;
mod node;
mod spec;
mod style;

pub use metadata::*;
pub use node::*;
pub use spec::*;
pub use style::*;
