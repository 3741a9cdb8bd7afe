//! The headless render surface: element arena, scoped queries, selector
//! parsing, measurement and resize observation.

pub mod metrics;
pub mod node;
pub mod query;
pub mod selector;
pub mod tree;

pub use metrics::{ResizeEvent, Size};
pub use node::{ElementData, ElementId};
pub use selector::{Selector, SelectorError};
pub use tree::Dom;
