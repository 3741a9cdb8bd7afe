//! # bindery
//!
//! A declarative property-binding engine for host-driven control trees.
//!
//! A host runtime drives visual controls through a property protocol: it
//! pushes property diffs down and reads values, triggers and validation
//! state back. bindery turns a per-class registry of small reusable
//! "worker" units into that protocol: workers build a layout once,
//! translate property changes into element mutations, translate element
//! events back into values and triggers, compose nested controls with
//! property delegation, and drive a measurement-based overflow layout for
//! toolbar-style composites. Rendering itself is out of scope: the engine
//! operates on a headless element arena the embedder measures.
//!
//! ## Core Systems
//!
//! - **[`value`]** — Property value model, coercions, valrep lists
//! - **[`definition`]** — Host-supplied static configuration per occurrence
//! - **[`dom`]** — Slotmap-backed render surface with scoped selector
//!   queries and resize observation
//! - **[`schema`]** — Immutable per-class capability tables built by
//!   [`schema::SchemaBuilder`], plus the class registry
//! - **[`worker`]** — The [`worker::Worker`] trait and the standard worker
//!   library
//! - **[`control`]** — [`control::ControlInstance`]: lifecycle, dispatch,
//!   delegation, triggers, blocking, disposal
//! - **[`overflow`]** — Priority-driven overflow eviction and menu
//!   materialization

// Foundation
pub mod definition;
pub mod value;

// Render surface
pub mod dom;

// Class capabilities and workers
pub mod schema;
pub mod worker;

// Instances
pub mod control;
pub mod overflow;

pub use control::{ControlInstance, LifecycleState};
pub use definition::ObjectDefinition;
pub use dom::{Dom, ElementData, ElementId, Selector, Size};
pub use overflow::{OverflowBehavior, OverflowConfig};
pub use schema::{ControlRegistry, ControlSchema, SchemaBuilder, SchemaError, SubControlDef};
pub use value::{PropMap, Value, ValueFormatting};
pub use worker::Worker;
