//! # Injector Native Ground Truth
//!
//! Native core for the page-builder custom-JS widget: collects author-supplied
//! script snippets from a page's element tree, wraps each snippet in its
//! trigger/guard boilerplate, and collates header/footer output so the host can
//! print it at its injection points.
//!
//! ## Pipeline Invariants
//!
//! 1. **One Registry Per Render**: the script queue is an explicit per-render
//!    instance owned by [`PageRender`]. It is never process-global, so
//!    concurrent renders cannot bleed scripts into each other.
//!
//! 2. **Dedup**: a given (bucket, code) pair is emitted at most once per render.
//!    The dedup key is a hash over bucket tag + code text; the first-seen entry
//!    keeps its position and later duplicates only OR in the jQuery flag.
//!
//! 3. **Drain Order**: draining a bucket yields entries in first-seen enqueue
//!    order. Draining does not clear; each bucket is drained exactly once per
//!    render, at its injection point.
//!
//! 4. **Guard Nesting**: the popup-scope guard wraps the snippet body *inside*
//!    the trigger listener, so the guard is evaluated every time the listener
//!    fires, not once at registration.
//!
//! 5. **Inline Isolation**: inline-placed snippets never touch the registry;
//!    they are returned to the render callback at the component's position.
//!
//! 6. **No Errors Across The Core Boundary**: all snippet inputs are free-form
//!    strings. Malformed trigger parameters degrade to documented fallbacks,
//!    empty snippet bodies produce no output, and only the host bridge layer
//!    reports bad input.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod emitter;
mod node;
mod registry;
mod settings;
mod wrapper;


pub use emitter::{render_page, ComponentRender, FinalizedPage, PageRender, RenderOptions};
pub use node::{ComponentNode, TARGET_WIDGET_TYPE};
pub use registry::{Bucket, ScriptEntry, ScriptRegistry};
pub use settings::{Placement, SnippetSettings, Trigger};
pub use wrapper::{needs_jquery, wrap_snippet};

#[cfg(feature = "napi")]
pub use emitter::render_page_native;
#[cfg(feature = "napi")]
pub use wrapper::wrap_snippet_native;

#[cfg(feature = "napi")]
#[napi]
pub fn injector_bridge() -> String {
    "Injector Native Bridge Connected".to_string()
}
