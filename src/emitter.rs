//! Emission pipeline: discovery pass, per-component render, bucket drains.
//!
//! Control flow per page render:
//!
//! 1. `discover` walks the element tree once before head output and enqueues
//!    header-placed snippets (and footer-placed ones when configured).
//! 2. The host's body pass calls `render_component` for each widget in
//!    document order; inline snippets come back as code for the component's
//!    position, bucketed snippets are enqueued (idempotent with discovery via
//!    the dedup key).
//! 3. `head_scripts` / `footer_scripts` drain the buckets at the host's
//!    injection points, one code string per delivery unit.
//!
//! In an authoring/preview context, bucketed snippets additionally yield a
//! visible placeholder block so the author sees where the output will land.

use serde::{Deserialize, Serialize};

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::node::{find_target_widgets, ComponentNode};
use crate::registry::{Bucket, ScriptRegistry};
use crate::settings::SnippetSettings;
use crate::wrapper::{needs_jquery, wrap_snippet};

/// Per-render configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Authoring/preview context: bucketed snippets render a placeholder
    /// block at the component's position.
    #[serde(default)]
    pub is_editor: bool,
    /// Also enqueue footer snippets during the early discovery pass. Only
    /// needed when the host's footer injection point can fire before the last
    /// component has rendered; the body-pass enqueue then dedups against it.
    #[serde(default)]
    pub discover_footer: bool,
}

/// What to write at a component's position in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRender {
    /// Empty snippet body: nothing emitted anywhere.
    Skipped,
    /// Wrapped code to embed at the component's position. The host owns the
    /// script-tag delivery and, if flagged, scheduling jQuery first.
    InlineScript { code: String, requires_jquery: bool },
    /// Enqueued into a bucket; nothing to write at this position.
    Queued(Bucket),
    /// Enqueued into a bucket, plus visible placeholder markup for the editor.
    EditorPlaceholder { bucket: Bucket, markup: String },
}

/// One page render: owns the script registry and drives the pipeline.
///
/// Constructed fresh per render and discarded with it. Sharing an instance
/// across concurrent renders would bleed scripts between requests.
#[derive(Debug, Default)]
pub struct PageRender {
    registry: ScriptRegistry,
    options: RenderOptions,
}

impl PageRender {
    pub fn new(options: RenderOptions) -> PageRender {
        PageRender {
            registry: ScriptRegistry::new(),
            options,
        }
    }

    /// Early pass over the element tree, before head output. Enqueues every
    /// header-placed snippet in document order so the head drain sees them.
    pub fn discover(&mut self, nodes: &[ComponentNode]) {
        for widget in find_target_widgets(nodes) {
            let settings = SnippetSettings::from_value(&widget.settings);
            if !settings.has_code() {
                continue;
            }
            let Some(bucket) = settings.placement.bucket() else {
                continue;
            };
            let enqueue = match bucket {
                Bucket::Header => true,
                Bucket::Footer => self.options.discover_footer,
            };
            if enqueue {
                let wrapped = wrap_snippet(&settings, &widget.id);
                self.registry.enqueue(bucket, &wrapped, needs_jquery(&settings));
            }
        }
    }

    /// Body-pass entry point, called once per widget in document order.
    pub fn render_component(&mut self, node: &ComponentNode) -> ComponentRender {
        let settings = SnippetSettings::from_value(&node.settings);
        if !settings.has_code() {
            return ComponentRender::Skipped;
        }

        let wrapped = wrap_snippet(&settings, &node.id);
        match settings.placement.bucket() {
            None => ComponentRender::InlineScript {
                code: wrapped,
                requires_jquery: needs_jquery(&settings),
            },
            Some(bucket) => {
                self.registry.enqueue(bucket, &wrapped, needs_jquery(&settings));
                if self.options.is_editor {
                    ComponentRender::EditorPlaceholder {
                        bucket,
                        markup: editor_placeholder(&settings),
                    }
                } else {
                    ComponentRender::Queued(bucket)
                }
            }
        }
    }

    /// Drain the header bucket: one code string per delivery unit, in order.
    pub fn head_scripts(&self) -> Vec<String> {
        self.drain_codes(Bucket::Header)
    }

    /// Drain the footer bucket.
    pub fn footer_scripts(&self) -> Vec<String> {
        self.drain_codes(Bucket::Footer)
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    fn drain_codes(&self, bucket: Bucket) -> Vec<String> {
        self.registry
            .drain(bucket)
            .iter()
            .map(|entry| entry.code.clone())
            .collect()
    }
}

/// Visible block shown at the component's position in the editor for
/// header/footer placements, naming placement and trigger.
fn editor_placeholder(settings: &SnippetSettings) -> String {
    format!(
        "<div class=\"cjs-script-placeholder\" style=\"padding: 10px; background: #f8f9fa; border: 1px dashed #ccc; text-align: center; margin-bottom: 10px;\">\
<strong>Placement</strong>: {} | <strong>Trigger</strong>: {}</div>",
        settings.placement.label(),
        settings.trigger.label()
    )
}

/// Finalized per-render output, grouped by injection point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct FinalizedPage {
    /// Scripts for the "before head close" injection point, in order.
    pub head: Vec<String>,
    /// Inline output per body position, in document order. In the editor this
    /// also carries the placeholder markup for bucketed snippets.
    pub body: Vec<String>,
    /// Scripts for the "before body close" injection point, in order.
    pub footer: Vec<String>,
    /// Whether the host must load jQuery before any of the output runs.
    pub requires_jquery: bool,
}

/// Run the whole pipeline over an element tree: discovery, body pass in
/// document order, then both drains.
pub fn render_page(nodes: &[ComponentNode], options: RenderOptions) -> FinalizedPage {
    let mut render = PageRender::new(options);
    render.discover(nodes);

    let mut body = Vec::new();
    let mut inline_jquery = false;
    for widget in find_target_widgets(nodes) {
        match render.render_component(widget) {
            ComponentRender::InlineScript {
                code,
                requires_jquery,
            } => {
                inline_jquery |= requires_jquery;
                body.push(code);
            }
            ComponentRender::EditorPlaceholder { markup, .. } => body.push(markup),
            ComponentRender::Queued(_) | ComponentRender::Skipped => {}
        }
    }

    let requires_jquery = inline_jquery
        || render.registry().requires_jquery(Bucket::Header)
        || render.registry().requires_jquery(Bucket::Footer);

    FinalizedPage {
        head: render.head_scripts(),
        body,
        footer: render.footer_scripts(),
        requires_jquery,
    }
}

/// Host bridge: run the pipeline over the raw elements-data JSON.
///
/// Individual malformed element descriptors are skipped with a diagnostic so
/// one broken element does not take down the whole page render.
#[cfg(feature = "napi")]
#[napi]
pub fn render_page_native(
    tree_json: serde_json::Value,
    options_json: serde_json::Value,
) -> napi::Result<FinalizedPage> {
    let options: RenderOptions = serde_json::from_value(options_json)
        .map_err(|e| napi::Error::from_reason(format!("Invalid render options: {}", e)))?;

    let raw_nodes = match tree_json {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => Vec::new(),
        other => {
            return Err(napi::Error::from_reason(format!(
                "Invalid elements data: expected an array, got {}",
                match other {
                    serde_json::Value::Object(_) => "an object",
                    _ => "a scalar",
                }
            )))
        }
    };

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for raw in raw_nodes {
        match serde_json::from_value::<ComponentNode>(raw) {
            Ok(node) => nodes.push(node),
            Err(e) => {
                eprintln!("[Injector] Skipping malformed element descriptor: {}", e);
            }
        }
    }

    Ok(render_page(&nodes, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TARGET_WIDGET_TYPE;

    fn snippet_widget(id: &str, settings: serde_json::Value) -> ComponentNode {
        ComponentNode {
            id: id.to_string(),
            el_type: "widget".to_string(),
            widget_type: Some(TARGET_WIDGET_TYPE.to_string()),
            settings,
            ..Default::default()
        }
    }

    #[test]
    fn test_inline_widget_never_enqueued() {
        let widget = snippet_widget("a1", serde_json::json!({ "js_code": "x = 1;" }));
        let mut render = PageRender::new(RenderOptions::default());

        render.discover(std::slice::from_ref(&widget));
        let result = render.render_component(&widget);

        assert_eq!(
            result,
            ComponentRender::InlineScript {
                code: "x = 1;".to_string(),
                requires_jquery: false,
            }
        );
        assert!(render.registry().is_empty(Bucket::Header));
        assert!(render.registry().is_empty(Bucket::Footer));
    }

    #[test]
    fn test_empty_code_skipped() {
        let widget = snippet_widget("a1", serde_json::json!({ "placement": "header" }));
        let mut render = PageRender::new(RenderOptions::default());

        assert_eq!(render.render_component(&widget), ComponentRender::Skipped);
        assert!(render.registry().is_empty(Bucket::Header));
    }

    #[test]
    fn test_discovery_skips_footer_by_default() {
        let widgets = vec![
            snippet_widget(
                "h1",
                serde_json::json!({ "js_code": "h();", "placement": "header" }),
            ),
            snippet_widget(
                "f1",
                serde_json::json!({ "js_code": "f();", "placement": "footer" }),
            ),
        ];
        let mut render = PageRender::new(RenderOptions::default());
        render.discover(&widgets);

        assert_eq!(render.head_scripts(), vec!["h();"]);
        assert!(render.footer_scripts().is_empty());
    }

    #[test]
    fn test_discover_footer_option_dedups_with_body_pass() {
        let widget = snippet_widget(
            "f1",
            serde_json::json!({ "js_code": "f();", "placement": "footer" }),
        );
        let options = RenderOptions {
            discover_footer: true,
            ..Default::default()
        };
        let mut render = PageRender::new(options);

        render.discover(std::slice::from_ref(&widget));
        render.render_component(&widget);

        assert_eq!(render.footer_scripts(), vec!["f();"]);
    }

    #[test]
    fn test_editor_placeholder_names_placement_and_trigger() {
        let widget = snippet_widget(
            "p1",
            serde_json::json!({
                "js_code": "x = 1;",
                "placement": "footer",
                "trigger": "popup_show"
            }),
        );
        let options = RenderOptions {
            is_editor: true,
            ..Default::default()
        };
        let mut render = PageRender::new(options);

        match render.render_component(&widget) {
            ComponentRender::EditorPlaceholder { bucket, markup } => {
                assert_eq!(bucket, Bucket::Footer);
                assert!(markup.contains("<strong>Placement</strong>: Footer"));
                assert!(markup.contains("<strong>Trigger</strong>: Popup show"));
            }
            other => panic!("expected placeholder, got {:?}", other),
        }
        // The snippet is still queued behind the placeholder.
        assert_eq!(render.footer_scripts().len(), 1);
    }

    #[test]
    fn test_inline_still_rendered_in_editor() {
        let widget = snippet_widget("i1", serde_json::json!({ "js_code": "x = 1;" }));
        let options = RenderOptions {
            is_editor: true,
            ..Default::default()
        };
        let mut render = PageRender::new(options);

        assert!(matches!(
            render.render_component(&widget),
            ComponentRender::InlineScript { .. }
        ));
    }
}
