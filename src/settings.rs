//! Per-widget snippet configuration.
//!
//! Settings arrive as a free-form JSON object from the page-builder document,
//! using the widget's control keys (`js_code`, `placement`, `use_jquery`,
//! `trigger`, `custom_event_name`, `popup_id_filter`, `restrict_to_popup`).
//! Extraction is defensive: missing keys get defaults, switcher controls are
//! the builder's "yes"/"no" strings, and unknown enum values fall back rather
//! than dropping the snippet.

use crate::registry::Bucket;

/// Where the wrapped snippet is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Inline,
    Header,
    Footer,
}

impl Placement {
    /// Parse a placement setting value. Unknown strings return `None`; the
    /// caller falls back to `Inline` so no snippet is silently lost to a
    /// bucket the registry would reject.
    pub fn parse(raw: &str) -> Option<Placement> {
        match raw {
            "inline" => Some(Placement::Inline),
            other => Bucket::parse(other).map(Placement::from),
        }
    }

    /// The registry bucket this placement feeds, if any.
    pub fn bucket(&self) -> Option<Bucket> {
        match self {
            Placement::Inline => None,
            Placement::Header => Some(Bucket::Header),
            Placement::Footer => Some(Bucket::Footer),
        }
    }

    /// Human-readable label for the editor placeholder.
    pub fn label(&self) -> &'static str {
        match self {
            Placement::Inline => "Inline",
            Placement::Header => "Header",
            Placement::Footer => "Footer",
        }
    }
}

impl From<Bucket> for Placement {
    fn from(bucket: Bucket) -> Placement {
        match bucket {
            Bucket::Header => Placement::Header,
            Bucket::Footer => Placement::Footer,
        }
    }
}

/// When the snippet body executes once its delivery point is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    #[default]
    Immediate,
    FrameworkInit,
    PopupShow,
    CustomEvent,
}

impl Trigger {
    /// Parse a trigger setting value; unknown strings degrade to `Immediate`.
    pub fn parse(raw: &str) -> Trigger {
        match raw {
            "elementor_init" => Trigger::FrameworkInit,
            "popup_show" => Trigger::PopupShow,
            "custom_event" => Trigger::CustomEvent,
            _ => Trigger::Immediate,
        }
    }

    /// Human-readable label for the editor placeholder.
    pub fn label(&self) -> &'static str {
        match self {
            Trigger::Immediate => "Immediate",
            Trigger::FrameworkInit => "Elementor init",
            Trigger::PopupShow => "Popup show",
            Trigger::CustomEvent => "Custom event",
        }
    }
}

/// Fully-resolved configuration for one custom-JS widget instance.
#[derive(Debug, Clone, Default)]
pub struct SnippetSettings {
    pub code: String,
    pub placement: Placement,
    pub use_jquery: bool,
    pub trigger: Trigger,
    pub custom_event_name: String,
    pub popup_id_filter: String,
    pub restrict_to_popup: bool,
}

impl SnippetSettings {
    /// Build settings from the raw settings object of an element descriptor.
    pub fn from_value(raw: &serde_json::Value) -> SnippetSettings {
        SnippetSettings {
            code: str_field(raw, "js_code").to_string(),
            placement: Placement::parse(str_field(raw, "placement")).unwrap_or_default(),
            use_jquery: switcher_field(raw, "use_jquery"),
            trigger: Trigger::parse(str_field(raw, "trigger")),
            custom_event_name: str_field(raw, "custom_event_name").to_string(),
            popup_id_filter: str_field(raw, "popup_id_filter").to_string(),
            restrict_to_popup: switcher_field(raw, "restrict_to_popup"),
        }
    }

    /// Whether there is anything to emit at all.
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

fn str_field<'a>(raw: &'a serde_json::Value, key: &str) -> &'a str {
    raw.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

// Switcher controls serialize as "yes" / "no" strings.
fn switcher_field(raw: &serde_json::Value, key: &str) -> bool {
    str_field(raw, key) == "yes"
}
