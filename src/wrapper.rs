//! Trigger/guard boilerplate generation.
//!
//! `wrap_snippet` is a pure function from structured settings to the final
//! code string for one snippet. Wrapping order is fixed: the popup-scope guard
//! closes over the raw body first, then the trigger listener closes over the
//! guard, so the guard runs every time the listener fires. Output never
//! includes `<script>` tags; the delivery point adds those.

use lazy_static::lazy_static;
use regex::Regex;

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::settings::{SnippetSettings, Trigger};

/// One-time frontend framework init event.
const FRAMEWORK_INIT_EVENT: &str = "elementor/frontend/init";

/// Document-level event fired with the popup id when a popup opens.
const POPUP_SHOW_EVENT: &str = "elementor/popup/show";

/// Class present on the popup container element.
const POPUP_CONTAINER_CLASS: &str = "elementor-location-popup";

/// Class prefix the builder puts on every element wrapper.
const ELEMENT_CLASS_PREFIX: &str = "elementor-element-";

/// Event name used when the custom-event trigger has no name configured.
const FALLBACK_EVENT_NAME: &str = "custom_js_event";

lazy_static! {
    // Element ids are generated by the builder and are alphanumeric; anything
    // else would break out of the quoted selector below, so strip it.
    static ref UNSAFE_ID_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_-]").unwrap();
}

/// Wrap a snippet body in its popup-scope guard and trigger listener.
///
/// All inputs are free-form strings; malformed trigger parameters degrade to
/// the unguarded/fallback forms rather than failing.
pub fn wrap_snippet(settings: &SnippetSettings, widget_id: &str) -> String {
    let mut code = settings.code.clone();

    if settings.restrict_to_popup {
        let id = UNSAFE_ID_CHARS.replace_all(widget_id, "");
        code = format!(
            "if (jQuery('.{ELEMENT_CLASS_PREFIX}{id}').closest('.{POPUP_CONTAINER_CLASS}').length > 0) {{\n{code}\n}}"
        );
    }

    match settings.trigger {
        Trigger::Immediate => code,

        Trigger::FrameworkInit => format!(
            "jQuery(window).on('{FRAMEWORK_INIT_EVENT}', function() {{\n{code}\n}});"
        ),

        Trigger::PopupShow => {
            let popup_id = settings.popup_id_filter.trim();
            let (open_guard, close_guard) = if popup_id.is_empty() {
                (String::new(), "")
            } else {
                (format!("if (id == '{popup_id}') {{\n"), "\n}")
            };
            format!(
                "jQuery(document).on('{POPUP_SHOW_EVENT}', function(event, id, instance) {{\n{open_guard}{code}{close_guard}\n}});"
            )
        }

        Trigger::CustomEvent => {
            let mut event_name = settings.custom_event_name.trim();
            if event_name.is_empty() {
                event_name = FALLBACK_EVENT_NAME;
            }
            format!("jQuery(document).on('{event_name}', function() {{\n{code}\n}});")
        }
    }
}

/// Whether the wrapped snippet needs jQuery scheduled before it runs: either
/// the author asked for it, the trigger boilerplate binds through jQuery, or
/// the popup-scope guard selects through it.
pub fn needs_jquery(settings: &SnippetSettings) -> bool {
    settings.use_jquery || settings.restrict_to_popup || settings.trigger != Trigger::Immediate
}

/// Host bridge: wrap a snippet from a raw settings object.
#[cfg(feature = "napi")]
#[napi]
pub fn wrap_snippet_native(settings_json: serde_json::Value, widget_id: String) -> String {
    let settings = SnippetSettings::from_value(&settings_json);
    wrap_snippet(&settings, &widget_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(code: &str, trigger: Trigger) -> SnippetSettings {
        SnippetSettings {
            code: code.to_string(),
            trigger,
            ..Default::default()
        }
    }

    #[test]
    fn test_immediate_is_unwrapped() {
        let s = settings("x = 1;", Trigger::Immediate);
        assert_eq!(wrap_snippet(&s, "abc1"), "x = 1;");
    }

    #[test]
    fn test_framework_init_listener() {
        let s = settings("x = 1;", Trigger::FrameworkInit);
        assert_eq!(
            wrap_snippet(&s, "abc1"),
            "jQuery(window).on('elementor/frontend/init', function() {\nx = 1;\n});"
        );
    }

    #[test]
    fn test_popup_show_with_filter() {
        let mut s = settings("x = 1;", Trigger::PopupShow);
        s.popup_id_filter = " 42 ".to_string();

        let wrapped = wrap_snippet(&s, "abc1");
        assert!(wrapped.starts_with(
            "jQuery(document).on('elementor/popup/show', function(event, id, instance) {"
        ));
        assert!(wrapped.contains("if (id == '42') {"));
        assert!(wrapped.contains("x = 1;"));
    }

    #[test]
    fn test_popup_show_without_filter_matches_all() {
        let s = settings("x = 1;", Trigger::PopupShow);
        let wrapped = wrap_snippet(&s, "abc1");
        assert!(!wrapped.contains("if (id =="));
        assert!(wrapped.contains("x = 1;"));
    }

    #[test]
    fn test_custom_event_fallback_name() {
        let mut s = settings("x = 1;", Trigger::CustomEvent);
        s.custom_event_name = "   ".to_string();

        assert_eq!(
            wrap_snippet(&s, "abc1"),
            "jQuery(document).on('custom_js_event', function() {\nx = 1;\n});"
        );
    }

    #[test]
    fn test_custom_event_named() {
        let mut s = settings("x = 1;", Trigger::CustomEvent);
        s.custom_event_name = " my_event ".to_string();

        assert_eq!(
            wrap_snippet(&s, "abc1"),
            "jQuery(document).on('my_event', function() {\nx = 1;\n});"
        );
    }

    #[test]
    fn test_popup_guard_wraps_body() {
        let mut s = settings("x = 1;", Trigger::Immediate);
        s.restrict_to_popup = true;

        assert_eq!(
            wrap_snippet(&s, "9c2d"),
            "if (jQuery('.elementor-element-9c2d').closest('.elementor-location-popup').length > 0) {\nx = 1;\n}"
        );
    }

    #[test]
    fn test_popup_guard_nests_inside_trigger_listener() {
        let mut s = settings("x = 1;", Trigger::FrameworkInit);
        s.restrict_to_popup = true;

        let wrapped = wrap_snippet(&s, "9c2d");
        let listener_at = wrapped.find("jQuery(window).on").unwrap();
        let guard_at = wrapped.find(".closest('.elementor-location-popup')").unwrap();
        // Listener opens first; the guard sits in its body and re-runs per fire.
        assert!(listener_at < guard_at);
        assert!(wrapped.ends_with("});"));
    }

    #[test]
    fn test_widget_id_sanitised_in_selector() {
        let mut s = settings("x = 1;", Trigger::Immediate);
        s.restrict_to_popup = true;

        let wrapped = wrap_snippet(&s, "ab').evil(' ");
        assert!(wrapped.contains("'.elementor-element-abevil'"));
    }

    #[test]
    fn test_needs_jquery_classification() {
        let plain = settings("x = 1;", Trigger::Immediate);
        assert!(!needs_jquery(&plain));

        let mut switched = plain.clone();
        switched.use_jquery = true;
        assert!(needs_jquery(&switched));

        let mut guarded = plain.clone();
        guarded.restrict_to_popup = true;
        assert!(needs_jquery(&guarded));

        assert!(needs_jquery(&settings("x = 1;", Trigger::CustomEvent)));
    }
}
