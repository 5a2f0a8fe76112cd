//! Base options for compiling templates that render to the DOM.

use std::sync::Arc;

use tplc_templates::modules::ClassModule;
use tplc_templates::modules::ModelExpansion;
use tplc_templates::CompilerOptions;
use tplc_templates::DefaultProcessor;
use tplc_templates::DirectiveMap;
use tplc_templates::ElementProcessor;
use tplc_templates::HtmlDirective;
use tplc_templates::TextDirective;

const VALUE_TAGS: &[&str] = &["input", "textarea", "option", "select", "progress"];

/// Attributes that only stay in sync when set as DOM properties.
#[must_use]
pub fn must_use_prop(tag: &str, type_attr: Option<&str>, attr: &str) -> bool {
    match attr {
        "value" => VALUE_TAGS.contains(&tag) && type_attr != Some("button"),
        "selected" => tag == "option",
        "checked" => tag == "input",
        "muted" => tag == "video",
        _ => false,
    }
}

#[must_use]
pub fn base_options() -> CompilerOptions {
    let processor: Arc<dyn ElementProcessor> = Arc::new(DefaultProcessor);

    let mut directives = DirectiveMap::new();
    directives.insert("text", Arc::new(TextDirective));
    directives.insert("html", Arc::new(HtmlDirective));

    CompilerOptions {
        directives: Arc::new(directives),
        must_use_prop,
        ..Default::default()
    }
    .with_modules(vec![
        Arc::new(ClassModule),
        Arc::new(ModelExpansion::new(processor)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_use_prop() {
        assert!(must_use_prop("input", None, "value"));
        assert!(must_use_prop("input", Some("text"), "value"));
        assert!(!must_use_prop("input", Some("button"), "value"));
        assert!(must_use_prop("progress", None, "value"));
        assert!(!must_use_prop("div", None, "value"));
        assert!(must_use_prop("option", None, "selected"));
        assert!(must_use_prop("input", Some("checkbox"), "checked"));
        assert!(!must_use_prop("select", None, "checked"));
        assert!(must_use_prop("video", None, "muted"));
        assert!(!must_use_prop("audio", None, "muted"));
        assert!(!must_use_prop("input", None, "title"));
    }

    #[test]
    fn test_base_options() {
        let options = base_options();
        assert_eq!(options.modules.len(), 2);
        assert_eq!(options.static_keys, "staticClass");
        assert_eq!(options.directives.names(), vec!["html", "text"]);
        assert!((options.must_use_prop)("textarea", None, "value"));
    }
}
