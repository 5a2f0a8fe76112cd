use crate::ast::AttrBinding;
use crate::ast::DirectiveBinding;
use crate::ast::Element;
use crate::diagnostics::DiagnosticSink;
use crate::filters::TO_DISPLAY_STRING;
use crate::options::DirectiveHandler;

fn add_display_prop(el: &mut Element, prop: &str, dir: &DirectiveBinding) {
    if dir.value.is_empty() {
        return;
    }
    el.props.push(AttrBinding {
        name: prop.to_string(),
        value: format!("{TO_DISPLAY_STRING}({})", dir.value),
        dynamic: false,
        span: dir.span,
    });
}

/// `v-text`: sets `textContent` at compile time.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDirective;

impl DirectiveHandler for TextDirective {
    fn apply(
        &self,
        el: &mut Element,
        dir: &DirectiveBinding,
        _sink: &mut dyn DiagnosticSink,
    ) -> bool {
        add_display_prop(el, "textContent", dir);
        false
    }
}

/// `v-html`: sets `innerHTML` at compile time.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlDirective;

impl DirectiveHandler for HtmlDirective {
    fn apply(
        &self,
        el: &mut Element,
        dir: &DirectiveBinding,
        _sink: &mut dyn DiagnosticSink,
    ) -> bool {
        add_display_prop(el, "innerHTML", dir);
        false
    }
}
