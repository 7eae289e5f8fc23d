//! Renders a configurator tool to static HTML: header with the copy-link button,
//! one collapsible section per panel, and the preview section holding the block link.
//! No script and no inline handlers; the host page wires events.

use configurator_schema::{FieldControl, FormState, OptionSet, Panel};

use crate::preview::MarkerElement;

/// Everything the tool page shows at one point in time.
pub struct ToolView<'a> {
    pub title: &'a str,
    pub panels: &'a [Panel],
    pub state: &'a FormState,
    /// Current share link, if one could be built.
    pub link: Option<&'a str>,
    /// Element currently in the preview slot.
    pub marker: Option<&'a MarkerElement>,
}

pub fn render_tool_html(view: &ToolView<'_>) -> String {
    let mut out = String::new();

    out.push_str("<div class=\"tool-header\"><div class=\"tool-title\">");
    out.push_str(&format!("<h1>{}</h1></div>", escape_html(view.title)));
    let link_attr = view
        .link
        .map(|l| format!(" data-link=\"{}\"", escape_html(l)))
        .unwrap_or_default();
    let disabled_attr = if view.link.is_none() { " disabled" } else { "" };
    out.push_str(&format!(
        "<button class=\"copy-link\" type=\"button\"{}{}>Copy link</button></div>",
        link_attr, disabled_attr
    ));

    out.push_str("<div class=\"tool-content\"><div class=\"config-panel\"><div class=\"accordion\">");
    for panel in view.panels {
        render_panel(panel, view.state, &mut out);
    }
    out.push_str("</div></div>");

    out.push_str("<div class=\"content-panel\"><div class=\"section\">");
    if let Some(marker) = view.marker {
        out.push_str(&marker.to_html());
    }
    out.push_str("</div></div></div>");

    out
}

fn render_panel(panel: &Panel, state: &FormState, out: &mut String) {
    out.push_str(&format!(
        "<details class=\"accordion-item\"><summary>{}</summary><div class=\"accordion-body\">",
        escape_html(&panel.title)
    ));
    for control in &panel.fields {
        let value = state.get(control.prop()).map(String::as_str).unwrap_or("");
        render_control(control, value, out);
    }
    out.push_str("</div></details>");
}

fn render_control(control: &FieldControl, value: &str, out: &mut String) {
    out.push_str(&format!(
        "<div class=\"field\"><label>{}",
        escape_html(control.label())
    ));
    match control {
        FieldControl::Text { prop, .. } => {
            out.push_str(&format!(
                "<input type=\"text\" name=\"{}\" value=\"{}\">",
                escape_html(prop),
                escape_html(value)
            ));
        }
        FieldControl::Choice { prop, options, .. } => {
            out.push_str(&format!("<select name=\"{}\">", escape_html(prop)));
            render_options(options, value, out);
            out.push_str("</select>");
        }
    }
    out.push_str("</label></div>");
}

fn render_options(options: &OptionSet, value: &str, out: &mut String) {
    // Keep the control honest when the state holds no listed value (e.g. no default).
    if !options.contains_value(value) {
        out.push_str(&format!(
            "<option value=\"{}\" selected></option>",
            escape_html(value)
        ));
    }
    for opt in options.iter() {
        let sel_attr = if opt.value == value { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(&opt.value),
            sel_attr,
            escape_html(&opt.label)
        ));
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
