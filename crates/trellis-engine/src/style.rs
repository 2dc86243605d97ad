//! Stylesheet text generation from project style rules.

use crate::project::{SelectorEntry, StyleRule};

/// Render the project's style rules to stylesheet text.
pub fn render_css(rules: &[StyleRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        if rule.style.is_empty() {
            continue;
        }
        let selector = selector_text(rule);
        if selector.is_empty() {
            continue;
        }

        let mut body = String::new();
        body.push_str(&selector);
        body.push_str(" {\n");
        for (property, value) in &rule.style {
            body.push_str("  ");
            body.push_str(property);
            body.push_str(": ");
            body.push_str(value);
            body.push_str(";\n");
        }
        body.push_str("}\n");

        match &rule.media {
            Some(media) if !media.is_empty() => {
                out.push_str("@media ");
                out.push_str(media);
                out.push_str(" {\n");
                out.push_str(&body);
                out.push_str("}\n");
            }
            _ => out.push_str(&body),
        }
    }
    out
}

fn selector_text(rule: &StyleRule) -> String {
    let mut parts: Vec<String> = rule
        .selectors
        .iter()
        .map(|entry| match entry {
            // raw selector strings are authored in full and used verbatim
            SelectorEntry::Raw(raw) => raw.clone(),
            SelectorEntry::Class { name } => format!(".{name}"),
        })
        .collect();

    if let Some(state) = rule.state.as_deref().filter(|s| !s.is_empty()) {
        for part in &mut parts {
            part.push(':');
            part.push_str(state);
        }
    }

    parts.join(", ")
}
