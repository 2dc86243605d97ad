//! Markup parsing.
//!
//! Parses the markup the engine generates (and the initial `content` strings
//! carried by serialized nodes) into a tree. This is not a general HTML
//! parser; it covers the subset the builder produces: elements, text,
//! quoted/unquoted/bare attributes, self-closing and void tags, comments.

use indexmap::IndexMap;

/// One parsed markup node.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element {
        /// Tag name with its original casing preserved, so widget identity
        /// can be matched case-insensitively downstream
        tag: String,
        /// `None` values are bare attributes
        attributes: IndexMap<String, Option<String>>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

impl MarkupNode {
    /// Tag name if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            MarkupNode::Element { tag, .. } => Some(tag),
            MarkupNode::Text(_) => None,
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

/// Parse markup into a list of top-level nodes.
///
/// Recovery rules: unknown closing tags are ignored, unclosed elements are
/// closed at end of input, and a mismatched closing tag closes every element
/// down to the matching open one.
pub fn parse_markup(input: &str) -> Vec<MarkupNode> {
    Parser::new(input).run()
}

struct Frame {
    tag: String,
    attributes: IndexMap<String, Option<String>>,
    children: Vec<MarkupNode>,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Frame>,
    top_level: Vec<MarkupNode>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            top_level: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<MarkupNode> {
        while self.pos < self.input.len() {
            if self.rest().starts_with("<!--") {
                self.skip_comment();
            } else if self.rest().starts_with("<!") {
                self.skip_until('>');
            } else if self.rest().starts_with("</") {
                self.close_tag();
            } else if self.peek_is_open_tag() {
                self.open_tag();
            } else {
                self.text();
            }
        }

        // close anything left open at end of input
        while let Some(frame) = self.stack.pop() {
            self.finish_frame(frame);
        }

        self.top_level
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_is_open_tag(&self) -> bool {
        let rest = self.rest();
        rest.starts_with('<')
            && rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn skip_comment(&mut self) {
        match self.rest().find("-->") {
            Some(end) => self.pos += end + 3,
            None => self.pos = self.input.len(),
        }
    }

    fn skip_until(&mut self, ch: char) {
        match self.rest().find(ch) {
            Some(end) => self.pos += end + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn text(&mut self) {
        let end = match self.rest().find('<') {
            // a lone '<' that opens nothing: consume it as text
            Some(0) => 1,
            Some(end) => end,
            None => self.rest().len(),
        };
        let raw = &self.rest()[..end];
        self.pos += end;

        if !raw.trim().is_empty() {
            let decoded = html_escape::decode_html_entities(raw).into_owned();
            self.push_node(MarkupNode::Text(decoded));
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1; // consume '<'
        let tag = self.read_name();
        let mut attributes = IndexMap::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let Some(ch) = self.rest().chars().next() else {
                break;
            };
            match ch {
                '>' => {
                    self.pos += 1;
                    break;
                }
                '/' => {
                    self.pos += 1;
                    if self.rest().starts_with('>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                _ => {
                    let name = self.read_attr_name();
                    if name.is_empty() {
                        // stray character, skip it to guarantee progress
                        self.pos += ch.len_utf8();
                        continue;
                    }
                    self.skip_whitespace();
                    if self.rest().starts_with('=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        let value = self.read_attr_value();
                        attributes.insert(name, Some(value));
                    } else {
                        attributes.insert(name, None);
                    }
                }
            }
        }

        if self_closing || is_void(&tag) {
            self.push_node(MarkupNode::Element {
                tag,
                attributes,
                children: Vec::new(),
            });
        } else {
            self.stack.push(Frame {
                tag,
                attributes,
                children: Vec::new(),
            });
        }
    }

    fn close_tag(&mut self) {
        self.pos += 2; // consume "</"
        let name = self.read_name();
        self.skip_until('>');

        let matches_open = self
            .stack
            .iter()
            .rposition(|f| f.tag.eq_ignore_ascii_case(&name));
        let Some(index) = matches_open else {
            return; // closing tag with no matching open: ignore
        };

        while self.stack.len() > index {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            self.finish_frame(frame);
        }
    }

    fn finish_frame(&mut self, frame: Frame) {
        self.push_node(MarkupNode::Element {
            tag: frame.tag,
            attributes: frame.attributes,
            children: frame.children,
        });
    }

    fn push_node(&mut self, node: MarkupNode) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.top_level.push(node),
        }
    }

    fn read_name(&mut self) -> String {
        let end = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(self.rest().len());
        let name = self.rest()[..end].to_string();
        self.pos += end;
        name
    }

    fn read_attr_name(&mut self) -> String {
        let end = self
            .rest()
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(self.rest().len());
        let name = self.rest()[..end].to_string();
        self.pos += end;
        name
    }

    fn read_attr_value(&mut self) -> String {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            let end = body.find(quote).unwrap_or(body.len());
            let value = &body[..end];
            self.pos += 1 + end + 1;
            html_escape::decode_html_entities(value).into_owned()
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(rest.len());
            let value = &rest[..end];
            self.pos += end;
            html_escape::decode_html_entities(value).into_owned()
        }
    }

    fn skip_whitespace(&mut self) {
        let end = self
            .rest()
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(self.rest().len());
        self.pos += end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(node: &MarkupNode) -> (&str, &IndexMap<String, Option<String>>, &[MarkupNode]) {
        match node {
            MarkupNode::Element {
                tag,
                attributes,
                children,
            } => (tag, attributes, children),
            MarkupNode::Text(t) => panic!("expected element, got text {t:?}"),
        }
    }

    #[test]
    fn parses_nested_elements_with_attributes() {
        let nodes = parse_markup(r#"<div id="iy6y"><reactflex gap="4" wrap><span>hi</span></reactflex></div>"#);

        assert_eq!(nodes.len(), 1);
        let (tag, attrs, children) = element(&nodes[0]);
        assert_eq!(tag, "div");
        assert_eq!(attrs.get("id"), Some(&Some("iy6y".to_string())));

        let (tag, attrs, children) = element(&children[0]);
        assert_eq!(tag, "reactflex");
        assert_eq!(attrs.get("gap"), Some(&Some("4".to_string())));
        // bare attribute: present with no value
        assert_eq!(attrs.get("wrap"), Some(&None));

        let (tag, _, children) = element(&children[0]);
        assert_eq!(tag, "span");
        assert_eq!(children[0], MarkupNode::Text("hi".to_string()));
    }

    #[test]
    fn preserves_tag_casing() {
        let nodes = parse_markup("<REACTBUTTON variant=\"primary\"></REACTBUTTON>");
        let (tag, _, _) = element(&nodes[0]);
        assert_eq!(tag, "REACTBUTTON");
    }

    #[test]
    fn handles_self_closing_and_void_tags() {
        let nodes = parse_markup(r#"<reactbutton variant="outline"/><br><img src="x.png">"#);

        assert_eq!(nodes.len(), 3);
        let (tag, attrs, children) = element(&nodes[0]);
        assert_eq!(tag, "reactbutton");
        assert_eq!(attrs.get("variant"), Some(&Some("outline".to_string())));
        assert!(children.is_empty());
    }

    #[test]
    fn ignores_comments_and_stray_close_tags() {
        let nodes = parse_markup("<!-- note --></p><div>ok</div>");

        assert_eq!(nodes.len(), 1);
        let (tag, _, children) = element(&nodes[0]);
        assert_eq!(tag, "div");
        assert_eq!(children[0], MarkupNode::Text("ok".to_string()));
    }

    #[test]
    fn closes_unclosed_elements_at_end_of_input() {
        let nodes = parse_markup("<div><span>dangling");

        let (tag, _, children) = element(&nodes[0]);
        assert_eq!(tag, "div");
        let (tag, _, children) = element(&children[0]);
        assert_eq!(tag, "span");
        assert_eq!(children[0], MarkupNode::Text("dangling".to_string()));
    }

    #[test]
    fn decodes_entities_in_text_and_attributes() {
        let nodes = parse_markup(r#"<div title="a &amp; b">x &lt; y</div>"#);

        let (_, attrs, children) = element(&nodes[0]);
        assert_eq!(attrs.get("title"), Some(&Some("a & b".to_string())));
        assert_eq!(children[0], MarkupNode::Text("x < y".to_string()));
    }

    #[test]
    fn closing_tag_matches_case_insensitively() {
        let nodes = parse_markup("<ReactFlex><span>a</span></REACTFLEX>");

        let (tag, _, children) = element(&nodes[0]);
        assert_eq!(tag, "ReactFlex");
        assert_eq!(children.len(), 1);
    }
}
