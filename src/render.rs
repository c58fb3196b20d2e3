use std::fmt::{self, Write};

/// A markup element: a tag, its attributes in insertion order, and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Serialize the tree. Elements without children are self-closed.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        push_html(out, format_args!("<{}", self.tag));
        for (name, value) in self.attrs.iter().filter(|(name, _)| is_markup_name(name)) {
            push_html(out, format_args!(" {name}=\"{}\"", escape_html(value)));
        }

        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_markup(out);
        }
        push_html(out, format_args!("</{}>", self.tag));
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Whether `name` can be written as a tag or attribute name without quoting.
#[must_use]
pub fn is_markup_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|ch| {
            !ch.is_whitespace() && !ch.is_control() && !matches!(ch, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

#[must_use]
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn push_html(buf: &mut String, args: fmt::Arguments<'_>) {
    buf.write_fmt(args)
        .expect("writing to String should not fail");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_elements_self_close() {
        let el = Element::new("path").with_attr("d", "M0 0L1 1");
        assert_eq!(el.to_markup(), "<path d=\"M0 0L1 1\" />");
    }

    #[test]
    fn children_render_in_order() {
        let mut root = Element::new("g");
        root.push_child(Element::new("circle").with_attr("r", "2"));
        root.push_child(Element::new("rect"));
        assert_eq!(root.to_markup(), "<g><circle r=\"2\" /><rect /></g>");
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = Element::new("svg").with_attr("width", "24").with_attr("height", "24");
        el.set_attr("width", "48");
        assert_eq!(
            el.attrs,
            vec![
                ("width".to_string(), "48".to_string()),
                ("height".to_string(), "24".to_string())
            ]
        );
        assert_eq!(el.attr("width"), Some("48"));
        assert_eq!(el.attr("fill"), None);
    }

    #[test]
    fn unwritable_attribute_names_are_skipped() {
        let el = Element::new("path")
            .with_attr("d", "M0")
            .with_attr("x\" onload=\"y", "1")
            .with_attr("a b", "2");
        assert_eq!(el.to_markup(), "<path d=\"M0\" />");
        assert!(is_markup_name("xlink:href"));
        assert!(is_markup_name("data-secondary"));
        assert!(!is_markup_name(""));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let el = Element::new("text").with_attr("title", "<a & \"b\">");
        assert_eq!(
            el.to_string(),
            "<text title=\"&lt;a &amp; &quot;b&quot;&gt;\" />"
        );
    }
}
