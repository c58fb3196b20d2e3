//! Duotone SVG icon rendering.
//!
//! An [`IconDefinition`] is an ordered list of `(tag, attributes)` nodes in the
//! icon-library JSON shape. [`render_icon`] turns one into an `svg` [`Element`]
//! tree, applying colour, stroke-width and opacity overrides per node. Rendering
//! never fails and never validates tag names.

pub mod library;

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::render::{is_markup_name, Element};

pub use library::{IconEntry, IconLibrary};

/// The placeholder paint value that colour overrides are allowed to replace.
pub const CURRENT_COLOR: &str = "currentColor";
pub const DEFAULT_SIZE: u32 = 24;
pub const VIEW_BOX: &str = "0 0 24 24";

const SECONDARY_MARKER: &str = "data-secondary";

/// SVG attributes that are camelCase in the SVG vocabulary itself.
const CAMEL_CASE_ATTRIBUTES: &[&str] = &[
    "viewBox",
    "preserveAspectRatio",
    "gradientUnits",
    "gradientTransform",
    "patternUnits",
    "patternTransform",
    "clipPathUnits",
    "maskUnits",
    "markerWidth",
    "markerHeight",
    "refX",
    "refY",
    "pathLength",
    "spreadMethod",
    "stdDeviation",
];

const NAMESPACE_PREFIXES: &[&str] = &["xmlns", "xlink", "xml"];

#[derive(Debug, Error)]
pub enum IconError {
    #[error("invalid icon JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("attribute {name} on <{tag}> must be a string, number or boolean")]
    InvalidAttribute { tag: String, name: String },
    #[error("{0:?} is not a valid tag or attribute name")]
    InvalidName(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl AttrValue {
    #[must_use]
    pub fn is_current_color(&self) -> bool {
        matches!(self, Self::Text(text) if text == CURRENT_COLOR)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Presentation attributes of one icon node.
///
/// The paint, width and opacity attributes the renderer rewrites get their own
/// fields; everything else is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconAttrs {
    pub stroke: Option<AttrValue>,
    pub fill: Option<AttrValue>,
    pub stroke_width: Option<AttrValue>,
    pub fill_opacity: Option<AttrValue>,
    pub stroke_opacity: Option<AttrValue>,
    /// Value of `data-secondary` when it was given as a string.
    pub secondary: Option<String>,
    pub extra: Vec<(String, AttrValue)>,
}

impl IconAttrs {
    /// Store an attribute, normalising a camelCase name to its SVG spelling.
    pub fn set(&mut self, name: &str, value: AttrValue) {
        let name = svg_attribute_name(name);
        let field = match name.as_str() {
            "stroke" => Some(&mut self.stroke),
            "fill" => Some(&mut self.fill),
            "stroke-width" => Some(&mut self.stroke_width),
            "fill-opacity" => Some(&mut self.fill_opacity),
            "stroke-opacity" => Some(&mut self.stroke_opacity),
            _ => None,
        };
        if let Some(field) = field {
            *field = Some(value);
            return;
        }

        if let (SECONDARY_MARKER, AttrValue::Text(marker)) = (name.as_str(), &value) {
            self.secondary = Some(marker.clone());
            return;
        }

        if let Some(slot) = self.extra.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.extra.push((name, value));
        }
    }

    #[must_use]
    pub const fn is_secondary(&self) -> bool {
        self.secondary.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct IconNode {
    pub tag: String,
    pub attrs: IconAttrs,
}

impl IconNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IconAttrs::default(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value.into());
        self
    }
}

#[derive(Deserialize)]
struct RawNode(String, serde_json::Map<String, Value>);

impl TryFrom<RawNode> for IconNode {
    type Error = IconError;

    fn try_from(RawNode(tag, raw): RawNode) -> Result<Self, Self::Error> {
        if !is_markup_name(&tag) {
            return Err(IconError::InvalidName(tag));
        }
        let mut attrs = IconAttrs::default();
        for (name, value) in raw {
            if !is_markup_name(&name) {
                return Err(IconError::InvalidName(name));
            }
            let value = match value {
                Value::Null => continue,
                Value::String(text) => AttrValue::Text(text),
                Value::Bool(flag) => AttrValue::Bool(flag),
                Value::Number(number) => match number.as_f64() {
                    Some(number) => AttrValue::Number(number),
                    None => return Err(IconError::InvalidAttribute { tag, name }),
                },
                Value::Array(_) | Value::Object(_) => {
                    return Err(IconError::InvalidAttribute { tag, name });
                }
            };
            attrs.set(&name, value);
        }
        Ok(Self { tag, attrs })
    }
}

/// An ordered list of icon nodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct IconDefinition(pub Vec<IconNode>);

impl IconDefinition {
    /// Parse a definition from icon-library JSON.
    ///
    /// # Errors
    /// Returns `IconError` if the JSON is not a list of `[tag, attributes]` pairs.
    pub fn from_json(json: &str) -> Result<Self, IconError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn nodes(&self) -> &[IconNode] {
        &self.0
    }
}

impl FromIterator<IconNode> for IconDefinition {
    fn from_iter<I: IntoIterator<Item = IconNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Inputs of [`render_icon`].
#[derive(Debug, Clone)]
pub struct IconProps<'a> {
    pub icon: &'a IconDefinition,
    pub alt_icon: Option<&'a IconDefinition>,
    pub show_alt: bool,
    pub size: u32,
    pub color: String,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub disable_secondary_opacity: bool,
    pub stroke_width: Option<f64>,
    pub class: Option<String>,
    /// CSS declarations merged after the `color` declaration.
    pub style: Vec<(String, String)>,
    /// Extra root attributes; these win over the computed ones.
    pub attributes: Vec<(String, String)>,
}

impl<'a> IconProps<'a> {
    #[must_use]
    pub fn new(icon: &'a IconDefinition) -> Self {
        Self {
            icon,
            alt_icon: None,
            show_alt: false,
            size: DEFAULT_SIZE,
            color: CURRENT_COLOR.to_string(),
            primary_color: None,
            secondary_color: None,
            disable_secondary_opacity: false,
            stroke_width: None,
            class: None,
            style: Vec::new(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn alt_icon(mut self, alt_icon: &'a IconDefinition) -> Self {
        self.alt_icon = Some(alt_icon);
        self
    }

    #[must_use]
    pub fn show_alt(mut self, show_alt: bool) -> Self {
        self.show_alt = show_alt;
        self
    }

    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn secondary_color(mut self, color: impl Into<String>) -> Self {
        self.secondary_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn disable_secondary_opacity(mut self, disable: bool) -> Self {
        self.disable_secondary_opacity = disable;
        self
    }

    #[must_use]
    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.push((property.into(), value.into()));
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// The definition that will be rendered.
    #[must_use]
    pub fn selected(&self) -> &'a IconDefinition {
        match self.alt_icon {
            Some(alt) if self.show_alt => alt,
            _ => self.icon,
        }
    }
}

/// Pick the override colour for a node, if any.
#[must_use]
pub fn resolve_color<'c>(
    primary: Option<&'c str>,
    secondary: Option<&'c str>,
    is_secondary: bool,
) -> Option<&'c str> {
    match (primary, secondary) {
        (None, None) => None,
        (_, Some(secondary)) if is_secondary => Some(secondary),
        (primary, _) => primary,
    }
}

/// Render `props` into an `svg` element tree.
#[must_use]
pub fn render_icon(props: &IconProps<'_>) -> Element {
    let size = props.size.to_string();
    let mut root = Element::new("svg")
        .with_attr("width", size.as_str())
        .with_attr("height", size)
        .with_attr("viewBox", VIEW_BOX)
        .with_attr("fill", "none");

    if let Some(class) = &props.class {
        root.set_attr("class", class.as_str());
    }
    root.set_attr("style", style_attribute(&props.color, &props.style));

    for (name, value) in &props.attributes {
        root.set_attr(name.as_str(), value.as_str());
    }

    for node in props.selected().nodes() {
        root.push_child(render_node(node, props));
    }
    root
}

fn style_attribute(color: &str, style: &[(String, String)]) -> String {
    let mut declarations: Vec<(&str, &str)> = vec![("color", color)];
    for (property, value) in style {
        if let Some(slot) = declarations
            .iter_mut()
            .find(|(key, _)| *key == property.as_str())
        {
            slot.1 = value.as_str();
        } else {
            declarations.push((property.as_str(), value.as_str()));
        }
    }
    declarations
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_node(node: &IconNode, props: &IconProps<'_>) -> Element {
    let attrs = &node.attrs;
    let resolved = resolve_color(
        props.primary_color.as_deref(),
        props.secondary_color.as_deref(),
        attrs.is_secondary(),
    );
    let paint = |value: &Option<AttrValue>| match (resolved, value) {
        (Some(color), Some(current)) if current.is_current_color() => {
            Some(AttrValue::from(color))
        }
        _ => value.clone(),
    };
    let opacity = |value: &Option<AttrValue>| {
        if props.disable_secondary_opacity && value.is_some() {
            Some(AttrValue::Number(1.0))
        } else {
            value.clone()
        }
    };

    let stroke_width = props
        .stroke_width
        .map(AttrValue::Number)
        .or_else(|| attrs.stroke_width.clone());

    let mut element = Element::new(node.tag.as_str());
    let computed = [
        ("stroke", paint(&attrs.stroke)),
        ("fill", paint(&attrs.fill)),
        ("stroke-width", stroke_width),
        ("fill-opacity", opacity(&attrs.fill_opacity)),
        ("stroke-opacity", opacity(&attrs.stroke_opacity)),
    ];
    for (name, value) in computed {
        if let Some(value) = value {
            element.set_attr(name, value.to_string());
        }
    }
    if let Some(marker) = &attrs.secondary {
        element.set_attr(SECONDARY_MARKER, marker.as_str());
    }
    for (name, value) in &attrs.extra {
        element.set_attr(name.as_str(), value.to_string());
    }
    element
}

/// Map a camelCase prop name to its SVG attribute name.
#[must_use]
pub fn svg_attribute_name(name: &str) -> String {
    if name == "className" {
        return "class".to_string();
    }
    if CAMEL_CASE_ATTRIBUTES.contains(&name) || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return name.to_string();
    }
    // `xlinkHref` -> `xlink:href`; `xmlns` is checked before `xml`.
    for prefix in NAMESPACE_PREFIXES {
        if let Some(local) = name.strip_prefix(prefix) {
            if local.starts_with(|c: char| c.is_ascii_uppercase()) {
                return format!("{prefix}:{}", local.to_ascii_lowercase());
            }
        }
    }

    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
