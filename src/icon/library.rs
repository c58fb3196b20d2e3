use std::collections::BTreeMap;

use serde::Deserialize;

use super::{IconDefinition, IconError};

const BUILTIN_ICONS: &str = include_str!("../../assets/icons.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconEntry {
    pub icon: IconDefinition,
    #[serde(default)]
    pub alt: Option<IconDefinition>,
}

/// Named icon definitions, sorted by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct IconLibrary {
    icons: BTreeMap<String, IconEntry>,
}

impl IconLibrary {
    /// Parse the icons bundled with the crate.
    ///
    /// # Errors
    /// Returns `IconError` if the bundled JSON is malformed.
    pub fn builtin() -> Result<Self, IconError> {
        Self::from_json(BUILTIN_ICONS)
    }

    /// # Errors
    /// Returns `IconError` if `json` is not a map of name to `{ icon, alt? }`.
    pub fn from_json(json: &str) -> Result<Self, IconError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IconEntry> {
        self.icons.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IconEntry)> {
        self.icons.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{render_icon, IconProps};

    #[test]
    fn builtin_library_parses() {
        let library = IconLibrary::builtin().unwrap();
        assert!(!library.is_empty());
        let names: Vec<_> = library.iter().map(|(name, _)| name).collect();
        assert!(names.contains(&"shopping-cart"));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn builtin_icons_carry_a_secondary_layer() {
        let library = IconLibrary::builtin().unwrap();
        for (name, entry) in library.iter() {
            assert!(
                entry.icon.nodes().iter().any(|node| node.attrs.is_secondary()),
                "{name} has no secondary layer"
            );
        }
    }

    #[test]
    fn cart_alternate_renders_without_secondary_layer() {
        let library = IconLibrary::builtin().unwrap();
        let cart = library.get("shopping-cart").unwrap();
        let alt = cart.alt.as_ref().unwrap();

        let svg = render_icon(
            &IconProps::new(&cart.icon)
                .alt_icon(alt)
                .show_alt(true)
                .secondary_color("orange"),
        );
        assert_eq!(svg.children.len(), alt.nodes().len());
        assert!(svg.children.iter().all(|c| c.attr("data-secondary").is_none()));
    }

    #[test]
    fn entries_without_alt_default_to_none() {
        let library =
            IconLibrary::from_json(r#"{"dot": {"icon": [["circle", {"r": 1}]]}}"#).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.get("dot").unwrap().alt.is_none());
        assert!(library.get("missing").is_none());
    }
}
