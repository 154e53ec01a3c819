//! Minimal in-memory XML element tree.
//!
//! An [`Element`] has a name, an ordered list of attributes, an ordered list of
//! child elements and a text payload. Parsing and printing are left to whatever
//! XML library the caller already uses; this crate only models the document.

/// A single XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Create an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Get an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, replacing an existing value with the same name.
    /// New attributes are appended, so document order is insertion order.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Iterate over attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[inline]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// All child elements in document order.
    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Number of child elements.
    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Child element by index.
    pub fn child_at(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Append a child element and return a reference to it.
    pub fn append_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Text content of the element.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// True if the element has no attributes, children or text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_empty()
    }
}
