//! Boundary storage on the attributes of a markup element.
//!
//! The element is owned by the caller (typically whoever assembles the
//! document) and shared with the store through an [`ElementRef`]. Each
//! boundary is one attribute holding a decimal integer:
//!
//! ```text
//! <category left="1" level="1" right="2"/>
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::domain::error::{NestError, NestResult};
use crate::domain::store::{Boundary, BoundaryStore};

/// Shared handle to an element.
pub type ElementRef = Rc<RefCell<Element>>;

/// A single markup element: a tag name and its ordered attributes.
///
/// Attribute order is insertion order, so rendering is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Creates an element and wraps it into a shared handle.
    pub fn shared(name: impl Into<String>) -> ElementRef {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Sets an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(idx).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new("root")
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (k, v) in &self.attributes {
            write!(f, " {}=\"{}\"", k, escape_attribute(v))?;
        }
        f.write_str("/>")
    }
}

/// Boundaries kept as attributes of an [`Element`].
///
/// `Default` binds a fresh `<root left="0" level="0" right="1"/>`, matching
/// the eager defaults of [`FieldBounds`](crate::domain::FieldBounds).
#[derive(Debug, Clone)]
pub struct MarkupBounds {
    element: Option<ElementRef>,
}

impl MarkupBounds {
    /// Binds the store to an existing element. Attributes already present
    /// on the element are used as is.
    pub fn new(element: ElementRef) -> Self {
        Self {
            element: Some(element),
        }
    }

    /// A store bound to a fresh `<root/>` carrying no attributes yet.
    pub fn with_empty_root() -> Self {
        Self::new(Element::shared("root"))
    }

    /// A store with no element. Every access fails with
    /// [`NestError::UnboundStorage`] until [`set_element`](Self::set_element).
    pub fn unbound() -> Self {
        Self { element: None }
    }

    /// Binds an element; `None` binds a fresh, empty `<root/>`.
    pub fn set_element(&mut self, element: Option<ElementRef>) -> &mut Self {
        self.element = Some(element.unwrap_or_else(|| Element::shared("root")));
        self
    }

    /// Returns the bound element.
    pub fn element(&self) -> NestResult<ElementRef> {
        self.element.clone().ok_or(NestError::UnboundStorage)
    }

    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    /// Renders the bound element.
    pub fn as_markup(&self) -> NestResult<String> {
        Ok(self.element()?.borrow().to_string())
    }
}

impl Default for MarkupBounds {
    fn default() -> Self {
        let element = Element::shared("root");
        element
            .borrow_mut()
            .set_attribute("left", "0")
            .set_attribute("level", "0")
            .set_attribute("right", "1");
        Self::new(element)
    }
}

impl BoundaryStore for MarkupBounds {
    fn read(&self, boundary: Boundary) -> NestResult<i64> {
        let element = self.element.as_ref().ok_or(NestError::UnboundStorage)?;
        let element = element.borrow();
        let raw = element
            .attribute(boundary.as_str())
            .ok_or(NestError::UnsetProperty(boundary))?;
        raw.trim()
            .parse()
            .map_err(|_| NestError::MalformedAttribute {
                name: boundary.as_str().to_string(),
                value: raw.to_string(),
            })
    }

    fn write(&mut self, boundary: Boundary, value: i64) -> NestResult<()> {
        let element = self.element.as_ref().ok_or(NestError::UnboundStorage)?;
        trace!(attribute = boundary.as_str(), value, "write attribute");
        element
            .borrow_mut()
            .set_attribute(boundary.as_str(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_renders_attributes_in_insertion_order() {
        let mut e = Element::new("category");
        e.set_attribute("left", "1")
            .set_attribute("right", "2")
            .set_attribute("left", "3");
        assert_eq!(e.to_string(), r#"<category left="3" right="2"/>"#);
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut e = Element::new("n");
        e.set_attribute("title", r#"a<b & "c""#);
        assert_eq!(e.to_string(), r#"<n title="a&lt;b &amp; &quot;c&quot;"/>"#);
    }

    #[test]
    fn writes_go_through_to_the_shared_element() {
        let element = Element::shared("node");
        let mut store = MarkupBounds::new(Rc::clone(&element));
        store.write(Boundary::Left, 10).unwrap();
        assert_eq!(element.borrow().attribute("left"), Some("10"));
        assert_eq!(store.read(Boundary::Left).unwrap(), 10);
    }

    #[test]
    fn unbound_store_fails() {
        let mut store = MarkupBounds::unbound();
        assert_eq!(store.read(Boundary::Left), Err(NestError::UnboundStorage));
        assert_eq!(store.write(Boundary::Left, 1), Err(NestError::UnboundStorage));
        store.set_element(None);
        assert_eq!(
            store.read(Boundary::Left),
            Err(NestError::UnsetProperty(Boundary::Left))
        );
        assert_eq!(store.as_markup().unwrap(), "<root/>");
    }

    #[test]
    fn malformed_attribute_is_reported() {
        let element = Element::shared("node");
        element.borrow_mut().set_attribute("level", "deep");
        let store = MarkupBounds::new(element);
        assert!(matches!(
            store.read(Boundary::Level),
            Err(NestError::MalformedAttribute { .. })
        ));
    }
}
