use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::foundation::core::{ElementId, PropValue, Property, Rect};

/// Resolved element list; most targets address a handful of elements.
pub type Elements = SmallVec<[ElementId; 4]>;

/// Opaque handle to one or more addressable visual elements.
///
/// In JSON a target is a bare element id, an array of ids, or a selector string.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum VisualTarget {
    /// A single element.
    Element(ElementId),
    /// An ordered group of elements; order defines stagger order.
    Collection(Vec<ElementId>),
    /// `#name` or `.class`, resolved against the render tree at evaluation time.
    Selector(String),
}

impl VisualTarget {
    /// Shorthand for [`VisualTarget::Selector`].
    pub fn selector(s: impl Into<String>) -> Self {
        Self::Selector(s.into())
    }
}

/// Boundary to the host view layer.
///
/// The orchestration system reads geometry and writes animated properties through this
/// trait and nothing else. A target that resolves to no elements is a normal outcome
/// (the element unmounted before the tick) and callers skip the work.
pub trait RenderTree {
    /// Resolve `target` to the currently mounted elements, in document order.
    fn resolve(&self, target: &VisualTarget) -> Elements;

    /// Document-space bounds of a mounted element.
    fn geometry(&self, id: ElementId) -> Option<Rect>;

    /// Write one property. Returns `false` when the element is gone.
    fn set_property(&mut self, id: ElementId, prop: &Property, value: &PropValue) -> bool;

    /// Bounds of the first element `target` resolves to.
    fn first_rect(&self, target: &VisualTarget) -> Option<Rect> {
        self.resolve(target)
            .first()
            .and_then(|id| self.geometry(*id))
    }
}

#[derive(Clone, Debug)]
struct SceneElement {
    name: String,
    classes: Vec<String>,
    rect: Rect,
    mounted: bool,
    props: BTreeMap<Property, PropValue>,
    writes: u64,
}

/// In-memory render tree used by tests and the preview CLI.
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    elements: BTreeMap<ElementId, SceneElement>,
    next: u64,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a new element and return its id.
    pub fn insert(&mut self, name: impl Into<String>, classes: &[&str], rect: Rect) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        self.elements.insert(
            id,
            SceneElement {
                name: name.into(),
                classes: classes.iter().map(|c| (*c).to_owned()).collect(),
                rect,
                mounted: true,
                props: BTreeMap::new(),
                writes: 0,
            },
        );
        id
    }

    /// Unmount an element; its last property values stay readable.
    pub fn unmount(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.mounted = false;
        }
    }

    pub fn remount(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.mounted = true;
        }
    }

    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.rect = rect;
        }
    }

    pub fn property(&self, id: ElementId, prop: &Property) -> Option<&PropValue> {
        self.elements.get(&id).and_then(|el| el.props.get(prop))
    }

    /// Numeric property value, if set.
    pub fn number(&self, id: ElementId, prop: &Property) -> Option<f64> {
        self.property(id, prop).and_then(PropValue::as_f64)
    }

    /// Number of property writes this element has received.
    pub fn writes(&self, id: ElementId) -> u64 {
        self.elements.get(&id).map(|el| el.writes).unwrap_or(0)
    }

    pub fn total_writes(&self) -> u64 {
        self.elements.values().map(|el| el.writes).sum()
    }

    /// Find an element by name.
    pub fn by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, el)| el.name == name)
            .map(|(id, _)| *id)
    }

    /// Current property values keyed by element name.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<Property, PropValue>> {
        self.elements
            .values()
            .filter(|el| !el.props.is_empty())
            .map(|el| (el.name.clone(), el.props.clone()))
            .collect()
    }

    fn matches(el: &SceneElement, selector: &str) -> bool {
        if let Some(name) = selector.strip_prefix('#') {
            el.name == name
        } else if let Some(class) = selector.strip_prefix('.') {
            el.classes.iter().any(|c| c == class)
        } else {
            el.name == selector
        }
    }
}

impl RenderTree for SceneTree {
    fn resolve(&self, target: &VisualTarget) -> Elements {
        let mounted = |id: &ElementId| self.elements.get(id).is_some_and(|el| el.mounted);
        match target {
            VisualTarget::Element(id) => {
                let mut out = Elements::new();
                if mounted(id) {
                    out.push(*id);
                }
                out
            }
            VisualTarget::Collection(ids) => ids.iter().copied().filter(|id| mounted(id)).collect(),
            VisualTarget::Selector(sel) => self
                .elements
                .iter()
                .filter(|(_, el)| el.mounted && Self::matches(el, sel))
                .map(|(id, _)| *id)
                .collect(),
        }
    }

    fn geometry(&self, id: ElementId) -> Option<Rect> {
        self.elements
            .get(&id)
            .filter(|el| el.mounted)
            .map(|el| el.rect)
    }

    fn set_property(&mut self, id: ElementId, prop: &Property, value: &PropValue) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) if el.mounted => {
                el.props.insert(prop.clone(), value.clone());
                el.writes += 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/target/tree.rs"]
mod tests;
