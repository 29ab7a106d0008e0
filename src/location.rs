//! Addressable locations: a parent node plus a field name, map key, or index.
//!
//! A location never owns the value it points at. It stays meaningful for as
//! long as the tree that issued its parent id.

use std::fmt;

use crate::error::Error;
use crate::schema::Shape;
use crate::tree::{Node, NodeId, Slot, Tree};

/// How a child is selected inside its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Declared record field, by external key.
    Field(&'static str),
    /// Sequence position.
    Index(usize),
    /// Map entry key.
    Key(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Selector::Field(key) => write!(f, "{key}"),
            Selector::Index(idx) => write!(f, "[{idx}]"),
            Selector::Key(key) => write!(f, "{key}"),
        };
    }
}

/// A place inside a document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A child slot of a live record, map, or sequence node.
    Child {
        /// The container holding the slot.
        parent: NodeId,
        /// Which slot of the container.
        selector: Selector,
    },
    /// The document root.
    Root,
}

impl Location {
    /// Reset the value at this location to the zero value.
    ///
    /// # Errors
    ///
    /// Same as [`Location::set`].
    pub fn clear(&self, tree: &mut Tree) -> Result<(), Error> {
        return self.set(tree, None);
    }

    /// The shape the parent declares for this slot.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the selector does not match
    /// the parent kind or names an undeclared field.
    pub fn declared_shape(&self, tree: &Tree) -> Result<Shape, Error> {
        let (parent, selector) = match self {
            Location::Child { parent, selector } => (*parent, selector),
            Location::Root => {
                return match tree.node(tree.root())? {
                    Node::Record { kind, .. } => Ok(Shape::Record(*kind)),
                    node => Err(Error::unresolvable(self, parent_mismatch(node))),
                };
            },
        };

        return match (tree.node(parent)?, selector) {
            (Node::Map { value, .. }, Selector::Key(_)) => Ok(*value),
            (Node::Record { kind, .. }, Selector::Field(key)) => kind
                .schema()
                .fields
                .iter()
                .find(|f| return f.key == *key)
                .map(|f| return f.shape)
                .ok_or_else(|| return Error::unresolvable(selector, "field not declared by record")),
            (Node::Sequence { item, .. }, Selector::Index(_)) => Ok(*item),
            (node, _) => Err(Error::unresolvable(selector, parent_mismatch(node))),
        };
    }

    /// Location of a declared record field.
    pub const fn field(parent: NodeId, key: &'static str) -> Self {
        return Self::Child { parent, selector: Selector::Field(key) };
    }

    /// Current value at this location.
    ///
    /// A present map key holding the zero value yields `None`; an empty
    /// record field is an error because nothing can be read from it.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the parent is a scalar, the
    /// selector does not match the parent kind, the map key is absent, the
    /// record field is undeclared or empty, or the index is out of range.
    pub fn get(&self, tree: &Tree) -> Result<Slot, Error> {
        return self.read(tree, true);
    }

    /// Location of a sequence item.
    pub const fn index(parent: NodeId, idx: usize) -> Self {
        return Self::Child { parent, selector: Selector::Index(idx) };
    }

    /// Make this location live: an absent or zero value whose declared shape
    /// is a record, map, or sequence is replaced with an empty instance, and
    /// a missing map key is inserted. Returns the location for chaining.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the parent cannot hold the
    /// selector or the record field is not declared.
    pub fn init(self, tree: &mut Tree) -> Result<Self, Error> {
        let declared = self.declared_shape(tree)?;

        if let Location::Child { parent, selector: Selector::Key(key) } = &self
            && let Node::Map { entries, .. } = tree.node_mut(*parent)?
        {
            entries.entry(key.clone()).or_insert(None);
        }

        if self.read(tree, false)?.is_some() {
            return Ok(self);
        }

        if let Some(empty) = Node::empty(declared) {
            let id = tree.push(empty);
            self.set(tree, Some(id))?;
        }
        return Ok(self);
    }

    /// Location of a map entry.
    pub fn key(parent: NodeId, key: impl Into<String>) -> Self {
        return Self::Child { parent, selector: Selector::Key(key.into()) };
    }

    /// Shared lookup for [`Location::get`] and [`Location::init`].
    /// `require_field` makes an empty record field an error.
    fn read(&self, tree: &Tree, require_field: bool) -> Result<Slot, Error> {
        let (parent, selector) = match self {
            Location::Child { parent, selector } => (*parent, selector),
            Location::Root => return Ok(Some(tree.root())),
        };

        return match (tree.node(parent)?, selector) {
            (Node::Map { entries, .. }, Selector::Key(key)) => entries
                .get(key)
                .copied()
                .ok_or_else(|| return Error::unresolvable(selector, "no entry with this key")),
            (Node::Record { fields, kind, .. }, Selector::Field(key)) => {
                let idx = kind
                    .schema()
                    .field_index(key)
                    .ok_or_else(|| return Error::unresolvable(selector, "field not declared by record"))?;
                match fields.get(idx).copied().flatten() {
                    Some(id) => Ok(Some(id)),
                    None if require_field => Err(Error::unresolvable(selector, "field is empty")),
                    None => Ok(None),
                }
            },
            (Node::Sequence { items, .. }, Selector::Index(idx)) => items
                .get(*idx)
                .copied()
                .ok_or_else(|| return Error::unresolvable(selector, "index out of range")),
            (node, _) => Err(Error::unresolvable(selector, parent_mismatch(node))),
        };
    }

    /// Replace the value at this location.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the slot cannot be addressed
    /// (see [`Location::get`], except that empty record fields are writable),
    /// if `slot` does not fit the declared shape, or if the root is cleared.
    pub fn set(&self, tree: &mut Tree, slot: Slot) -> Result<(), Error> {
        if let Some(id) = slot {
            let declared = self.declared_shape(tree)?;
            if !tree.node(id)?.fits(declared) {
                return Err(Error::unresolvable(self, "value does not fit the declared shape"));
            }
        }

        let (parent, selector) = match self {
            Location::Child { parent, selector } => (*parent, selector),
            Location::Root => {
                let id = slot.ok_or_else(|| return Error::unresolvable(self, "root cannot be cleared"))?;
                tree.set_root(id);
                return Ok(());
            },
        };

        let target = match (tree.node_mut(parent)?, selector) {
            (Node::Map { entries, .. }, Selector::Key(key)) => entries.get_mut(key),
            (Node::Record { fields, kind, .. }, Selector::Field(key)) => {
                kind.schema().field_index(key).and_then(|idx| return fields.get_mut(idx))
            },
            (Node::Sequence { items, .. }, Selector::Index(idx)) => items.get_mut(*idx),
            (node, _) => return Err(Error::unresolvable(selector, parent_mismatch(node))),
        };
        let target = target.ok_or_else(|| return Error::unresolvable(selector, "slot does not exist"))?;
        *target = slot;
        return Ok(());
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Location::Child { selector, .. } => write!(f, "{selector}"),
            Location::Root => write!(f, "<root>"),
        };
    }
}

/// Follow pointer segments from the root and return the final location.
/// Every location before the last must hold a live node.
///
/// # Errors
///
/// Returns `Error::LocationUnresolvable` naming the first segment that has
/// no matching target.
pub fn walk(tree: &Tree, segments: &[&str]) -> Result<Location, Error> {
    let mut location = Location::Root;
    for segment in segments {
        let parent = location
            .get(tree)?
            .ok_or_else(|| return Error::unresolvable(segment, "parent value is empty"))?;
        location = child_location(tree, parent, segment)?;
    }
    return Ok(location);
}

/// Like [`walk`], but every location on the way, including the last, is
/// initialised so missing records, maps, and map keys are created.
///
/// # Errors
///
/// Returns `Error::LocationUnresolvable` if a segment names an undeclared
/// field or descends into a scalar.
pub fn walk_or_create(tree: &mut Tree, segments: &[&str]) -> Result<Location, Error> {
    let mut location = Location::Root;
    for segment in segments {
        let parent = location
            .init(tree)?
            .get(tree)?
            .ok_or_else(|| return Error::unresolvable(segment, "cannot create a value here"))?;
        location = child_location(tree, parent, segment)?.init(tree)?;
    }
    return Ok(location);
}

/// Location of `segment` inside the node `parent`.
fn child_location(tree: &Tree, parent: NodeId, segment: &str) -> Result<Location, Error> {
    return match tree.node(parent)? {
        Node::Map { .. } => Ok(Location::key(parent, segment)),
        Node::Record { kind, .. } => {
            let schema = kind.schema();
            schema
                .field_index(segment)
                .and_then(|idx| return schema.fields.get(idx))
                .map(|field| return Location::field(parent, field.key))
                .ok_or_else(|| return Error::unresolvable(segment, "field not declared by record"))
        },
        Node::Sequence { .. } => segment
            .parse::<usize>()
            .map(|idx| return Location::index(parent, idx))
            .map_err(|_err| return Error::unresolvable(segment, "sequence index is not a number")),
        Node::Scalar(_) => Err(Error::unresolvable(segment, "cannot descend into a scalar")),
    };
}

/// Reason for a selector that does not match its parent's kind.
const fn parent_mismatch(node: &Node) -> &'static str {
    return match node {
        Node::Map { .. } => "map entries are selected by key",
        Node::Record { .. } => "record fields are selected by name",
        Node::Scalar(_) => "parent is a scalar",
        Node::Sequence { .. } => "sequence items are selected by index",
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use std::path::Path;

    use serde_yaml::Value;

    use super::*;
    use crate::schema::Kind;

    fn parse(yaml: &str) -> Tree {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        return Tree::from_yaml(value, Kind::OpenApi, Path::new("test.yaml")).unwrap();
    }

    const PETS: &str = "\
components:
  schemas:
    Pet:
      type: object
    Gone: ~
";

    #[test]
    fn walk_reaches_map_entry() {
        let tree = parse(PETS);
        let location = walk(&tree, &["components", "schemas", "Pet"]).unwrap();
        let id = location.get(&tree).unwrap().unwrap();
        assert_eq!(tree.export(Some(id)).unwrap()["type"], Value::String("object".to_string()));
    }

    #[test]
    fn zero_map_entry_reads_as_zero() {
        let tree = parse(PETS);
        let location = walk(&tree, &["components", "schemas", "Gone"]).unwrap();
        assert_eq!(location.get(&tree).unwrap(), None);
    }

    #[test]
    fn absent_key_and_empty_field_are_unresolvable() {
        let tree = parse(PETS);
        let missing = walk(&tree, &["components", "schemas", "Cat"]).unwrap();
        assert!(matches!(missing.get(&tree), Err(Error::LocationUnresolvable { .. })));
        assert!(matches!(
            walk(&tree, &["components", "responses", "Ok"]),
            Err(Error::LocationUnresolvable { .. })
        ));
        assert!(matches!(walk(&tree, &["componentz"]), Err(Error::LocationUnresolvable { .. })));
    }

    #[test]
    fn set_on_absent_map_key_fails() {
        let mut tree = parse(PETS);
        let missing = walk(&tree, &["components", "schemas", "Cat"]).unwrap();
        assert!(missing.set(&mut tree, None).is_err());
    }

    #[test]
    fn clear_leaves_key_with_zero_value() {
        let mut tree = parse(PETS);
        let pet = walk(&tree, &["components", "schemas", "Pet"]).unwrap();
        pet.clear(&mut tree).unwrap();
        let yaml = tree.to_yaml().unwrap();
        assert_eq!(yaml["components"]["schemas"]["Pet"], Value::Null);
        assert!(yaml["components"]["schemas"].as_mapping().unwrap().contains_key("Pet"));
    }

    #[test]
    fn set_rejects_mismatched_record_kind() {
        let mut tree = parse(PETS);
        let info = tree.push(Node::empty(crate::schema::Shape::Record(Kind::Info)).unwrap());
        let pet = walk(&tree, &["components", "schemas", "Pet"]).unwrap();
        assert!(pet.set(&mut tree, Some(info)).is_err());
    }

    #[test]
    fn walk_or_create_builds_missing_components() {
        let mut tree = Tree::new(Kind::OpenApi);
        let location = walk_or_create(&mut tree, &["components", "responses", "ShopsResponse"]).unwrap();
        let response = tree.push(Node::empty(crate::schema::Shape::Record(Kind::Response)).unwrap());
        location.set(&mut tree, Some(response)).unwrap();
        assert!(walk(&tree, &["components", "responses", "ShopsResponse"]).unwrap().get(&tree).unwrap().is_some());
    }

    #[test]
    fn walk_or_create_refuses_scalars() {
        let mut tree = parse("openapi: 3.0.0\n");
        assert!(walk_or_create(&mut tree, &["openapi", "x"]).is_err());
    }

    #[test]
    fn sequence_items_are_addressed_by_index() {
        let tree = parse("servers:\n  - url: a\n  - url: b\n");
        let second = walk(&tree, &["servers", "1", "url"]).unwrap();
        let id = second.get(&tree).unwrap().unwrap();
        assert_eq!(tree.export(Some(id)).unwrap(), Value::String("b".to_string()));
        assert!(walk(&tree, &["servers", "x"]).is_err());
    }
}
