//! Arena-backed document tree.
//!
//! A [`Tree`] owns every node of one document. Slots hold [`NodeId`]s into
//! the arena, so a node can be reachable from several slots at once: local
//! inlining aliases the target node instead of copying it, and in-place
//! updates made later through either slot are seen by both.

use std::path::Path;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::Error;
use crate::schema::{Kind, REF_KEY, Shape};

/// Index of a node inside the [`Tree`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A value slot. `None` is the zero value.
pub type Slot = Option<NodeId>;

/// One node of the closed node-kind set.
#[derive(Debug, Clone)]
pub enum Node {
    /// Keyed map; entry order is preserved.
    Map {
        /// Entries by key.
        entries: IndexMap<String, Slot>,
        /// Declared shape of every entry value.
        value: Shape,
    },
    /// Record with slots aligned to its schema's field list.
    Record {
        /// Keys the schema does not declare, kept verbatim.
        extensions: Mapping,
        /// One slot per declared field, in schema order.
        fields: Vec<Slot>,
        /// Record kind selecting the field catalog.
        kind: Kind,
    },
    /// Opaque YAML value.
    Scalar(Value),
    /// Ordered sequence.
    Sequence {
        /// Declared shape of every item.
        item: Shape,
        /// Items in order.
        items: Vec<Slot>,
    },
}

impl Node {
    /// An empty instance of a composite shape, `None` for scalars.
    pub fn empty(shape: Shape) -> Option<Self> {
        return match shape {
            Shape::Map(value) => Some(Node::Map {
                entries: IndexMap::new(),
                value: *value,
            }),
            Shape::Record(kind) | Shape::RecordOrScalar(kind) => Some(Node::empty_record(kind)),
            Shape::Scalar => None,
            Shape::Sequence(item) => Some(Node::Sequence {
                item: *item,
                items: Vec::new(),
            }),
        };
    }

    /// A record of `kind` with every field empty.
    pub fn empty_record(kind: Kind) -> Self {
        return Node::Record {
            extensions: Mapping::new(),
            fields: vec![None; kind.schema().fields.len()],
            kind,
        };
    }

    /// Whether this node may be stored in a slot declared as `shape`.
    pub fn fits(&self, shape: Shape) -> bool {
        return match (self, shape) {
            (Node::Record { kind, .. }, Shape::Record(declared) | Shape::RecordOrScalar(declared)) => {
                *kind == declared
            },
            (Node::Map { .. }, Shape::Map(_))
            | (Node::Scalar(_), Shape::Scalar | Shape::RecordOrScalar(_))
            | (Node::Sequence { .. }, Shape::Sequence(_)) => true,
            _ => false,
        };
    }

    /// A composite that holds at least one slot or extension.
    pub fn is_walkable(&self) -> bool {
        return match self {
            Node::Map { entries, .. } => !entries.is_empty(),
            Node::Record { extensions, fields, .. } => {
                fields.iter().any(Option::is_some) || !extensions.is_empty()
            },
            Node::Scalar(_) => false,
            Node::Sequence { items, .. } => !items.is_empty(),
        };
    }

    /// Name of the node kind for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        return match self {
            Node::Map { .. } => "map",
            Node::Record { .. } => "record",
            Node::Scalar(_) => "scalar",
            Node::Sequence { .. } => "sequence",
        };
    }
}

/// All nodes of one document plus the id of its root record.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Arena of every node ever created for this document.
    nodes: Vec<Node>,
    /// Id of the root record.
    root: NodeId,
}

impl Tree {
    /// Recursively shape `value` as `shape`. `trail` tracks the key path for errors.
    fn build(&mut self, value: Value, shape: Shape, trail: &mut Vec<String>) -> Result<Slot, String> {
        if value.is_null() {
            return Ok(None);
        }

        let node = match shape {
            Shape::Map(entry_shape) => {
                let Value::Mapping(mapping) = value else {
                    return Err(mismatch(trail, "mapping", &value));
                };
                let mut entries = IndexMap::with_capacity(mapping.len());
                for (key, child) in mapping {
                    let key = key_to_string(&key).ok_or_else(|| return mismatch(trail, "scalar key", &key))?;
                    trail.push(key.clone());
                    let slot = self.build(child, *entry_shape, trail)?;
                    trail.pop();
                    entries.insert(key, slot);
                }
                Node::Map { entries, value: *entry_shape }
            },
            Shape::Record(kind) => self.build_record(value, kind, trail)?,
            Shape::RecordOrScalar(kind) => {
                let resolved = if value.is_mapping() { Shape::Record(kind) } else { Shape::Scalar };
                return self.build(value, resolved, trail);
            },
            Shape::Scalar => Node::Scalar(value),
            Shape::Sequence(item_shape) => {
                let Value::Sequence(sequence) = value else {
                    return Err(mismatch(trail, "sequence", &value));
                };
                let mut items = Vec::with_capacity(sequence.len());
                for (idx, child) in sequence.into_iter().enumerate() {
                    trail.push(idx.to_string());
                    items.push(self.build(child, *item_shape, trail)?);
                    trail.pop();
                }
                Node::Sequence { item: *item_shape, items }
            },
        };

        return Ok(Some(self.push(node)));
    }

    /// Shape a mapping as a record of `kind`, keeping undeclared keys as extensions.
    fn build_record(&mut self, value: Value, kind: Kind, trail: &mut Vec<String>) -> Result<Node, String> {
        let schema = kind.schema();
        let Value::Mapping(mapping) = value else {
            return Err(mismatch(trail, schema.name, &value));
        };
        let mut fields = vec![None; schema.fields.len()];
        let mut extensions = Mapping::new();
        for (key, child) in mapping {
            let declared = key
                .as_str()
                .and_then(|k| return schema.field_index(k))
                .and_then(|idx| return schema.fields.get(idx).map(|field| return (idx, field)));
            let Some((idx, field)) = declared else {
                extensions.insert(key, child);
                continue;
            };
            trail.push(field.key.to_string());
            let slot = self.build(child, field.shape, trail)?;
            trail.pop();
            if let Some(target) = fields.get_mut(idx) {
                *target = slot;
            }
        }
        return Ok(Node::Record { extensions, fields, kind });
    }

    /// Render one slot back to YAML. Zero slots render as `null`; empty
    /// record fields are omitted.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingNode` if a slot points outside this tree.
    pub fn export(&self, slot: Slot) -> Result<Value, Error> {
        let Some(id) = slot else {
            return Ok(Value::Null);
        };
        return match self.node(id)? {
            Node::Map { entries, .. } => {
                let mut mapping = Mapping::new();
                for (key, child) in entries {
                    mapping.insert(Value::String(key.clone()), self.export(*child)?);
                }
                Ok(Value::Mapping(mapping))
            },
            Node::Record { extensions, fields, kind } => {
                let mut mapping = Mapping::new();
                for (field, child) in kind.schema().fields.iter().zip(fields) {
                    if child.is_some() {
                        mapping.insert(Value::String(field.key.to_string()), self.export(*child)?);
                    }
                }
                for (key, value) in extensions {
                    mapping.insert(key.clone(), value.clone());
                }
                Ok(Value::Mapping(mapping))
            },
            Node::Scalar(value) => Ok(value.clone()),
            Node::Sequence { items, .. } => {
                let mut sequence = Vec::with_capacity(items.len());
                for child in items {
                    sequence.push(self.export(*child)?);
                }
                Ok(Value::Sequence(sequence))
            },
        };
    }

    /// Build a tree from parsed YAML, shaping it with the catalog for `kind`.
    /// A null document yields an empty root record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Deserialize` naming `origin` and the offending key path
    /// when a value does not match its declared shape.
    pub fn from_yaml(value: Value, kind: Kind, origin: &Path) -> Result<Self, Error> {
        let mut tree = Self { nodes: Vec::new(), root: NodeId(0) };
        let mut trail = Vec::new();
        let built = tree
            .build(value, Shape::Record(kind), &mut trail)
            .map_err(|reason| return Error::Deserialize { path: origin.to_path_buf(), reason })?;
        let root = built.unwrap_or_else(|| return tree.push(Node::empty_record(kind)));
        tree.root = root;
        return Ok(tree);
    }

    /// Deep-copy node `id` of `other` into this tree and return the copy's id.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingNode` if `id` or one of its descendants is not
    /// a node of `other`.
    pub fn import(&mut self, other: &Tree, id: NodeId) -> Result<NodeId, Error> {
        let copy = match other.node(id)? {
            Node::Map { entries, value } => {
                let mut copied = IndexMap::with_capacity(entries.len());
                for (key, child) in entries {
                    copied.insert(key.clone(), self.import_slot(other, *child)?);
                }
                Node::Map { entries: copied, value: *value }
            },
            Node::Record { extensions, fields, kind } => {
                let mut copied = Vec::with_capacity(fields.len());
                for child in fields {
                    copied.push(self.import_slot(other, *child)?);
                }
                Node::Record {
                    extensions: extensions.clone(),
                    fields: copied,
                    kind: *kind,
                }
            },
            Node::Scalar(value) => Node::Scalar(value.clone()),
            Node::Sequence { item, items } => {
                let mut copied = Vec::with_capacity(items.len());
                for child in items {
                    copied.push(self.import_slot(other, *child)?);
                }
                Node::Sequence { item: *item, items: copied }
            },
        };
        return Ok(self.push(copy));
    }

    /// [`Tree::import`] for a slot that may hold the zero value.
    fn import_slot(&mut self, other: &Tree, slot: Slot) -> Result<Slot, Error> {
        return slot.map(|id| return self.import(other, id)).transpose();
    }

    /// A tree whose root is an empty record of `kind`.
    pub fn new(kind: Kind) -> Self {
        let mut tree = Self { nodes: Vec::new(), root: NodeId(0) };
        let root = tree.push(Node::empty_record(kind));
        tree.root = root;
        return tree;
    }

    /// Borrow a node.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingNode` if `id` was issued by a different tree.
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        return self.nodes.get(id.0).ok_or(Error::DanglingNode { index: id.0 });
    }

    /// Mutably borrow a node.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingNode` if `id` was issued by a different tree.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        return self.nodes.get_mut(id.0).ok_or(Error::DanglingNode { index: id.0 });
    }

    /// Append a node and return its id.
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        return NodeId(self.nodes.len().saturating_sub(1));
    }

    /// The non-empty `$ref` string of a record node, if it is reference-only.
    pub fn reference_of(&self, id: NodeId) -> Option<&str> {
        let Node::Record { fields, kind, .. } = self.node(id).ok()? else {
            return None;
        };
        let slot = fields.get(kind.schema().reference_index()?).copied().flatten()?;
        let Node::Scalar(Value::String(path)) = self.node(slot).ok()? else {
            return None;
        };
        return (!path.is_empty()).then_some(path.as_str());
    }

    /// Id of the root record.
    pub const fn root(&self) -> NodeId {
        return self.root;
    }

    /// Overwrite the `$ref` field of a record node.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the node is not a record
    /// whose schema declares a reference field.
    pub fn set_reference(&mut self, id: NodeId, path: &str) -> Result<(), Error> {
        let scalar = self.push(Node::Scalar(Value::String(path.to_string())));
        let Node::Record { fields, kind, .. } = self.node_mut(id)? else {
            return Err(Error::unresolvable(REF_KEY, "node is not a record"));
        };
        let slot = kind
            .schema()
            .reference_index()
            .and_then(|idx| return fields.get_mut(idx))
            .ok_or_else(|| return Error::unresolvable(REF_KEY, "record cannot hold a reference"))?;
        *slot = Some(scalar);
        return Ok(());
    }

    /// Make `id` the new root.
    pub const fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    /// Render the whole tree back to YAML.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingNode` if the tree holds a foreign node id.
    pub fn to_yaml(&self) -> Result<Value, Error> {
        return self.export(Some(self.root));
    }
}

/// Map keys may be written as numbers or booleans (e.g. response codes).
fn key_to_string(key: &Value) -> Option<String> {
    return match key {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    };
}

/// Describe a shape mismatch at the current key path.
fn mismatch(trail: &[String], expected: &str, found: &Value) -> String {
    let found = match found {
        Value::Bool(_) => "boolean",
        Value::Mapping(_) => "mapping",
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::Sequence(_) => "sequence",
        Value::String(_) => "string",
        Value::Tagged(_) => "tagged value",
    };
    let at = if trail.is_empty() { "<root>".to_string() } else { trail.join(".") };
    return format!("at `{at}`: expected {expected}, found {found}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(yaml: &str) -> Tree {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        return Tree::from_yaml(value, Kind::OpenApi, Path::new("test.yaml")).unwrap();
    }

    fn record_fields(tree: &Tree, id: NodeId) -> &[Slot] {
        let Node::Record { fields, .. } = tree.node(id).unwrap() else {
            panic!("node is not a record");
        };
        return fields;
    }

    fn schema_entry(tree: &Tree, name: &str) -> NodeId {
        let components_idx = Kind::OpenApi.schema().field_index("components").unwrap();
        let components = record_fields(tree, tree.root())[components_idx].unwrap();
        let schemas = record_fields(tree, components)[0].unwrap();
        let Node::Map { entries, .. } = tree.node(schemas).unwrap() else {
            panic!("schemas is not a map");
        };
        return entries[name].unwrap();
    }

    #[test]
    fn round_trips_declared_fields_in_schema_order() {
        let tree = parse("info:\n  version: '1'\n  title: Pets\nopenapi: 3.0.0\n");
        let out = serde_yaml::to_string(&tree.to_yaml().unwrap()).unwrap();
        assert_eq!(out, "openapi: 3.0.0\ninfo:\n  title: Pets\n  version: '1'\n");
    }

    #[test]
    fn keeps_undeclared_keys_as_extensions() {
        let tree = parse("openapi: 3.0.0\nx-internal: true\n");
        let Node::Record { extensions, .. } = tree.node(tree.root()).unwrap() else {
            panic!("root is not a record");
        };
        assert_eq!(extensions.get("x-internal"), Some(&Value::Bool(true)));
    }

    #[test]
    fn numeric_map_keys_become_strings() {
        let tree = parse("paths:\n  /pets:\n    get:\n      responses:\n        200:\n          description: ok\n");
        let yaml = tree.to_yaml().unwrap();
        let responses = &yaml["paths"]["/pets"]["get"]["responses"];
        assert_eq!(responses["200"]["description"], Value::String("ok".to_string()));
    }

    #[test]
    fn rejects_scalar_where_record_is_declared() {
        let value: Value = serde_yaml::from_str("info: hello\n").unwrap();
        let err = Tree::from_yaml(value, Kind::OpenApi, Path::new("bad.yaml")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad.yaml"), "{message}");
        assert!(message.contains("at `info`: expected Info, found string"), "{message}");
    }

    #[test]
    fn null_document_is_empty_root() {
        let tree = Tree::from_yaml(Value::Null, Kind::OpenApi, Path::new("-")).unwrap();
        assert!(!tree.node(tree.root()).unwrap().is_walkable());
    }

    #[test]
    fn detects_reference_only_records() {
        let tree = parse("components:\n  schemas:\n    Pet:\n      $ref: '#/components/schemas/Animal'\n    Empty:\n      $ref: ''\n");
        assert_eq!(tree.reference_of(schema_entry(&tree, "Pet")), Some("#/components/schemas/Animal"));
        assert_eq!(tree.reference_of(schema_entry(&tree, "Empty")), None);
    }

    #[test]
    fn additional_properties_is_a_schema_only_when_a_mapping() {
        let tree = parse(
            "\
components:
  schemas:
    Bag:
      additionalProperties:
        $ref: '#/components/schemas/Item'
    Closed:
      additionalProperties: false
",
        );
        let yaml = tree.to_yaml().unwrap();
        assert_eq!(yaml["components"]["schemas"]["Closed"]["additionalProperties"], Value::Bool(false));

        let extra_idx = Kind::Schema.schema().field_index("additionalProperties").unwrap();
        let extra = record_fields(&tree, schema_entry(&tree, "Bag"))[extra_idx].unwrap();
        assert_eq!(tree.reference_of(extra), Some("#/components/schemas/Item"));
    }

    #[test]
    fn import_copies_across_trees() {
        let source = parse("components:\n  schemas:\n    Pet:\n      type: object\n");
        let mut target = Tree::new(Kind::OpenApi);
        let copy = target.import(&source, source.root()).unwrap();
        assert_eq!(target.export(Some(copy)).unwrap(), source.to_yaml().unwrap());
    }

    #[test]
    fn foreign_node_id_is_an_error() {
        let small = Tree::new(Kind::OpenApi);
        let big = parse("openapi: 3.0.0\ninfo:\n  title: x\n");
        let info = record_fields(&big, big.root())[1].unwrap();
        assert!(matches!(small.node(info), Err(Error::DanglingNode { .. })));
    }
}
