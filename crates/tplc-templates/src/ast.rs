use std::fmt;

use rustc_hash::FxHashMap;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use tplc_source::Span;

use crate::filters::parse_filters;
use crate::text::RawToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source attribute as written on an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Attr {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Attribute name to raw value, in insertion order.
///
/// Kept apart from the element's attribute list: processing removes
/// entries from the list while the map keeps them for later passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrMap(Vec<(String, String)>);

impl AttrMap {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Value of `name` when present and non-empty.
    #[must_use]
    pub fn truthy(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let position = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttrMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrMapVisitor;

        impl<'de> Visitor<'de> for AttrMapVisitor {
            type Value = AttrMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AttrMap, A::Error> {
                let mut map = AttrMap::default();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    map.insert(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(AttrMapVisitor)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = AttrMap::default();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// One alternative of a conditional chain. `exp == None` is the final
/// `else` branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfCondition {
    pub exp: Option<String>,
    pub block: NodeId,
}

/// A processed plain or bound attribute. `value` is expression source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrBinding {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveBinding {
    pub name: String,
    pub raw_name: String,
    pub value: String,
    #[serde(default)]
    pub arg: Option<String>,
    #[serde(default)]
    pub dynamic_arg: bool,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub tag: String,
    pub attrs_list: Vec<Attr>,
    pub attrs_map: AttrMap,
    pub raw_attrs_map: FxHashMap<String, Attr>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    #[serde(rename = "for")]
    pub for_expr: Option<String>,
    pub alias: Option<String>,
    pub iterator1: Option<String>,
    pub iterator2: Option<String>,

    #[serde(rename = "if")]
    pub if_expr: Option<String>,
    #[serde(rename = "elseif")]
    pub else_if: Option<String>,
    #[serde(rename = "else")]
    pub is_else: bool,
    pub if_conditions: Vec<IfCondition>,

    pub processed: bool,
    pub plain: bool,
    pub key: Option<String>,
    #[serde(rename = "ref")]
    pub ref_binding: Option<String>,
    pub static_class: Option<String>,
    pub class_binding: Option<String>,
    pub attrs: Vec<AttrBinding>,
    pub props: Vec<AttrBinding>,
    pub events: Vec<EventBinding>,
    pub directives: Vec<DirectiveBinding>,
    pub has_bindings: bool,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>, attrs: Vec<Attr>, parent: Option<NodeId>) -> Self {
        let attrs_map = attrs
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        let raw_attrs_map = attrs
            .iter()
            .map(|attr| (attr.name.clone(), attr.clone()))
            .collect();
        Self {
            tag: tag.into(),
            attrs_list: attrs,
            attrs_map,
            raw_attrs_map,
            parent,
            ..Default::default()
        }
    }

    /// Span of the source attribute `name`, if the builder recorded one.
    #[must_use]
    pub fn attr_span(&self, name: &str) -> Option<Span> {
        self.raw_attrs_map.get(name).and_then(|attr| attr.span)
    }

    /// Take `name` out of the attribute list and return its value.
    ///
    /// The attribute map keeps the entry unless `remove_from_map` is set,
    /// so later passes still see the attribute was written.
    pub fn get_and_remove_attr(&mut self, name: &str, remove_from_map: bool) -> Option<String> {
        let value = self.attrs_map.get(name).map(str::to_string);
        if value.is_some() {
            if let Some(position) = self.attrs_list.iter().position(|attr| attr.name == name) {
                self.attrs_list.remove(position);
            }
        }
        if remove_from_map {
            self.attrs_map.remove(name);
        }
        value
    }

    /// Resolve a possibly bound attribute.
    ///
    /// `:name` wins, then `v-bind:name`; the bound source goes through the
    /// filter parser. Without a binding and with `get_static`, the plain
    /// attribute is returned as a JSON string literal.
    pub fn get_binding_attr(&mut self, name: &str, get_static: bool) -> Option<String> {
        let shorthand = self
            .get_and_remove_attr(&format!(":{name}"), false)
            .filter(|value| !value.is_empty());
        let dynamic =
            shorthand.or_else(|| self.get_and_remove_attr(&format!("v-bind:{name}"), false));
        if let Some(dynamic) = dynamic {
            return Some(parse_filters(&dynamic));
        }
        if get_static {
            return self
                .get_and_remove_attr(name, false)
                .map(|value| serde_json::Value::from(value).to_string());
        }
        None
    }

    /// Add an attribute that was not in the source.
    pub fn add_raw_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let attr = Attr::new(name, value);
        self.attrs_map.insert(attr.name.clone(), attr.value.clone());
        self.attrs_list.push(attr);
    }

    pub fn add_if_condition(&mut self, condition: IfCondition) {
        self.if_conditions.push(condition);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    /// Text with at least one interpolation.
    Expression {
        expression: String,
        #[serde(default)]
        tokens: Vec<RawToken>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
        #[serde(default)]
        parent: Option<NodeId>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
        #[serde(default)]
        parent: Option<NodeId>,
    },
}

impl Node {
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Element(el) => el.parent,
            Node::Expression { parent, .. } | Node::Text { parent, .. } => *parent,
        }
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Node::Element(el) => el.span,
            Node::Expression { span, .. } | Node::Text { span, .. } => *span,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Arena owning every node of a template tree.
///
/// Nodes refer to each other by [`NodeId`]; parent links are plain indices
/// and never own anything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// Allocate a detached element. The parent link is set, but the element
    /// is not added to the parent's children.
    pub fn create_element(
        &mut self,
        tag: impl Into<String>,
        attrs: Vec<Attr>,
        parent: Option<NodeId>,
    ) -> NodeId {
        self.push(Node::Element(Element::new(tag, attrs, parent)))
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        match self.nodes.get_mut(child.index()) {
            Some(Node::Element(el)) => el.parent = Some(parent),
            Some(Node::Expression { parent: p, .. } | Node::Text { parent: p, .. }) => {
                *p = Some(parent);
            }
            None => return,
        }
        if let Some(el) = self.element_mut(parent) {
            el.children.push(child);
        }
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(u32::try_from(index).unwrap_or(u32::MAX)), node))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
