//! Route definitions and compiled route nodes.
//!
//! `RouteDef` is the declarative form written by the application. The table
//! compiles each definition into a `RouteNode` carrying its parsed pattern,
//! full path and a stable `NodeId`.

use std::sync::Arc;

use serde::Serialize;

use crate::routing::matcher::PathPattern;

/// Stable identifier assigned in pre-order when a table is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// An opaque renderable unit handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewUnit {
    /// Component name (e.g. `Drone`).
    pub name: String,
    /// Chunk the unit was produced from.
    pub chunk: String,
    /// Where the unit came from (`embedded` or the fetched URL).
    pub origin: String,
    /// Size of the fetched payload in bytes.
    pub size: usize,
}

impl ViewUnit {
    /// A unit compiled into the binary.
    pub fn embedded(name: impl Into<String>, chunk: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chunk: chunk.into(),
            origin: "embedded".to_string(),
            size: 0,
        }
    }
}

/// Reference from a route to its renderable unit.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "binding", rename_all = "snake_case")]
pub enum ComponentRef {
    /// Bound at table construction.
    Eager { unit: Arc<ViewUnit> },
    /// Resolved on first activation and cached afterwards.
    Lazy { name: String, chunk: String },
}

impl ComponentRef {
    pub fn eager(unit: ViewUnit) -> Self {
        ComponentRef::Eager {
            unit: Arc::new(unit),
        }
    }

    pub fn lazy(name: impl Into<String>, chunk: impl Into<String>) -> Self {
        ComponentRef::Lazy {
            name: name.into(),
            chunk: chunk.into(),
        }
    }

    /// Component name regardless of binding.
    pub fn name(&self) -> &str {
        match self {
            ComponentRef::Eager { unit } => &unit.name,
            ComponentRef::Lazy { name, .. } => name,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, ComponentRef::Lazy { .. })
    }
}

/// Declarative route definition.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<ComponentRef>,
    pub redirect: Option<String>,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component: None,
            redirect: None,
            children: Vec::new(),
        }
    }

    /// A terminal route that sends the navigation elsewhere.
    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            redirect: Some(target.into()),
            ..Self::new(path)
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component(mut self, component: ComponentRef) -> Self {
        self.component = Some(component);
        self
    }

    pub fn children(mut self, children: Vec<RouteDef>) -> Self {
        self.children = children;
        self
    }
}

/// A compiled node of the route tree.
#[derive(Debug, Clone, Serialize)]
pub struct RouteNode {
    pub id: NodeId,
    /// Path as declared, relative to the parent.
    pub path: String,
    /// Absolute path pattern, e.g. `/views/depth`.
    pub full_path: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteNode>,
    #[serde(skip)]
    pub(crate) pattern: PathPattern,
    #[serde(skip)]
    pub(crate) full_pattern: PathPattern,
}

impl RouteNode {
    /// Pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RouteNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
