//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Compile route definitions into an immutable tree
//! - Enforce table invariants at construction
//! - Resolve a location into the chain of matched routes
//! - Build locations for named routes
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) declaration-order scan per level (route counts are tiny)
//! - Redirects are followed inside resolve, bounded by `MAX_REDIRECTS`
//! - Explicit NoMatch only when the table has no catch-all

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::routing::matcher::{match_tree, split_segments, Params, PathPattern, PatternError};
use crate::routing::node::{ComponentRef, NodeId, RouteDef, RouteNode};

/// Upper bound on redirect hops followed by a single resolve.
pub const MAX_REDIRECTS: usize = 8;

/// Invariant violations detected while building a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("invalid path: {0}")]
    Pattern(#[from] PatternError),

    #[error("no root route claims `/`")]
    MissingRoot,

    #[error("{0} root routes claim `/`")]
    DuplicateRoot(usize),

    #[error("route name `{0}` is declared more than once")]
    DuplicateName(String),

    #[error("catch-all `{0}` is not the last of its siblings")]
    CatchAllNotLast(String),

    #[error("redirect route `{0}` must not have a component or children")]
    RedirectWithTarget(String),
}

/// Failures reported by resolve and named lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no route named `{0}`")]
    UnknownName(String),

    #[error("route `{name}` requires parameter `{param}`")]
    MissingParam { name: String, param: String },

    #[error("no route matches `{0}`")]
    NoMatch(String),

    #[error("redirect limit exceeded while resolving `{0}`")]
    RedirectLoop(String),
}

/// A matched route in an activation chain.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRecord {
    pub id: NodeId,
    pub name: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl From<&RouteNode> for RouteRecord {
    fn from(node: &RouteNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            path: node.full_path.clone(),
            component: node.component.clone(),
            redirect: node.redirect.clone(),
        }
    }
}

/// Location that was redirected away from, with what the catch-all captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectedFrom {
    pub path: String,
    pub params: Params,
}

/// Result of resolving a location.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Normalized path that was finally matched.
    pub path: String,
    pub params: Params,
    /// Matched routes from outermost to deepest.
    pub matched: Vec<RouteRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<RedirectedFrom>,
}

impl Resolution {
    /// Names of the matched routes, outermost first.
    pub fn names(&self) -> Vec<&str> {
        self.matched.iter().filter_map(|r| r.name.as_deref()).collect()
    }

    /// The deepest matched route.
    pub fn leaf(&self) -> Option<&RouteRecord> {
        self.matched.last()
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<RouteNode>,
    by_name: HashMap<String, NodeId>,
    records: Vec<RouteRecord>,
    patterns: Vec<PathPattern>,
}

impl RouteTable {
    /// Compile and validate a route table.
    pub fn new(defs: Vec<RouteDef>) -> Result<Self, TableError> {
        let routes = compile(defs)?;

        let roots = routes.iter().filter(|n| n.pattern.is_root()).count();
        match roots {
            0 => return Err(TableError::MissingRoot),
            1 => {}
            n => return Err(TableError::DuplicateRoot(n)),
        }
        check_siblings(&routes)?;

        let mut by_name = HashMap::new();
        let mut records = Vec::new();
        let mut patterns = Vec::new();
        let mut duplicate = None;
        for root in &routes {
            root.walk(&mut |node| {
                if let Some(name) = &node.name {
                    if by_name.insert(name.clone(), node.id).is_some() && duplicate.is_none() {
                        duplicate = Some(name.clone());
                    }
                }
                records.push(RouteRecord::from(node));
                patterns.push(node.full_pattern.clone());
            });
        }
        if let Some(name) = duplicate {
            return Err(TableError::DuplicateName(name));
        }

        tracing::debug!(routes = records.len(), named = by_name.len(), "Route table compiled");

        Ok(Self {
            routes,
            by_name,
            records,
            patterns,
        })
    }

    /// Root-level routes in declaration order.
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Every route, in pre-order.
    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn record(&self, id: NodeId) -> Option<&RouteRecord> {
        self.records.get(id.0)
    }

    /// Look up a route id by name.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// All declared route names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| r.name.as_deref())
    }

    /// Match a location without following redirects.
    pub fn match_location(&self, location: &str) -> Option<Resolution> {
        let path = normalize_path(location);
        let segments = split_segments(&path);
        let mut params = Params::new();
        let mut chain = Vec::new();

        if !match_tree(&self.routes, &segments, &mut params, &mut chain) {
            return None;
        }

        Some(Resolution {
            matched: chain.into_iter().map(RouteRecord::from).collect(),
            path,
            params,
            redirected_from: None,
        })
    }

    /// Resolve a location into its activation chain, following redirects.
    pub fn resolve(&self, location: &str) -> Result<Resolution, ResolveError> {
        let mut current = location.to_string();
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            let resolution = self
                .match_location(&current)
                .ok_or_else(|| ResolveError::NoMatch(normalize_path(&current)))?;

            let redirect = resolution.leaf().and_then(|leaf| leaf.redirect.clone());

            match redirect {
                Some(target) => {
                    tracing::debug!(from = %resolution.path, to = %target, "Following redirect");
                    if redirected_from.is_none() {
                        redirected_from = Some(RedirectedFrom {
                            path: resolution.path,
                            params: resolution.params,
                        });
                    }
                    current = target;
                }
                None => {
                    tracing::debug!(path = %resolution.path, routes = ?resolution.names(), "Resolved");
                    return Ok(Resolution {
                        redirected_from,
                        ..resolution
                    });
                }
            }
        }

        Err(ResolveError::RedirectLoop(normalize_path(location)))
    }

    /// Build the concrete path of a named route.
    pub fn location_for(&self, name: &str, params: &Params) -> Result<String, ResolveError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| ResolveError::UnknownName(name.to_string()))?;
        self.patterns[id.0]
            .render(params)
            .map_err(|param| ResolveError::MissingParam {
                name: name.to_string(),
                param,
            })
    }

    /// Resolve a named route.
    pub fn resolve_named(&self, name: &str, params: &Params) -> Result<Resolution, ResolveError> {
        let location = self.location_for(name, params)?;
        self.resolve(&location)
    }
}

/// Compile definitions into nodes, assigning pre-order ids.
///
/// Only structural checks happen here; table invariants live in
/// `RouteTable::new`.
pub(crate) fn compile(defs: Vec<RouteDef>) -> Result<Vec<RouteNode>, TableError> {
    let mut next_id = 0;
    compile_level(defs, &PathPattern::default(), &mut next_id)
}

fn compile_level(
    defs: Vec<RouteDef>,
    parent: &PathPattern,
    next_id: &mut usize,
) -> Result<Vec<RouteNode>, TableError> {
    let mut nodes = Vec::with_capacity(defs.len());
    for def in defs {
        let pattern = PathPattern::parse(&def.path)?;
        let full_pattern = parent.join(&pattern);
        let id = NodeId(*next_id);
        *next_id += 1;

        if def.redirect.is_some() && (def.component.is_some() || !def.children.is_empty()) {
            return Err(TableError::RedirectWithTarget(def.path));
        }

        let children = compile_level(def.children, &full_pattern, next_id)?;
        nodes.push(RouteNode {
            id,
            path: def.path,
            full_path: full_pattern.to_string(),
            name: def.name,
            component: def.component,
            redirect: def.redirect,
            children,
            pattern,
            full_pattern,
        });
    }
    Ok(nodes)
}

fn check_siblings(nodes: &[RouteNode]) -> Result<(), TableError> {
    if let Some(pos) = nodes.iter().position(|n| n.pattern.is_catch_all()) {
        if pos + 1 != nodes.len() {
            return Err(TableError::CatchAllNotLast(nodes[pos].path.clone()));
        }
    }
    for node in nodes {
        check_siblings(&node.children)?;
    }
    Ok(())
}

/// Strip query and fragment, collapse repeated and trailing slashes.
pub fn normalize_path(location: &str) -> String {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let segments = split_segments(&location[..end]);
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::ParamValue;

    fn sample() -> Vec<RouteDef> {
        vec![
            RouteDef::new("/").name("home").children(vec![
                RouteDef::new("items/:id").name("item"),
                RouteDef::new("files/:rest(.*)*").name("files"),
            ]),
            RouteDef::redirect("/:pathMatch(.*)*", "/"),
        ]
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("//views///depth/"), "/views/depth");
        assert_eq!(normalize_path("/drone?x=1#top"), "/drone");
    }

    #[test]
    fn test_ids_are_preorder() {
        let table = RouteTable::new(sample()).unwrap();
        let ids: Vec<_> = table.records().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(table.id_of("files"), Some(NodeId(2)));
        assert_eq!(table.record(NodeId(1)).unwrap().path, "/items/:id");
    }

    #[test]
    fn test_param_capture_and_location() {
        let table = RouteTable::new(sample()).unwrap();
        let res = table.resolve("/items/42").unwrap();
        assert_eq!(res.names(), vec!["home", "item"]);
        assert_eq!(res.params.get("id"), Some(&ParamValue::from("42")));

        let mut params = Params::new();
        params.insert("id".into(), "9".into());
        assert_eq!(table.location_for("item", &params).unwrap(), "/items/9");
        assert_eq!(
            table.location_for("item", &Params::new()).unwrap_err(),
            ResolveError::MissingParam {
                name: "item".into(),
                param: "id".into()
            }
        );
    }

    #[test]
    fn test_redirect_keeps_captured_suffix() {
        let table = RouteTable::new(sample()).unwrap();
        let res = table.resolve("/nope/at/all").unwrap();
        assert_eq!(res.path, "/");
        assert_eq!(res.names(), vec!["home"]);

        let from = res.redirected_from.unwrap();
        assert_eq!(from.path, "/nope/at/all");
        assert_eq!(
            from.params.get("pathMatch"),
            Some(&ParamValue::Repeated(vec![
                "nope".into(),
                "at".into(),
                "all".into()
            ]))
        );
    }

    #[test]
    fn test_no_catch_all_reports_no_match() {
        let table = RouteTable::new(vec![RouteDef::new("/").name("home")]).unwrap();
        assert_eq!(
            table.resolve("/missing").unwrap_err(),
            ResolveError::NoMatch("/missing".into())
        );
    }

    #[test]
    fn test_redirect_loop_is_bounded() {
        let table = RouteTable::new(vec![
            RouteDef::new("/").name("home"),
            RouteDef::redirect("/a", "/b"),
            RouteDef::redirect("/b", "/a"),
        ])
        .unwrap();
        assert_eq!(
            table.resolve("/a").unwrap_err(),
            ResolveError::RedirectLoop("/a".into())
        );
    }

    #[test]
    fn test_construction_invariants() {
        assert_eq!(
            RouteTable::new(vec![RouteDef::new("/drone")]).unwrap_err(),
            TableError::MissingRoot
        );
        assert_eq!(
            RouteTable::new(vec![RouteDef::new("/"), RouteDef::new("")]).unwrap_err(),
            TableError::DuplicateRoot(2)
        );
        assert_eq!(
            RouteTable::new(vec![
                RouteDef::redirect("/:pathMatch(.*)*", "/"),
                RouteDef::new("/"),
            ])
            .unwrap_err(),
            TableError::CatchAllNotLast("/:pathMatch(.*)*".into())
        );
        assert_eq!(
            RouteTable::new(vec![
                RouteDef::new("/"),
                RouteDef::redirect("/old", "/").children(vec![RouteDef::new("x")]),
            ])
            .unwrap_err(),
            TableError::RedirectWithTarget("/old".into())
        );
    }

    #[test]
    fn test_duplicate_names_fail_fast() {
        let err = RouteTable::new(vec![RouteDef::new("/").name("home").children(vec![
            RouteDef::new("a").name("dup"),
            RouteDef::new("b").name("dup"),
        ])])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateName("dup".into()));
    }
}
