//! Radix-tree route table shared by a router and every router derived from it.
//!
//! One [`matchit`] tree per HTTP method plus one tree for routes registered
//! without a method filter. The table only ever sees fully composed
//! handlers; it knows nothing about middleware.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

#[derive(Default)]
struct Table {
    by_method: HashMap<Method, MatchitRouter<BoxedHandler>>,
    any: MatchitRouter<BoxedHandler>,
}

/// Handle to a shared route table, mounted at a path prefix.
///
/// Cloning shares the table. [`Mux::subrouter`] shares it too, with a longer
/// prefix.
#[derive(Clone, Default)]
pub(crate) struct Mux {
    table: Arc<RwLock<Table>>,
    prefix: String,
    /// First prefix segment on the way down that lacked a leading `/`.
    /// Every registration below it fails.
    bad_prefix: Option<String>,
}

/// What a lookup found.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but only for these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// A registered route, as returned by the `Router` registration methods.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Route {
    method: Option<Method>,
    path: String,
}

impl Route {
    /// The method filter; `None` means the route answers every method.
    pub fn method(&self) -> Option<&Method> { self.method.as_ref() }

    /// The full pattern, prefixes included.
    pub fn path(&self) -> &str { &self.path }
}

impl Mux {
    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Same table, mounted under `prefix` relative to this mux.
    pub(crate) fn subrouter(&self, prefix: &str) -> Self {
        let bad_prefix = self.bad_prefix.clone()
            .or_else(|| check(prefix).err().map(|_| prefix.to_owned()));
        Self {
            table: Arc::clone(&self.table),
            prefix: join(&self.prefix, prefix),
            bad_prefix,
        }
    }

    pub(crate) fn register(
        &self,
        method: Option<Method>,
        pattern: &str,
        handler: BoxedHandler,
    ) -> Result<Route, Error> {
        if let Some(prefix) = &self.bad_prefix {
            return Err(Error::Pattern { pattern: prefix.clone() });
        }
        check(pattern)?;
        let path = join(&self.prefix, pattern);
        if path.is_empty() {
            return Err(Error::Pattern { pattern: path });
        }
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let tree = match &method {
            Some(m) => table.by_method.entry(m.clone()).or_default(),
            None => &mut table.any,
        };
        tree.insert(path.as_str(), handler)
            .map_err(|source| Error::Route { path: path.clone(), source })?;
        Ok(Route { method, path })
    }

    /// Method tree first, then the any-method tree.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);

        let matched = table.by_method.get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| table.any.at(path).ok());

        if let Some(matched) = matched {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let mut allowed: Vec<Method> = table.by_method.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Lookup::MethodNotAllowed(allowed)
    }

    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        // The lock is released before any handler runs.
        let found = self.lookup(&req.method, &req.path);
        match found {
            Lookup::Found(handler, params) => {
                req.params = params;
                handler.call(req).await
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header("allow", &allow)
                    .no_body()
            }
            Lookup::NotFound => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

/// Patterns and prefixes are either empty or start with `/`.
fn check(pattern: &str) -> Result<(), Error> {
    if pattern.is_empty() || pattern.starts_with('/') {
        Ok(())
    } else {
        Err(Error::Pattern { pattern: pattern.to_owned() })
    }
}

/// `"/api/" + "/items"` → `"/api/items"`. An empty pattern mounts at the
/// prefix itself.
fn join(prefix: &str, pattern: &str) -> String {
    if pattern.is_empty() {
        return prefix.to_owned();
    }
    match prefix.strip_suffix('/') {
        Some(trimmed) if pattern.starts_with('/') => format!("{trimmed}{pattern}"),
        _ => format!("{prefix}{pattern}"),
    }
}
