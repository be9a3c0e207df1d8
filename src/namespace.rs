//! Namespace Extractor.
//!
//! Walks the root application and, recursively, every application mounted
//! into it. Collects each route together with the application it was declared
//! in, and every declared namespace keyed by its name (the namespace path
//! without its leading slash).

use crate::paths::namespace_name;
use crate::source::{AppDescriptor, NamespaceDescriptor, RouteDescriptor, RouteSource};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// A route together with the application it was declared in.
#[derive(Debug, Clone)]
pub struct MountedRoute {
    pub route: Arc<RouteDescriptor>,
    /// Name of the declaring application, used as translation scope
    pub app: String,
}

impl MountedRoute {
    pub fn new(route: Arc<RouteDescriptor>, app: impl Into<String>) -> Self {
        Self {
            route,
            app: app.into(),
        }
    }
}

/// Everything discovered by one walk over the application graph.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Routes in declaration order, mounted applications expanded in place
    pub routes: Vec<MountedRoute>,
    /// Declared namespaces by name; a later declaration of the same name
    /// replaces the configuration but keeps the first position
    pub namespaces: IndexMap<String, NamespaceDescriptor>,
}

/// Discovers routes and namespaces reachable from a route source's root.
pub struct NamespaceExtractor<'a, S: RouteSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: RouteSource + ?Sized> NamespaceExtractor<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Walks the application graph starting at the root application.
    ///
    /// Each application is visited at most once; mounting an application that
    /// is already being (or has been) walked is logged and skipped.
    pub fn extract(&self) -> Discovery {
        let mut discovery = Discovery::default();
        let mut visited = HashSet::new();
        self.visit(self.source.root(), &mut discovery, &mut visited);

        debug!(
            "Discovered {} routes and {} namespaces",
            discovery.routes.len(),
            discovery.namespaces.len()
        );
        discovery
    }

    fn visit(&self, app: &AppDescriptor, discovery: &mut Discovery, visited: &mut HashSet<String>) {
        if !visited.insert(app.name.clone()) {
            warn!("App `{}` is mounted more than once or cyclically, skipping", app.name);
            return;
        }
        debug!("Walking app `{}` ({} endpoints)", app.name, app.endpoints.len());

        for endpoint in &app.endpoints {
            if let Some(namespace) = &endpoint.namespace {
                let name = namespace_name(&namespace.path);
                if !name.is_empty() {
                    discovery.namespaces.insert(name, namespace.clone());
                }
            }

            discovery.routes.extend(
                endpoint
                    .routes
                    .iter()
                    .map(|route| MountedRoute::new(Arc::clone(route), app.name.as_str())),
            );

            if let Some(mounted) = &endpoint.mounts {
                match self.source.app(mounted) {
                    Some(child) => self.visit(child, discovery, visited),
                    None => warn!("App `{}` mounts unknown app `{}`", app.name, mounted),
                }
            }
        }
    }
}
