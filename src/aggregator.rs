//! Route Aggregator.
//!
//! Groups routes into resources. Every route is first bucketed under its
//! resource key (its first path segment). Declared namespaces then claim
//! routes out of their parent bucket:
//!
//! * a standalone namespace becomes its own resource and claims its own routes
//!   plus those of every nested namespace, except nested standalone subtrees;
//! * any other namespace folds its routes into the parent key's resource,
//!   unless it lies below a standalone namespace that already claims it.
//!
//! Routes no namespace claims stay under their own key. Each route ends up in
//! exactly one resource, and each resource lists its routes in declaration
//! order.

use crate::namespace::MountedRoute;
use crate::paths::{is_nested_namespace, namespace_key, resource_key, route_in_namespace};
use crate::source::NamespaceDescriptor;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// The immutable result of aggregation, built once per mounted service.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Resource key → routes, in output order
    pub resources: IndexMap<String, Vec<MountedRoute>>,
    /// Standalone resource identifier → name of the namespace it came from
    pub identifiers: IndexMap<String, String>,
    /// Declared namespaces by name
    pub namespaces: IndexMap<String, NamespaceDescriptor>,
}

impl Aggregation {
    /// Name of the namespace a resource originates from: the promoted
    /// namespace for standalone resources, otherwise the key itself
    pub fn namespace_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.identifiers.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn routes(&self, key: &str) -> Option<&[MountedRoute]> {
        self.resources.get(key).map(Vec::as_slice)
    }
}

/// Builds an [`Aggregation`] from discovered routes and namespaces.
#[derive(Debug, Clone, Default)]
pub struct RouteAggregator {
    hidden_mount_path: Option<String>,
}

type Bucket = Vec<(usize, MountedRoute)>;

impl RouteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every route whose path contains `mount_path`
    pub fn hiding_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.hidden_mount_path = Some(mount_path.into());
        self
    }

    /// Groups `routes` into resources according to `namespaces`.
    pub fn build(
        &self,
        routes: &[MountedRoute],
        namespaces: &IndexMap<String, NamespaceDescriptor>,
    ) -> Aggregation {
        let buckets = self.bucket_routes(routes);

        let standalone: Vec<&str> = namespaces
            .iter()
            .filter(|(_, namespace)| namespace.standalone)
            .map(|(name, _)| name.as_str())
            .collect();

        let mut claimed: HashSet<usize> = HashSet::new();
        let mut grouped: IndexMap<String, Bucket> = IndexMap::new();
        let mut identifiers = IndexMap::new();

        for (name, namespace) in namespaces {
            let parent_key = namespace_key(name);
            let bucket = match buckets.get(&parent_key) {
                Some(bucket) => bucket,
                None => {
                    debug!(
                        "Skipping namespace `{}`: no routes under resource `{}`",
                        name, parent_key
                    );
                    continue;
                }
            };

            if namespace.standalone {
                let identifier = namespace.standalone_identifier(name);
                let excluded: Vec<&str> = standalone
                    .iter()
                    .copied()
                    .filter(|other| is_nested_namespace(other, name))
                    .collect();

                let members = claim(bucket, &mut claimed, |route| {
                    owned_by_subtree(route, name, &excluded)
                });
                debug!(
                    "Standalone namespace `{}` becomes resource `{}` with {} routes",
                    name,
                    identifier,
                    members.len()
                );

                identifiers.insert(identifier.clone(), name.clone());
                grouped.entry(identifier).or_default().extend(members);
            } else {
                if let Some(ancestor) = standalone
                    .iter()
                    .find(|ancestor| is_nested_namespace(name, ancestor))
                {
                    debug!(
                        "Namespace `{}` is collected by standalone namespace `{}`",
                        name, ancestor
                    );
                    continue;
                }

                let members = claim(bucket, &mut claimed, |route| {
                    route_in_namespace(route.route.namespace.as_deref(), name)
                });
                grouped.entry(parent_key).or_default().extend(members);
            }
        }

        for (key, bucket) in &buckets {
            let leftovers = claim(bucket, &mut claimed, |_| true);
            if !leftovers.is_empty() {
                grouped.entry(key.clone()).or_default().extend(leftovers);
            }
        }

        let resources = grouped
            .into_iter()
            .map(|(key, mut members)| {
                members.sort_by_key(|(index, _)| *index);
                (key, members.into_iter().map(|(_, route)| route).collect())
            })
            .collect();

        Aggregation {
            resources,
            identifiers,
            namespaces: namespaces.clone(),
        }
    }

    /// Buckets routes by resource key; routes without a key are dropped.
    fn bucket_routes(&self, routes: &[MountedRoute]) -> IndexMap<String, Bucket> {
        let mut buckets: IndexMap<String, Bucket> = IndexMap::new();

        for (index, mounted) in routes.iter().enumerate() {
            let route = &mounted.route;
            if let Some(mount_path) = &self.hidden_mount_path {
                if route.path.contains(mount_path.as_str()) {
                    debug!("Hiding documentation route {}", route.path);
                    continue;
                }
            }

            match resource_key(&route.path, route.prefix.as_deref()) {
                Some(key) => buckets
                    .entry(key)
                    .or_default()
                    .push((index, mounted.clone())),
                None => debug!("Dropping route {} {}: empty resource key", route.method, route.path),
            }
        }

        buckets
    }
}

/// Takes every unclaimed route of `bucket` accepted by `accept`
fn claim<F>(bucket: &Bucket, claimed: &mut HashSet<usize>, accept: F) -> Bucket
where
    F: Fn(&MountedRoute) -> bool,
{
    let taken: Bucket = bucket
        .iter()
        .filter(|(index, route)| !claimed.contains(index) && accept(route))
        .cloned()
        .collect();
    for (index, _) in &taken {
        claimed.insert(*index);
    }
    taken
}

/// Whether a route belongs to namespace `name` or to a namespace nested below
/// it that is not inside one of the `excluded` standalone subtrees
fn owned_by_subtree(route: &MountedRoute, name: &str, excluded: &[&str]) -> bool {
    let owner = match route_namespace_name(route) {
        Some(owner) => owner,
        None => return false,
    };

    if owner == name {
        return true;
    }
    is_nested_namespace(owner, name)
        && !excluded
            .iter()
            .any(|sub| owner == *sub || is_nested_namespace(owner, sub))
}

/// The owning namespace's name, with any leading `:version` segment removed
fn route_namespace_name(route: &MountedRoute) -> Option<&str> {
    let namespace = route.route.namespace.as_deref()?;
    namespace
        .strip_prefix("/:version/")
        .or_else(|| namespace.strip_prefix('/'))
}
