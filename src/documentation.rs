//! The mounted documentation service.
//!
//! [`Documentation::mount`] walks the route source once, registers the two
//! documentation routes, validates model references and aggregates resources.
//! The result is immutable and shared behind an `Arc`, so a `Documentation`
//! can be cloned into request handlers running on any number of threads.

use crate::aggregator::{Aggregation, RouteAggregator};
use crate::config::DocumentationConfig;
use crate::content_types::FormatSettings;
use crate::deferred::RequestContext;
use crate::error::{Error, Result};
use crate::listing::{ListingAssembler, ResourceListing};
use crate::models::ModelResolver;
use crate::namespace::{MountedRoute, NamespaceExtractor};
use crate::parameters::RouteDoc;
use crate::resource_doc::{ResourceDocBuilder, ResourceDocument};
use crate::source::{HttpMethod, ModelRegistry, ParamDecl, RouteDescriptor, RouteSource};
use http::header::{self, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

const NAME_PARAM_DESCRIPTION: &str = "Resource name of mounted API";

#[derive(Debug)]
struct Inner {
    config: DocumentationConfig,
    aggregation: Aggregation,
    models: ModelRegistry,
    formats: FormatSettings,
    root_name: String,
}

/// Documentation of one mounted application.
#[derive(Debug, Clone)]
pub struct Documentation {
    inner: Arc<Inner>,
}

impl Documentation {
    /// Mounts the documentation service into `source`'s root application.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownModel` if a pre-seeded model, a route entity, a
    /// response-code model or a documented sub-model is not registered.
    pub fn mount<S: RouteSource + ?Sized>(source: &S, config: DocumentationConfig) -> Result<Self> {
        let root = source.root();
        info!("Mounting documentation for `{}` at {}", root.name, config.mount_path);

        let mut discovery = NamespaceExtractor::new(source).extract();
        discovery.routes.extend(documentation_routes(&config));

        let model_roots = config.models.iter().map(String::as_str).chain(
            discovery
                .routes
                .iter()
                .flat_map(|mounted| RouteDoc::new(mounted, &config, source.models()).model_references()),
        );
        let known = ModelResolver::new(source.models(), config.translator.as_ref()).closure(model_roots)?;
        debug!("Validated {} referenced models", known.len());

        let aggregator = if config.hide_documentation_path {
            RouteAggregator::new().hiding_mount_path(config.mount_path.clone())
        } else {
            RouteAggregator::new()
        };
        let aggregation = aggregator.build(&discovery.routes, &discovery.namespaces);
        info!(
            "Aggregated {} routes into {} resources",
            discovery.routes.len(),
            aggregation.resources.len()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                models: source.models().clone(),
                formats: root.formats.clone(),
                root_name: root.name.clone(),
                aggregation,
                config,
            }),
        })
    }

    pub fn config(&self) -> &DocumentationConfig {
        &self.inner.config
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.inner.aggregation
    }

    /// The top-level resource listing
    pub fn listing(&self) -> ResourceListing {
        self.assembler().listing()
    }

    /// Keys of every resource the listing shows
    pub fn resource_names(&self) -> Vec<String> {
        self.assembler()
            .listed_keys()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// The document of resource `name`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` for unknown resources and resources without a
    /// visible route.
    pub fn resource(&self, name: &str, request: &RequestContext) -> Result<ResourceDocument> {
        let inner = &self.inner;
        ResourceDocBuilder::new(&inner.aggregation, &inner.config, &inner.models, &inner.formats)
            .build(name, request)
    }

    /// Serves the two documentation endpoints.
    ///
    /// `GET <mount_path>[.<format>]` answers with the listing and
    /// `GET <mount_path>/<name>[.<format>]` with the resource document. Every
    /// response is JSON and carries permissive CORS headers.
    pub fn handle<B>(&self, request: &Request<B>) -> Response<String> {
        if *request.method() != Method::GET {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        let path = request.uri().path();
        let rest = match path.strip_prefix(self.inner.config.mount_path.as_str()) {
            Some(rest) => rest,
            None => return not_found(path),
        };

        if rest.is_empty() || rest.starts_with('.') {
            return json_response(StatusCode::OK, &self.listing());
        }

        let name = match resource_name(rest) {
            Some(name) => name,
            None => return not_found(path),
        };
        let context = RequestContext::new(request_base_url(request));
        match self.resource(name, &context) {
            Ok(document) => json_response(StatusCode::OK, &document),
            Err(Error::NotFound(_)) => not_found(path),
            Err(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                error_response(status, &err.to_string())
            }
        }
    }

    fn assembler(&self) -> ListingAssembler<'_> {
        let inner = &self.inner;
        ListingAssembler::new(&inner.aggregation, &inner.config, &inner.formats, &inner.root_name)
    }
}

/// The listing and resource routes the service registers under its mount path
fn documentation_routes(config: &DocumentationConfig) -> Vec<MountedRoute> {
    let app = config.class_name();

    let mut listing = RouteDescriptor::new(HttpMethod::Get, format!("{}(.:format)", config.mount_path));
    listing.description = Some(config.api_documentation.clone());

    let mut resource =
        RouteDescriptor::new(HttpMethod::Get, format!("{}/:name(.:format)", config.mount_path))
            .with_param(
                "name",
                ParamDecl::typed("String").required().described(NAME_PARAM_DESCRIPTION),
            );
    resource.description = Some(config.specific_api_documentation.clone());

    vec![
        MountedRoute::new(Arc::new(listing), app.as_str()),
        MountedRoute::new(Arc::new(resource), app),
    ]
}

/// `/name` or `/name.fmt` → `name`
fn resource_name(rest: &str) -> Option<&str> {
    let segment = rest.strip_prefix('/')?;
    let name = segment.split('.').next().unwrap_or_default();
    (!name.is_empty() && !name.contains('/')).then_some(name)
}

/// `scheme://authority` of the request, falling back to the `Host` header
fn request_base_url<B>(request: &Request<B>) -> String {
    let uri = request.uri();
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{}://{}", scheme, authority);
    }

    request
        .headers()
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_default()
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn not_found(path: &str) -> Response<String> {
    debug!("No documentation at {}", path);
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

fn error_response(status: StatusCode, message: &str) -> Response<String> {
    json_response(status, &ErrorBody { error: message })
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<String> {
    let (status, body) = match serde_json::to_string(body) {
        Ok(body) => (status, body),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{{\"error\":{:?}}}", err.to_string()),
        ),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("*"));
    response
}
