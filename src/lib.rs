//! Swagger from Routes - Swagger 1.2 documentation from registered routes and models.
//!
//! This library derives a Swagger 1.2 resource listing and per-resource API
//! declarations from the route, namespace and model descriptors a host API
//! framework registers at boot. Routes are grouped into resources once, when
//! the documentation service is mounted; documents are assembled fresh for
//! every request from that immutable state.
//!
//! # Architecture
//!
//! 1. [`scanner`] and [`parser`] - find and read manifest files
//! 2. [`source`] - typed route, namespace and model descriptors, and the
//!    manifest normalization layer
//! 3. [`namespace`] - walks mounted applications, collecting routes and namespaces
//! 4. [`aggregator`] - groups routes into resources, honoring standalone namespaces
//! 5. [`parameters`] - per-route parameter and operation objects
//! 6. [`models`] - transitive model discovery and property schemas
//! 7. [`listing`] and [`resource_doc`] - the two documents
//! 8. [`documentation`] - the mounted service and its HTTP-shaped handler
//! 9. [`serializer`] - JSON and YAML output
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_routes::{
//!     deferred::RequestContext,
//!     documentation::Documentation,
//!     serializer::serialize_json,
//!     source::manifest::Manifest,
//! };
//! use std::path::Path;
//!
//! let manifest = Manifest::load(Path::new("./api.yaml")).unwrap();
//! let docs = Documentation::mount(&manifest.catalog, manifest.config).unwrap();
//!
//! println!("{}", serialize_json(&docs.listing()).unwrap());
//!
//! let request = RequestContext::new("https://api.example.org");
//! for name in docs.resource_names() {
//!     let document = docs.resource(&name, &request).unwrap();
//!     println!("{}", serialize_json(&document).unwrap());
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod content_types;
pub mod deferred;
pub mod documentation;
pub mod error;
pub mod i18n;
pub mod inflector;
pub mod listing;
pub mod markdown;
pub mod models;
pub mod namespace;
pub mod parameters;
pub mod parser;
pub mod paths;
pub mod resource_doc;
pub mod scanner;
pub mod serializer;
pub mod source;
pub mod types;
