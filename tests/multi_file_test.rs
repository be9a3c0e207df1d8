// Manifests split across several files are merged before normalization
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use swagger_from_routes::{
    deferred::RequestContext,
    documentation::Documentation,
    source::{manifest::Manifest, RouteSource},
};
use tempfile::TempDir;

fn fixture_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/store"))
}

fn store_docs() -> Documentation {
    let manifest = Manifest::load(fixture_dir()).expect("Failed to load store manifests");
    Documentation::mount(&manifest.catalog, manifest.config).expect("Failed to mount documentation")
}

#[test]
fn test_directory_manifest_is_merged() {
    let manifest = Manifest::load(fixture_dir()).unwrap();

    assert_eq!(manifest.catalog.root().name, "Store");
    assert!(manifest.catalog.app("Catalog").is_some());
    assert_eq!(manifest.catalog.models().len(), 2);
    assert_eq!(manifest.config.mount_path, "/api_docs");
    assert_eq!(manifest.config.api_version.as_deref(), Some("2"));
}

#[test]
fn test_listing_across_files() {
    let docs = store_docs();

    let listing: Value = serde_json::to_value(docs.listing()).unwrap();

    assert_eq!(
        listing["apis"],
        json!([
            {"path": "/orders.{format}", "description": "Operations about orders"},
            {"path": "/Product-Catalog.{format}", "description": "Browse the catalog"}
        ])
    );
    assert_eq!(
        listing["info"],
        json!({"description": "Orders and products", "title": "Store API"})
    );
}

#[test]
fn test_versioned_paths_and_relative_base_path() {
    let docs = store_docs();

    let orders = docs
        .resource("orders", &RequestContext::new("http://shop.example.org"))
        .unwrap();

    let paths: Vec<&str> = orders.apis.iter().map(|api| api.path.as_str()).collect();
    assert_eq!(paths, vec!["/2/orders.{format}", "/2/orders/{id}.{format}"]);
    assert_eq!(orders.base_path.as_deref(), Some("http://shop.example.org/v2"));

    let models: Value = serde_json::to_value(&orders.models).unwrap();
    assert_eq!(
        models,
        json!({
            "Order": {
                "id": "Order",
                "properties": {
                    "id": {"type": "integer", "description": "id"},
                    "items": {"items": {"$ref": "Product"}, "type": "array", "description": "items"}
                },
                "required": ["id"]
            },
            "Product": {
                "id": "Product",
                "properties": {
                    "sku": {"example": "SKU-1", "type": "string", "description": "sku"}
                }
            }
        })
    );
}

#[test]
fn test_standalone_display_name_resource() {
    let docs = store_docs();

    let catalog = docs.resource("Product-Catalog", &RequestContext::new("")).unwrap();

    assert_eq!(catalog.resource_path, "/products");
    assert_eq!(catalog.apis[0].operations[0].response_type, "Product");
}

#[test]
fn test_hidden_documentation_routes() {
    let docs = store_docs();

    assert_eq!(docs.resource_names(), vec!["orders", "Product-Catalog"]);
    assert!(docs.resource("api_docs", &RequestContext::new("")).is_err());
}

#[test]
fn test_duplicate_app_across_files_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = "apps:\n  - name: Api\n    endpoints: []\n";
    fs::write(temp_dir.path().join("a.yaml"), app).unwrap();
    fs::write(temp_dir.path().join("b.yaml"), app).unwrap();

    let err = Manifest::load(temp_dir.path()).unwrap_err();

    assert!(format!("{:#}", err).contains("duplicate app `Api`"));
}

#[test]
fn test_empty_directory_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let err = Manifest::load(temp_dir.path()).unwrap_err();

    assert!(err.to_string().contains("No manifest files found"));
}
