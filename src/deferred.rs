//! Lazily evaluated configuration values.
//!
//! Descriptions, visibility flags, enum value lists and the base path may be
//! given either as plain values or as callbacks that are only invoked when a
//! document is rendered. Each callback is invoked at most once per render by
//! the code that consumes it.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A value that is either known up front or produced by a zero-argument callback.
pub enum Deferred<T> {
    Value(T),
    Lazy(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Deferred<T> {
    /// Create a deferred value backed by a callback
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Deferred::Lazy(Arc::new(f))
    }

    /// Produce the value, invoking the callback if there is one
    pub fn resolve(&self) -> T {
        match self {
            Deferred::Value(value) => value.clone(),
            Deferred::Lazy(f) => f(),
        }
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        match self {
            Deferred::Value(value) => Deferred::Value(value.clone()),
            Deferred::Lazy(f) => Deferred::Lazy(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Deferred::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Deferred::Value(value)
    }
}

impl From<&str> for Deferred<String> {
    fn from(value: &str) -> Self {
        Deferred::Value(value.to_string())
    }
}

/// The allowed values of a parameter or property.
#[derive(Clone)]
pub enum ValueSet {
    List(Vec<Value>),
    /// Integer range; `inclusive` selects `a..b` (true) versus `a...b` (false)
    Range { start: i64, end: i64, inclusive: bool },
    Lazy(Arc<dyn Fn() -> Vec<Value> + Send + Sync>),
}

impl ValueSet {
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        ValueSet::Lazy(Arc::new(f))
    }

    /// Materialize the value list
    pub fn materialize(&self) -> Vec<Value> {
        match self {
            ValueSet::List(values) => values.clone(),
            ValueSet::Range {
                start,
                end,
                inclusive,
            } => {
                let end = if *inclusive { *end } else { end - 1 };
                (*start..=end).map(Value::from).collect()
            }
            ValueSet::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSet::List(values) => f.debug_tuple("List").field(values).finish(),
            ValueSet::Range {
                start,
                end,
                inclusive,
            } => {
                let dots = if *inclusive { ".." } else { "..." };
                write!(f, "Range({}{}{})", start, dots, end)
            }
            ValueSet::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Base URL of the incoming documentation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub base_url: String,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Configured `basePath` of resource documents.
#[derive(Clone)]
pub enum BasePath {
    /// Absolute URL, or a path joined onto the request's base URL
    Literal(String),
    Lazy(Arc<dyn Fn(&RequestContext) -> String + Send + Sync>),
}

impl BasePath {
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        BasePath::Lazy(Arc::new(f))
    }
}

impl fmt::Debug for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasePath::Literal(path) => f.debug_tuple("Literal").field(path).finish(),
            BasePath::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
