//! Prefix-based route table.

/// Ordered mapping from path prefix to backend base URL.
///
/// Resolution is first-match-wins in registration order; the table is
/// deliberately NOT sorted by prefix length, because registration order is
/// the observable precedence contract. Built once at startup, immutable
/// thereafter.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(String, String)>,
}

impl RouteTable {
    /// Build a route table from (prefix, backend base URL) pairs.
    #[must_use]
    pub fn new(routes: Vec<(String, String)>) -> Self {
        Self { routes }
    }

    /// Resolve a request path to its backend base URL.
    ///
    /// Returns the first registered backend whose prefix is a string
    /// prefix of `path`; `None` when nothing matches. Pure prefix test,
    /// no wildcards or patterns.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, backend)| backend.as_str())
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over the registered (prefix, backend) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(p, b)| (p.as_str(), b.as_str()))
    }
}
