//! Request path resolution.
//!
//! The first path segment names the operation. An empty path redirects to
//! `about`. Unknown names are not rejected here; the executor reports them
//! as `UnknownOperation` so every transport gets the same error.

/// Where a request path leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Client should re-issue the request against this operation
    Redirect(&'static str),
    /// Dispatch to the named operation
    Op(String),
}

/// Resolve a request path such as `/read` or `hisRead?x=1`
pub fn resolve(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.split('/').find(|seg| !seg.is_empty()) {
        Some(op) => Route::Op(op.to_string()),
        None => Route::Redirect("about"),
    }
}
