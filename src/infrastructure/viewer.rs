// Viewer Context - who is acting on a request, and whether they may write

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerRole {
    Anonymous,
    Administrator,
}

/// Request-scoped identity handed to every store operation
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub role: ViewerRole,
}

impl ViewerContext {
    pub fn anonymous(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            role: ViewerRole::Anonymous,
        }
    }

    pub fn administrator(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            role: ViewerRole::Administrator,
        }
    }

    /// Viewer for in-process callers such as seeders and the content platform bridge
    pub fn system() -> Self {
        Self::administrator(format!("system-{}", Uuid::new_v4()))
    }

    pub fn is_administrator(&self) -> bool {
        self.role == ViewerRole::Administrator
    }
}

/// Authorization predicate evaluated before any store write
pub trait WritePolicy: Send + Sync {
    fn can_write(&self, viewer: &ViewerContext) -> bool;

    fn name(&self) -> &str;
}

/// Default policy: only administrators may create, update or delete preserves
#[derive(Debug, Default, Clone, Copy)]
pub struct AdministratorsOnly;

impl WritePolicy for AdministratorsOnly {
    fn can_write(&self, viewer: &ViewerContext) -> bool {
        viewer.is_administrator()
    }

    fn name(&self) -> &str {
        "administrators_only"
    }
}

/// Wraps an arbitrary predicate, e.g. a capability check supplied by the host platform
pub struct PredicatePolicy<F> {
    name: String,
    predicate: F,
}

impl<F> PredicatePolicy<F>
where
    F: Fn(&ViewerContext) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> WritePolicy for PredicatePolicy<F>
where
    F: Fn(&ViewerContext) -> bool + Send + Sync,
{
    fn can_write(&self, viewer: &ViewerContext) -> bool {
        (self.predicate)(viewer)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
