use crate::error::{DeckError, Result};
use crate::types::RepositoryRef;

/// Navigable views: `/` and `/repository/:repository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Repository(RepositoryRef),
}

impl Route {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Route::Home);
        }

        match trimmed.strip_prefix("/repository/") {
            Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                Ok(Route::Repository(RepositoryRef::decode(segment)?))
            }
            _ => Err(DeckError::InvalidRoute(path.to_string())),
        }
    }

    /// Resolve a command-line target: a route path, a bare identifier, or nothing.
    pub fn from_target(target: Option<&str>) -> Result<Self> {
        match target {
            None => Ok(Route::Home),
            Some(t) if t.starts_with('/') => Route::parse(t),
            Some(t) => Ok(Route::Repository(RepositoryRef::decode(t)?)),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Repository(repo) => {
                format!("/repository/{}", urlencoding::encode(repo.as_str()))
            }
        }
    }
}
