//! Top-level routes.

use std::fmt;

/// A top-level page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: login or chat, depending on the session.
    Home,
    /// `/privacy`: the static privacy policy.
    Privacy,
}

impl Route {
    /// All known routes, in declaration order.
    pub const ALL: [Route; 2] = [Route::Home, Route::Privacy];

    /// Resolves a path to a route.
    ///
    /// A trailing slash, a query string and a fragment are ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Home),
            "/privacy" => Some(Self::Privacy),
            _ => None,
        }
    }

    /// Returns the canonical path.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Privacy => "/privacy",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_paths() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path(""), Some(Route::Home));
        assert_eq!(Route::from_path("/privacy"), Some(Route::Privacy));
        assert_eq!(Route::from_path("/privacy/"), Some(Route::Privacy));
        assert_eq!(Route::from_path("/privacy?ref=footer"), Some(Route::Privacy));
        assert_eq!(Route::from_path("/?code=abc"), Some(Route::Home));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert_eq!(Route::from_path("/settings"), None);
        assert_eq!(Route::from_path("privacy"), None);
    }

    #[test]
    fn path_round_trips() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
