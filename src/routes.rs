use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// Pages reachable through navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Home,
    About,
    Search,
    /// Prediction result; needs state handed over by [`Route::Search`].
    Predict,
    Error,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/home",
            Route::About => "/about",
            Route::Search => "/search",
            Route::Predict => "/predict",
            Route::Error => "/error",
        }
    }

    /// Links shown in the navigation bar.
    pub const NAV_LINKS: [(&'static str, Route); 3] = [
        ("Home", Route::Home),
        ("About", Route::About),
        ("Search", Route::Search),
    ];

    /// Links shown in the footer.
    pub const FOOTER_LINKS: [(&'static str, Route); 3] = [
        ("Home", Route::Home),
        ("About", Route::About),
        ("Prediction", Route::Predict),
    ];
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match normalized {
            "/" | "/home" => Ok(Route::Home),
            "/about" => Ok(Route::About),
            "/search" => Ok(Route::Search),
            "/predict" | "/prediction" => Ok(Route::Predict),
            "/error" => Ok(Route::Error),
            _ => Err(RouteError(path.to_string())),
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
    fn test_root_alias() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("/home".parse::<Route>().unwrap(), Route::Home);
    }

    #[test]
    fn test_all_paths_round_trip() {
        for route in [Route::Home, Route::About, Route::Search, Route::Predict, Route::Error] {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn test_prediction_alias_and_trailing_slash() {
        assert_eq!("/prediction".parse::<Route>().unwrap(), Route::Predict);
        assert_eq!("/search/".parse::<Route>().unwrap(), Route::Search);
    }

    #[test]
    fn test_unknown_path() {
        assert_eq!(
            "/admin".parse::<Route>(),
            Err(RouteError("/admin".to_string()))
        );
    }
}
