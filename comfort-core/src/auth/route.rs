/// Views a client can navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Callback,
    Dashboard,
    /// Detail view for one city id.
    Weather(String),
}

impl Route {
    /// Resolve a navigation path. The root path and anything unknown land on `/login`.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["callback"] => Route::Callback,
            ["dashboard"] => Route::Dashboard,
            ["weather", city] => Route::Weather((*city).to_string()),
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Callback => "/callback".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Weather(city) => format!("/weather/{city}"),
        }
    }

    /// Whether entering this view requires a signed-in session.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Weather(_))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
