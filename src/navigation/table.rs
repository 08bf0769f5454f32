//! Route table — static path-to-view mapping with per-route access guards.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::pattern::{RouteParams, RoutePattern, normalize_path, split_path};
use super::view::{Layout, View};
use crate::error::RouteError;
use crate::session::Session;

/// Path the login redirect points at.
pub const LOGIN_PATH: &str = "/login";

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// One row of the route table.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub access: Access,
    pub view: View,
    /// Rendered instead of `view`, in the admin layout, when an admin is
    /// logged in.
    pub admin_view: Option<View>,
}

impl RouteEntry {
    pub fn new(pattern: &str, access: Access, view: View) -> Result<Self, RouteError> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            access,
            view,
            admin_view: None,
        })
    }

    pub fn with_admin_view(mut self, view: View) -> Self {
        self.admin_view = Some(view);
        self
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewSelection {
    Render {
        layout: Layout,
        view: View,
        params: RouteParams,
    },
    RedirectToLogin {
        /// Where to go once logged in.
        return_to: String,
    },
}

impl ViewSelection {
    fn render(layout: Layout, view: View, params: RouteParams) -> Self {
        Self::Render {
            layout,
            view,
            params,
        }
    }

    fn not_found() -> Self {
        Self::render(Layout::Site, View::NotFound, RouteParams::default())
    }

    /// The rendered view; `Login` for a redirect.
    pub fn view(&self) -> View {
        match self {
            Self::Render { view, .. } => *view,
            Self::RedirectToLogin { .. } => View::Login,
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            Self::Render { layout, .. } => *layout,
            Self::RedirectToLogin { .. } => Layout::Site,
        }
    }

    pub fn params(&self) -> Option<&RouteParams> {
        match self {
            Self::Render { params, .. } => Some(params),
            Self::RedirectToLogin { .. } => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectToLogin { .. })
    }
}

/// Ordered route table. First match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table, rejecting patterns that collide with an earlier one.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.pattern.shape()) {
                return Err(RouteError::Duplicate(entry.pattern.as_str().to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The application's route table.
    pub fn standard() -> Self {
        use Access::*;

        let rows: &[(&str, Access, View)] = &[
            ("/", Public, View::Home),
            ("/login", Public, View::Login),
            ("/register", Public, View::Register),
            ("/adoptions", Public, View::AdoptionList),
            ("/adoptions/new", Authenticated, View::CreateAdoption),
            ("/adoptions/:id", Public, View::AdoptionDetail),
            ("/lost", Public, View::LostPetList),
            ("/lost/new", Authenticated, View::ReportLostPet),
            ("/lost/:id", Public, View::LostPetDetail),
            ("/help", Public, View::Help),
            ("/help/ask", Authenticated, View::AskQuestion),
            ("/help/:id", Public, View::QuestionDetail),
            ("/donations", Public, View::Donations),
            ("/profile", Authenticated, View::Profile),
            ("/admin", Admin, View::AdminDashboard),
            ("/admin/ads", Admin, View::AdminAds),
            ("/admin/questions", Admin, View::AdminQuestions),
            ("/admin/users", Admin, View::AdminUsers),
        ];

        let entries = rows
            .iter()
            .map(|(pattern, access, view)| {
                let entry = RouteEntry::new(pattern, *access, *view)
                    .expect("standard route patterns are well-formed");
                if *view == View::Home {
                    entry.with_admin_view(View::AdminDashboard)
                } else {
                    entry
                }
            })
            .collect();

        Self::new(entries).expect("standard route patterns are distinct")
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Select the view for `path` given the current session.
    ///
    /// Total: unmatched paths render `NotFound` in the site layout.
    pub fn resolve(&self, path: &str, session: Option<&Session>) -> ViewSelection {
        let segments = split_path(path);

        let Some((entry, params)) = self
            .entries
            .iter()
            .find_map(|e| e.pattern.matches(&segments).map(|p| (e, p)))
        else {
            debug!(path, "No route matched");
            return ViewSelection::not_found();
        };

        let selection = match (entry.access, session) {
            (Access::Authenticated | Access::Admin, None) => ViewSelection::RedirectToLogin {
                return_to: normalize_path(path),
            },
            (Access::Admin, Some(s)) if !s.is_admin() => ViewSelection::not_found(),
            (Access::Admin, Some(_)) => ViewSelection::render(Layout::Admin, entry.view, params),
            (_, Some(s)) if s.is_admin() => match entry.admin_view {
                Some(view) => ViewSelection::render(Layout::Admin, view, params),
                None => ViewSelection::render(Layout::Site, entry.view, params),
            },
            _ => ViewSelection::render(Layout::Site, entry.view, params),
        };

        debug!(
            path,
            pattern = entry.pattern.as_str(),
            view = %selection.view(),
            "Resolved route"
        );
        selection
    }
}
