//! NavigationController — tracks the current path and its resolved view.
//!
//! The session is passed in explicitly on every decision; the controller
//! never reads it from anywhere else.

use std::sync::Arc;

use tracing::info;

use super::pattern::normalize_path;
use super::table::{LOGIN_PATH, RouteTable, ViewSelection};
use crate::session::Session;

pub struct NavigationController {
    table: Arc<RouteTable>,
    current_path: String,
    selection: ViewSelection,
    /// Path a login redirect interrupted, revisited once a session appears.
    pending_return: Option<String>,
}

impl NavigationController {
    /// Start at `/`.
    pub fn new(table: Arc<RouteTable>, session: Option<&Session>) -> Self {
        let selection = table.resolve("/", session);
        Self {
            table,
            current_path: "/".to_string(),
            selection,
            pending_return: None,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn selection(&self) -> &ViewSelection {
        &self.selection
    }

    pub fn pending_return(&self) -> Option<&str> {
        self.pending_return.as_deref()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Go to `path`.
    ///
    /// A login redirect moves the current path to `/login` and remembers
    /// the requested path. Rendering any page other than `/login` forgets it.
    pub fn navigate(&mut self, path: &str, session: Option<&Session>) -> &ViewSelection {
        let selection = self.table.resolve(path, session);
        match &selection {
            ViewSelection::RedirectToLogin { return_to } => {
                info!(path = %return_to, "Login required, redirecting");
                self.pending_return = Some(return_to.clone());
                self.current_path = LOGIN_PATH.to_string();
            }
            ViewSelection::Render { view, .. } => {
                self.current_path = normalize_path(path);
                if self.current_path != LOGIN_PATH {
                    self.pending_return = None;
                }
                info!(path = %self.current_path, view = %view, "Navigated");
            }
        }
        self.selection = selection;
        &self.selection
    }

    /// Re-resolve after login or logout.
    ///
    /// Logging in while a redirect is pending continues to the interrupted
    /// path. Logging out drops it.
    pub fn on_session_change(&mut self, session: Option<&Session>) -> &ViewSelection {
        let target = match (session, self.pending_return.take()) {
            (Some(_), Some(pending)) => pending,
            _ => self.current_path.clone(),
        };
        self.navigate(&target, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{Layout, View};
    use crate::session::Role;

    fn controller() -> NavigationController {
        NavigationController::new(Arc::new(RouteTable::standard()), None)
    }

    #[test]
    fn starts_at_home() {
        let nav = controller();
        assert_eq!(nav.current_path(), "/");
        assert_eq!(nav.selection().view(), View::Home);
    }

    #[test]
    fn navigate_normalizes_path() {
        let mut nav = controller();
        let sel = nav.navigate("/adoptions/?sort=new", None);
        assert_eq!(sel.view(), View::AdoptionList);
        assert_eq!(nav.current_path(), "/adoptions");
    }

    #[test]
    fn redirect_then_login_continues_to_target() {
        let mut nav = controller();
        assert!(nav.navigate("/adoptions/new", None).is_redirect());
        assert_eq!(nav.current_path(), LOGIN_PATH);
        assert_eq!(nav.pending_return(), Some("/adoptions/new"));

        let user = Session::new("u1", Role::Regular, "Uma");
        let sel = nav.on_session_change(Some(&user));
        assert_eq!(sel.view(), View::CreateAdoption);
        assert_eq!(nav.current_path(), "/adoptions/new");
        assert!(nav.pending_return().is_none());
    }

    #[test]
    fn browsing_elsewhere_drops_pending_return() {
        let mut nav = controller();
        nav.navigate("/adoptions/new", None);
        nav.navigate("/donations", None);
        assert!(nav.pending_return().is_none());

        let user = Session::new("u1", Role::Regular, "Uma");
        let sel = nav.on_session_change(Some(&user));
        assert_eq!(sel.view(), View::Donations);
        assert_eq!(nav.current_path(), "/donations");
    }

    #[test]
    fn opening_login_page_keeps_pending_return() {
        let mut nav = controller();
        nav.navigate("/lost/new", None);
        nav.navigate("/login", None);
        assert_eq!(nav.pending_return(), Some("/lost/new"));

        let user = Session::new("u1", Role::Regular, "Uma");
        assert_eq!(nav.on_session_change(Some(&user)).view(), View::ReportLostPet);
    }

    #[test]
    fn login_switches_home_to_admin_dashboard() {
        let mut nav = controller();
        let admin = Session::new("a1", Role::Admin, "Ari");
        let sel = nav.on_session_change(Some(&admin));
        assert_eq!(sel.view(), View::AdminDashboard);
        assert_eq!(sel.layout(), Layout::Admin);

        let sel = nav.on_session_change(None);
        assert_eq!(sel.view(), View::Home);
        assert_eq!(sel.layout(), Layout::Site);
    }

    #[test]
    fn logout_on_protected_page_redirects() {
        let user = Session::new("u1", Role::Regular, "Uma");
        let mut nav = NavigationController::new(Arc::new(RouteTable::standard()), Some(&user));
        nav.navigate("/profile", Some(&user));
        assert_eq!(nav.selection().view(), View::Profile);

        let sel = nav.on_session_change(None);
        assert_eq!(
            sel,
            &ViewSelection::RedirectToLogin {
                return_to: "/profile".into()
            }
        );
    }

    #[test]
    fn regular_user_on_admin_path_gets_site_fallback() {
        let mut nav = controller();
        let user = Session::new("u1", Role::Regular, "Uma");
        nav.on_session_change(Some(&user));
        let sel = nav.navigate("/admin", Some(&user));
        assert_eq!(sel.view(), View::NotFound);
        assert_eq!(sel.layout(), Layout::Site);
    }
}
