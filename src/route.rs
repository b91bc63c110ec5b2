//! View routing and access gating.
//!
//! Every view declares an access level and [`decide`] maps a navigation
//! request onto what actually happens. The decision is pure: it depends only
//! on the authentication flag, the loading flag, and the requested view, so
//! the same inputs always produce the same outcome.

/// The screens the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Home,
    Convert,
    Transform,
    Profile,
    About,
}

/// Who may see a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Requires an authenticated session.
    Protected,
    /// Only shown while logged out; authenticated users are redirected away.
    PublicOnly,
    /// Visible to everyone regardless of session state.
    Open,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show the requested view.
    Render(View),
    /// Show a different view instead.
    Redirect(View),
    /// Session state is still being restored; show nothing view-specific yet.
    Pending,
}

/// Where an authenticated user lands after login or a blocked public view.
pub const AUTHENTICATED_LANDING: View = View::Home;

/// Where an unauthenticated user lands when a protected view is blocked.
pub const UNAUTHENTICATED_LANDING: View = View::Login;

impl View {
    pub fn access(self) -> Access {
        match self {
            View::Login | View::Register => Access::PublicOnly,
            View::About => Access::Open,
            View::Home | View::Convert | View::Transform | View::Profile => Access::Protected,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Register => "Register",
            View::Home => "Library",
            View::Convert => "Convert",
            View::Transform => "Transform",
            View::Profile => "Profile",
            View::About => "About",
        }
    }
}

/// Gate a navigation request against the current session state.
///
/// While the initial session restore is still in flight the decision is
/// always [`RouteDecision::Pending`], never a redirect: a redirect issued on
/// stale state would bounce a legitimately restored user through the login
/// view.
pub fn decide(authenticated: bool, loading: bool, requested: View) -> RouteDecision {
    if loading {
        return RouteDecision::Pending;
    }

    match requested.access() {
        Access::Open => RouteDecision::Render(requested),
        Access::Protected => {
            if authenticated {
                RouteDecision::Render(requested)
            } else {
                RouteDecision::Redirect(UNAUTHENTICATED_LANDING)
            }
        }
        Access::PublicOnly => {
            if authenticated {
                RouteDecision::Redirect(AUTHENTICATED_LANDING)
            } else {
                RouteDecision::Render(requested)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_always_yields_pending() {
        for view in [View::Login, View::Home, View::About] {
            assert_eq!(decide(false, true, view), RouteDecision::Pending);
            assert_eq!(decide(true, true, view), RouteDecision::Pending);
        }
    }

    #[test]
    fn protected_views_require_authentication() {
        for view in [View::Home, View::Convert, View::Transform, View::Profile] {
            assert_eq!(decide(true, false, view), RouteDecision::Render(view));
            assert_eq!(
                decide(false, false, view),
                RouteDecision::Redirect(View::Login)
            );
        }
    }

    #[test]
    fn public_only_views_reject_authenticated_users() {
        for view in [View::Login, View::Register] {
            assert_eq!(decide(false, false, view), RouteDecision::Render(view));
            assert_eq!(
                decide(true, false, view),
                RouteDecision::Redirect(View::Home)
            );
        }
    }

    #[test]
    fn open_views_render_for_everyone() {
        assert_eq!(decide(false, false, View::About), RouteDecision::Render(View::About));
        assert_eq!(decide(true, false, View::About), RouteDecision::Render(View::About));
    }

    #[test]
    fn decision_is_a_pure_function_of_its_inputs() {
        let first = decide(true, false, View::Convert);
        let second = decide(true, false, View::Convert);
        assert_eq!(first, second);
    }
}
