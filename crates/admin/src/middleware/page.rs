//! Layout data for back-office pages.

use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::request::Parts,
};
use tower_sessions::Session;

use super::auth::{AdminAuthRejection, RequireAdmin};
use super::flash::{self, Flash};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// What `base.html` needs: the signed-in admin, the active menu entry and
/// pending notices. Requires authentication like [`RequireAdmin`].
///
/// Extracting this consumes pending flash messages, so only handlers that
/// render a full page should ask for it.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub admin: CurrentAdmin,
    pub current_path: String,
    pub flashes: Vec<Flash>,
}

impl AdminPage {
    /// Build the layout after the handler has decided to render.
    pub async fn new(session: &Session, admin: CurrentAdmin, path: &str) -> Self {
        Self {
            admin,
            current_path: path.to_owned(),
            flashes: flash::take(session).await,
        }
    }

    /// Whether a menu entry should be highlighted.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        if section == "/" {
            self.current_path == "/" || self.current_path == "/dashboard"
        } else {
            self.current_path.starts_with(section)
        }
    }
}

/// Full request path, including the prefix a nested router strips.
fn full_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.0.path())
}

impl<S> FromRequestParts<S> for AdminPage
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(parts, state).await?;
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        Ok(Self::new(session, admin, full_path(parts)).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, Uri};

    use auxilia_core::{Email, UserId};

    use super::*;

    fn page(path: &str) -> AdminPage {
        AdminPage {
            admin: CurrentAdmin {
                id: UserId::new(1),
                email: Email::parse("root@auxilia.test").unwrap(),
                name: "Root".to_owned(),
            },
            current_path: path.to_owned(),
            flashes: Vec::new(),
        }
    }

    #[test]
    fn test_menu_highlighting() {
        assert!(page("/dashboard").is_active("/"));
        assert!(!page("/products").is_active("/"));
        assert!(page("/products/3/edit").is_active("/products"));
        assert!(!page("/orders").is_active("/users"));
    }

    #[test]
    fn test_nested_route_keeps_its_prefix() {
        // A router nested under /products sees only the suffix.
        let (mut parts, ()) = Request::builder()
            .uri("/3/edit")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(OriginalUri(Uri::from_static("/products/3/edit")));
        assert_eq!(full_path(&parts), "/products/3/edit");
        assert!(page(full_path(&parts)).is_active("/products"));
        assert!(!page(full_path(&parts)).is_active("/"));
    }

    #[test]
    fn test_top_level_route_without_original_uri() {
        let (parts, ()) = Request::builder()
            .uri("/dashboard")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(full_path(&parts), "/dashboard");
    }
}
