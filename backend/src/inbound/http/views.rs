//! HTML page templates for the roster.
//!
//! Both pages are read once from `<static_dir>/users` when the server
//! starts; a missing or unreadable page stops startup. The list page marks
//! where the table rows go with [`ROWS_MARKER`]; the create page is served
//! as written.

use std::io;
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use chrono::SecondsFormat;

use crate::domain::User;

/// Roster list page, relative to the static directory.
pub const LIST_PAGE: &str = "users/list.html";
/// Create form page, relative to the static directory.
pub const CREATE_PAGE: &str = "users/create.html";
/// Placeholder in the list page replaced with one `<tr>` per user.
pub const ROWS_MARKER: &str = "{{rows}}";

/// Errors raised while loading page templates.
#[derive(Debug, thiserror::Error)]
pub enum PageTemplateError {
    /// A page could not be read.
    #[error("could not read page template {path}: {source}")]
    Read {
        /// Page path as configured.
        path: String,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// The list page has nowhere to put the rows.
    #[error("page template {path} has no rows marker")]
    MissingRows {
        /// Page path as configured.
        path: String,
    },
}

/// Page templates shared by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplates {
    list: String,
    create: String,
}

fn read_page(dir: &Dir, root: &Path, page: &str) -> Result<String, PageTemplateError> {
    dir.read_to_string(page)
        .map_err(|source| PageTemplateError::Read {
            path: root.join(page).display().to_string(),
            source,
        })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn user_row(user: &User) -> String {
    let id = user.id().to_string();
    let document = if user.is_ungenerated() {
        format!("<a href=\"/users/generate/{id}\">Generate</a>")
    } else {
        String::from("Generated")
    };
    format!(
        "<tr>\n    <td>{id}</td>\n    <td>{name}</td>\n    <td>{email}</td>\n    \
         <td>{status}</td>\n    <td>{created}</td>\n    <td>{document}</td>\n</tr>\n",
        name = escape_html(user.name().as_ref()),
        email = escape_html(user.email().as_ref()),
        status = user.status(),
        created = user.created_at().to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

impl PageTemplates {
    /// Build templates from page sources.
    ///
    /// # Errors
    /// Returns [`PageTemplateError::MissingRows`] when `list` lacks
    /// [`ROWS_MARKER`].
    pub fn new(
        list: impl Into<String>,
        create: impl Into<String>,
    ) -> Result<Self, PageTemplateError> {
        let list_source: String = list.into();
        if !list_source.contains(ROWS_MARKER) {
            return Err(PageTemplateError::MissingRows {
                path: LIST_PAGE.to_owned(),
            });
        }
        Ok(Self {
            list: list_source,
            create: create.into(),
        })
    }

    /// Read [`LIST_PAGE`] and [`CREATE_PAGE`] under `static_dir`.
    ///
    /// # Errors
    /// Returns [`PageTemplateError`] when a page is missing, unreadable or
    /// the list page lacks [`ROWS_MARKER`].
    pub fn load(static_dir: impl AsRef<Path>) -> Result<Self, PageTemplateError> {
        let root = static_dir.as_ref();
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|source| {
            PageTemplateError::Read {
                path: root.display().to_string(),
                source,
            }
        })?;
        Self::new(
            read_page(&dir, root, LIST_PAGE)?,
            read_page(&dir, root, CREATE_PAGE)?,
        )
    }

    /// Roster list with a generate link per pending user.
    #[must_use]
    pub fn users_page(&self, users: &[User]) -> String {
        let rows: String = users.iter().map(user_row).collect();
        self.list.replacen(ROWS_MARKER, &rows, 1)
    }

    /// Form posting `name` and `email` to `/users/create`.
    #[must_use]
    pub fn create_user_page(&self) -> &str {
        &self.create
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, UserId, UserName, UserStatus};
    use crate::inbound::http::test_utils::{CREATE_SOURCE, LIST_SOURCE, pages};
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn user(name: &str, status: UserStatus) -> User {
        User::restore(
            UserId::random(),
            UserName::new(name).expect("name"),
            Email::new("a@x.com").expect("email"),
            status,
            Utc::now(),
        )
    }

    #[fixture]
    fn static_dir() -> TempDir {
        let temp = TempDir::new().expect("temp dir");
        let root = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open temp");
        root.create_dir("users").expect("users dir");
        root.write(LIST_PAGE, LIST_SOURCE).expect("write list");
        root.write(CREATE_PAGE, CREATE_SOURCE).expect("write create");
        temp
    }

    #[rstest]
    fn users_page_escapes_names() {
        let html = pages().users_page(&[user("<script>alert('x')</script>", UserStatus::Ungenerated)]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[rstest]
    fn generate_links_only_for_pending_users() {
        let pending = user("Ana", UserStatus::Ungenerated);
        let done = user("Bo", UserStatus::Generated);
        let html = pages().users_page(&[pending.clone(), done.clone()]);

        assert!(html.contains(&format!("/users/generate/{}", pending.id())));
        assert!(!html.contains(&format!("/users/generate/{}", done.id())));
        assert!(html.contains("/users/export-data"));
        assert!(!html.contains(ROWS_MARKER));
    }

    #[rstest]
    fn pages_are_read_from_the_users_directory(static_dir: TempDir) {
        let loaded = PageTemplates::load(static_dir.path()).expect("pages load");
        assert_eq!(loaded, pages());
        assert!(loaded.create_user_page().contains(r#"action="/users/create""#));
    }

    #[rstest]
    #[case(CREATE_PAGE)]
    #[case(LIST_PAGE)]
    fn a_missing_page_fails_loading(static_dir: TempDir, #[case] page: &str) {
        std::fs::remove_file(static_dir.path().join(page)).expect("remove page");

        let err = PageTemplates::load(static_dir.path()).expect_err("page missing");

        assert!(matches!(err, PageTemplateError::Read { ref path, .. } if path.ends_with(page)));
    }

    #[rstest]
    fn a_list_page_without_rows_marker_is_rejected() {
        let err = PageTemplates::new("<table></table>", CREATE_SOURCE).expect_err("no marker");
        assert!(matches!(err, PageTemplateError::MissingRows { .. }));
    }
}
