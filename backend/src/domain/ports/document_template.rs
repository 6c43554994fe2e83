//! Port for the word-processor template used to render user documents.

use std::collections::BTreeMap;

use super::define_port_error;

/// Placeholder values keyed by field name, without braces.
pub type Placeholders = BTreeMap<String, String>;

define_port_error! {
    /// Errors raised while rendering the document template.
    pub enum DocumentTemplateError {
        /// The template file is missing or not a readable package.
        Open { message: String } => "could not open template file: {message}",
        /// A template part could not be rewritten.
        Substitute { message: String } => "could not replace template fields: {message}",
    }
}

/// Renders the configured template with `{field}` placeholders filled in.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentTemplate: Send + Sync {
    /// Produce a fresh document; the template itself is never modified.
    fn render(&self, placeholders: &Placeholders) -> Result<Vec<u8>, DocumentTemplateError>;
}
