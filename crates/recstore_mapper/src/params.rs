//! Mapper initialization parameters.

/// Parameters handed to a mapper at initialization time.
///
/// Carries the query to auto-select and a free-form type tag. The tag is
/// backend-specific: the LDAP mapper uses it to pick a query-preparation
/// strategy (`"user"` applies the username-lookup filter template) and the
/// XML mapper derives its element tag from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapperParams {
    /// Query to select during initialization, if any.
    pub query: Option<String>,
    /// Free-form record type tag.
    pub type_tag: Option<String>,
}

impl MapperParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query to auto-select.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the record type tag.
    #[must_use]
    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }
}
