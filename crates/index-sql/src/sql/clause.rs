//! Clause composition.
//!
//! Nearly every clause of a source query is a variable-length list whose
//! members may or may not be present: the inheritance condition only for
//! subclasses, the delta predicate only with a delta strategy, the range
//! placeholder only when ranging is enabled. [`ClauseBuilder`] collects
//! those members in order and joins the non-blank ones, so no caller ever
//! has to guard against doubled or dangling separators.

/// Separator for SELECT and GROUP BY lists.
pub const LIST_SEPARATOR: &str = ", ";

/// Separator for WHERE conjunctions.
pub const AND_SEPARATOR: &str = " AND ";

/// One member of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The SQL text.
    pub sql: String,
    /// True when the text is empty or whitespace only.
    pub blank: bool,
}

impl Fragment {
    /// Wraps a piece of SQL, recording whether it is blank.
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let blank = sql.trim().is_empty();
        Self { sql, blank }
    }
}

/// Ordered collection of clause members with an optional leading member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseBuilder {
    leading: Option<Fragment>,
    fragments: Vec<Fragment>,
}

impl ClauseBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose output starts with `leading`.
    pub fn with_leading(leading: impl Into<String>) -> Self {
        Self {
            leading: Some(Fragment::new(leading)),
            fragments: Vec::new(),
        }
    }

    /// Appends a member.
    pub fn add(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.fragments.push(Fragment::new(fragment));
        self
    }

    /// Appends a member if present.
    pub fn add_optional<S: Into<String>>(&mut self, fragment: Option<S>) -> &mut Self {
        if let Some(fragment) = fragment {
            self.add(fragment);
        }
        self
    }

    /// Appends every member of `group` in order.
    pub fn add_all<I>(&mut self, group: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.fragments.extend(group.into_iter().map(Fragment::new));
        self
    }

    /// Appends one group of members, returning the builder.
    pub fn compose<I>(mut self, group: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.add_all(group);
        self
    }

    /// Returns true if no non-blank member exists.
    pub fn is_empty(&self) -> bool {
        self.members().next().is_none()
    }

    /// Iterates the non-blank members, leading member first.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.leading
            .iter()
            .chain(self.fragments.iter())
            .filter(|f| !f.blank)
            .map(|f| f.sql.as_str())
    }

    /// Joins the non-blank members with `separator`.
    ///
    /// Yields an empty string when there is nothing to join.
    pub fn separated(&self, separator: &str) -> String {
        self.members().collect::<Vec<_>>().join(separator)
    }
}
