use logsieve_types::ParsedLogEntry;

/// Validated equality filter over parsed log entries
///
/// Built by [`crate::validate`]. An absent field places no constraint on entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Status code (digits only)
    pub(crate) code: Option<String>,

    /// HTTP method (letters only)
    pub(crate) method: Option<String>,

    /// Authenticated user (letters and underscores only)
    pub(crate) user: Option<String>,
}

impl QueryFilter {
    /// Filter that matches every entry
    pub fn any() -> Self {
        Self::default()
    }

    /// Check if a log entry matches this filter
    pub fn matches(&self, entry: &ParsedLogEntry) -> bool {
        field_matches(self.code.as_deref(), &entry.status_code)
            && field_matches(self.method.as_deref(), &entry.http_method)
            && field_matches(self.user.as_deref(), &entry.authenticated_user)
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.method.is_none() && self.user.is_none()
    }
}

/// Case-sensitive equality, or always true when the filter field is absent
fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
    wanted.is_none_or(|w| w == actual)
}
