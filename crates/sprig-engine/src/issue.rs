use thiserror::Error;

/// A recoverable problem found while loading clips or a behavior graph.
///
/// Load issues never abort a load: the offending entry is skipped (or, for
/// dangling transitions, kept but made inert) and the issue is recorded in
/// a [`LoadReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadIssue {
    /// A descriptor or image could not be read or decoded.
    #[error("failed to load {location}: {reason}")]
    AssetLoad { location: String, reason: String },

    /// A descriptor entry is missing a required field or has an invalid value.
    #[error("malformed descriptor {location}: {reason}")]
    MalformedDescriptor { location: String, reason: String },

    /// A clip name was already present in the catalog.
    #[error("clip \"{name}\" from {location} is already loaded; keeping the first definition")]
    DuplicateClip { name: String, location: String },

    /// A transition names a condition that does not exist.
    #[error("state \"{state}\": transition to \"{to}\" has unknown condition \"{condition}\"")]
    UnknownCondition {
        state: String,
        to: String,
        condition: String,
    },

    /// A state references a clip that never loaded.
    #[error("state \"{state}\" uses clip \"{clip}\" which is not loaded")]
    MissingClip { state: String, clip: String },

    /// A transition targets a state that is not part of the graph.
    #[error("state \"{state}\": transition target \"{to}\" is not a loaded state")]
    DanglingStateReference { state: String, to: String },
}

/// Outcome of a load pass: what loaded and what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names of clips or states that loaded successfully, in load order.
    pub loaded: Vec<String>,
    /// Problems encountered, in the order they were found.
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    /// Record an issue and emit it on the diagnostic log.
    pub fn record(&mut self, issue: LoadIssue) {
        tracing::warn!("{issue}");
        self.issues.push(issue);
    }

    /// Returns `true` when nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> LoadIssue {
    LoadIssue::MalformedDescriptor {
        location: location.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_collects_issues() {
        let mut report = LoadReport::default();
        assert!(report.is_clean());
        report.record(malformed("a.json", "missing field `name`"));
        assert!(!report.is_clean());
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn issue_display_names_the_entry() {
        let issue = LoadIssue::MissingClip {
            state: "walk".into(),
            clip: "walk_left".into(),
        };
        let msg = issue.to_string();
        assert!(msg.contains("walk"));
        assert!(msg.contains("walk_left"));
    }
}
