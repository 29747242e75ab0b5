//! Splitting a raw thought fragment into subject/description (§4.2).

/// A structured view of one `Thought` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thought {
    /// Short heading, if the text led with a `**bolded**` marker.
    pub subject: Option<String>,
    /// The remaining body text.
    pub description: String,
}

/// Parse a raw thought string.
///
/// Models are asked to prefix each thought with a bold heading, e.g.
/// `**Reviewing the schema**\nChecking whether...`. When the text starts
/// with `**`, the content up to the next `**` becomes the subject and the
/// rest (trimmed) becomes the description. Text without a leading marker
/// has no subject.
pub fn parse_thought(raw: &str) -> Thought {
    let trimmed = raw.trim_start();
    if let Some(after_open) = trimmed.strip_prefix("**") {
        if let Some(close_index) = after_open.find("**") {
            let subject = after_open[..close_index].trim().to_string();
            let description = after_open[close_index + 2..].trim().to_string();
            if !subject.is_empty() {
                return Thought {
                    subject: Some(subject),
                    description,
                };
            }
        }
    }
    Thought {
        subject: None,
        description: raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_subject_and_description() {
        let thought = parse_thought("**Reviewing the schema**\nChecking field types.");
        assert_eq!(thought.subject.as_deref(), Some("Reviewing the schema"));
        assert_eq!(thought.description, "Checking field types.");
    }

    #[test]
    fn no_marker_has_no_subject() {
        let thought = parse_thought("just thinking out loud");
        assert_eq!(thought.subject, None);
        assert_eq!(thought.description, "just thinking out loud");
    }

    #[test]
    fn empty_marker_falls_back_to_whole_text() {
        let thought = parse_thought("****\nbody");
        assert_eq!(thought.subject, None);
        assert_eq!(thought.description, "****\nbody");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let thought = parse_thought("  **Plan**   indented body  ");
        assert_eq!(thought.subject.as_deref(), Some("Plan"));
        assert_eq!(thought.description, "indented body  ".trim_end());
    }
}
