//! Physical name assignment.

use super::ResourceType;

const SUFFIX_LEN: usize = 7;

/// How logical names become provider-side names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Physical name equals the logical name.
    #[default]
    Exact,
    /// Logical name plus a random `-xxxxxxx` suffix, so that stacks can be
    /// replaced side by side without name collisions.
    Suffixed,
}

impl NamingStrategy {
    pub fn physical_name(self, kind: ResourceType, logical_name: &str) -> String {
        match self {
            Self::Suffixed if kind.auto_named() => {
                format!("{logical_name}-{}", random_suffix())
            }
            _ => logical_name.to_string(),
        }
    }
}

fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keeps_logical_name() {
        assert_eq!(
            NamingStrategy::Exact.physical_name(ResourceType::Bucket, "bus-time-travel"),
            "bus-time-travel"
        );
    }

    #[test]
    fn test_suffixed_appends_lowercase_hex() {
        let name = NamingStrategy::Suffixed.physical_name(ResourceType::Bucket, "bus-time-travel");
        let suffix = name
            .strip_prefix("bus-time-travel-")
            .expect("suffix should follow the logical name");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_attachments_are_never_suffixed() {
        assert_eq!(
            NamingStrategy::Suffixed
                .physical_name(ResourceType::RolePolicyAttachment, "get_history_role-logs"),
            "get_history_role-logs"
        );
    }
}
