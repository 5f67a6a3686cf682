use std::fmt;

use serde::Serialize;

/// One validation finding, addressed by a dotted/indexed path into the
/// document (`bindings[2].mark`, `dataSources[0].id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractIssue {
    pub path: String,
    pub message: String,
}

impl ContractIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ContractIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validation failure carrying every issue found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ContractIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ContractIssue>) -> Self {
        Self { issues }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "contract validation failed with {} issue(s)",
            self.issues.len()
        )?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_issue() {
        let err = ValidationError::new(vec![
            ContractIssue::new("bindings[0].mark", "duplicate mark `d.x`"),
            ContractIssue::new("name", "contract name must not be empty"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("contract validation failed with 2 issue(s)"));
        assert!(text.contains("bindings[0].mark: duplicate mark `d.x`"));
        assert!(text.contains("name: contract name must not be empty"));
    }
}
