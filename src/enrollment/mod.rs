//! Enrollment rules that do not touch the database: status transitions,
//! progress arithmetic and the capacity gate. The ledger in
//! [`crate::db::orders`] applies them inside transactions.

pub mod capacity;
pub mod progress;
pub mod transitions;

use serde::Deserialize;
use std::str::FromStr;

/// What happens when a student enrolls in a course they already hold an
/// order for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReenrollmentPolicy {
    /// One order per (course, student), whatever its status.
    #[default]
    OncePerCourse,
    /// A completed or cancelled order is replaced by a fresh one.
    AllowAfterTerminal,
}

impl FromStr for ReenrollmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once_per_course" => Ok(Self::OncePerCourse),
            "allow_after_terminal" => Ok(Self::AllowAfterTerminal),
            other => Err(format!("unknown re-enrollment policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_from_env_values() {
        assert_eq!(
            "once_per_course".parse::<ReenrollmentPolicy>(),
            Ok(ReenrollmentPolicy::OncePerCourse)
        );
        assert_eq!(
            " Allow_After_Terminal ".parse::<ReenrollmentPolicy>(),
            Ok(ReenrollmentPolicy::AllowAfterTerminal)
        );
        assert!("sometimes".parse::<ReenrollmentPolicy>().is_err());
    }
}
