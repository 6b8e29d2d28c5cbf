use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Character classes a password may be required to contain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    /// Anything that is neither a letter nor a digit.
    Symbol,
}

impl CharClass {
    fn admits(self, c: char) -> bool {
        match self {
            CharClass::Upper => c.is_uppercase(),
            CharClass::Lower => c.is_lowercase(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Symbol => !c.is_alphanumeric(),
        }
    }
}

/// Strength rules for account passwords, applied on registration, reset
/// confirmation and admin provisioning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub shortest: u16,
    pub longest: u16,
    /// Classes checked in order; each must appear at least once.
    pub classes: Vec<CharClass>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            shortest: 8,
            longest: 16,
            classes: vec![
                CharClass::Upper,
                CharClass::Lower,
                CharClass::Digit,
                CharClass::Symbol,
            ],
        }
    }
}

impl PasswordPolicy {
    fn length_bounds(&self) -> RangeInclusive<usize> {
        usize::from(self.shortest)..=usize::from(self.longest)
    }

    pub fn check(&self, password: &str) -> PasswordPolicyCheck {
        let chars = password.chars().count();
        let bounds = self.length_bounds();
        let length_rule = if chars < *bounds.start() {
            Some(PasswordPolicyRule::TooShort(self.shortest))
        } else if chars > *bounds.end() {
            Some(PasswordPolicyRule::TooLong(self.longest))
        } else {
            None
        };

        let missing = self
            .classes
            .iter()
            .copied()
            .filter(|class| !password.chars().any(|c| class.admits(c)))
            .map(PasswordPolicyRule::Missing);

        PasswordPolicyCheck {
            failures: length_rule.into_iter().chain(missing).collect(),
        }
    }
}

/// A rule the password broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyRule {
    TooShort(u16),
    TooLong(u16),
    Missing(CharClass),
}

impl fmt::Display for PasswordPolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "shorter than {n} characters"),
            Self::TooLong(n) => write!(f, "longer than {n} characters"),
            Self::Missing(class) => {
                let what = match class {
                    CharClass::Upper => "an uppercase letter",
                    CharClass::Lower => "a lowercase letter",
                    CharClass::Digit => "a digit",
                    CharClass::Symbol => "a symbol",
                };
                write!(f, "missing {what}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordPolicyCheck {
    pub failures: Vec<PasswordPolicyRule>,
}

impl PasswordPolicyCheck {
    pub fn is_satisfied(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed rules joined for a log field.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (i, rule) in self.failures.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            out.push_str(&rule.to_string());
        }
        out
    }
}
