use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    Sudo,
    None,
}

impl Elevation {
    pub fn from_no_sudo(no_sudo: bool) -> Self {
        if no_sudo {
            Elevation::None
        } else {
            Elevation::Sudo
        }
    }
}

pub fn is_affirmative(answer: &str, default_yes: bool) -> bool {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    }
}

pub fn mask_preview(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => "<empty>".to_string(),
        1 | 2 => "*".repeat(chars.len()),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new(id: impl Into<String>) -> Self {
        SnapshotId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("", true));
        assert!(!is_affirmative("", false));
        assert!(is_affirmative(" YES ", false));
        assert!(is_affirmative("y", false));
        assert!(!is_affirmative("yep", true));
        assert!(!is_affirmative("n", true));
    }

    #[test]
    fn preview_hides_middle() {
        assert_eq!(mask_preview("swordfish"), "s*******h");
        assert_eq!(mask_preview("ab"), "**");
        assert_eq!(mask_preview(""), "<empty>");
    }
}
