//! File type classification.
//!
//! Maps a file name to one of the fixed [`FileCategory`] values using the
//! per-category rule table. The same table backs file-picker accept lists.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::FileCategory;

/// A single matching rule for a category.
#[derive(Debug)]
pub enum ExtensionRule {
    /// Literal, case-insensitive suffix including its dot (e.g. `.gba`)
    Suffix(&'static str),
    /// Regular expression tested against the lowercased name
    Pattern {
        regex: &'static LazyLock<Regex>,
        display: &'static str,
    },
}

impl ExtensionRule {
    /// Test a lowercased file name against this rule.
    fn matches(&self, lower_name: &str) -> bool {
        match self {
            Self::Suffix(suffix) => lower_name.ends_with(suffix),
            Self::Pattern { regex, .. } => regex.is_match(lower_name),
        }
    }

    /// Human-readable form shown in accept lists and validation hints.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Suffix(suffix) => *suffix,
            Self::Pattern { display, .. } => *display,
        }
    }
}

static SAVE_STATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ss[0-9]+").expect("valid save state pattern"));

static AUTOSAVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_auto\.ss$").expect("valid autosave pattern"));

static ROM_RULES: &[ExtensionRule] = &[
    ExtensionRule::Suffix(".gba"),
    ExtensionRule::Suffix(".gbc"),
    ExtensionRule::Suffix(".gb"),
    ExtensionRule::Suffix(".zip"),
    ExtensionRule::Suffix(".7z"),
];

static SAVE_RULES: &[ExtensionRule] = &[
    ExtensionRule::Suffix(".sav"),
    ExtensionRule::Pattern {
        regex: &SAVE_STATE_PATTERN,
        display: ".ss",
    },
];

static AUTOSAVE_RULES: &[ExtensionRule] = &[ExtensionRule::Pattern {
    regex: &AUTOSAVE_PATTERN,
    display: "_auto.ss",
}];

static CHEAT_RULES: &[ExtensionRule] = &[ExtensionRule::Suffix(".cheats")];

static PATCH_RULES: &[ExtensionRule] = &[
    ExtensionRule::Suffix(".ips"),
    ExtensionRule::Suffix(".ups"),
    ExtensionRule::Suffix(".bps"),
];

static SCREENSHOT_RULES: &[ExtensionRule] = &[ExtensionRule::Suffix(".png")];

/// Ordered rules for a category.
pub fn rules_for(category: FileCategory) -> &'static [ExtensionRule] {
    match category {
        FileCategory::Rom => ROM_RULES,
        FileCategory::Save => SAVE_RULES,
        FileCategory::Autosave => AUTOSAVE_RULES,
        FileCategory::Cheat => CHEAT_RULES,
        FileCategory::Patch => PATCH_RULES,
        FileCategory::Screenshot => SCREENSHOT_RULES,
    }
}

/// Display strings of a category's rules, for file-picker filtering.
pub fn accept_list(category: FileCategory) -> Vec<&'static str> {
    rules_for(category).iter().map(ExtensionRule::display).collect()
}

/// Check whether `file_name` belongs to `category`.
pub fn matches_category(file_name: &str, category: FileCategory) -> bool {
    let lower = file_name.to_lowercase();
    rules_for(category).iter().any(|rule| rule.matches(&lower))
}

/// Classify a file name, or `None` if it is uncategorized.
///
/// Categories are tried in [`FileCategory::PRECEDENCE`] order and the first
/// match wins.
pub fn classify(file_name: &str) -> Option<FileCategory> {
    let lower = file_name.to_lowercase();
    FileCategory::PRECEDENCE.into_iter().find(|category| {
        rules_for(*category)
            .iter()
            .any(|rule| rule.matches(&lower))
    })
}
