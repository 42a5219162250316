//! Cheat-list codec.
//!
//! The format is line oriented:
//!
//! ```text
//! cheats = 2
//!
//! cheat0_desc = "Infinite Lives"
//! cheat0_enable = true
//! cheat0_code = "ABC123"
//!
//! cheat1_desc = "All Weapons"
//! cheat1_enable = false
//! cheat1_code = "XYZ789"
//! ```
//!
//! Values are written without escaping, so descriptions and codes containing
//! `"` or newlines do not survive a round trip.

use std::sync::LazyLock;

use regex::Regex;

use super::engine::FileReader;
use crate::config::cheats::{COUNT_KEY, FILE_EXTENSION};
use crate::models::{CheatsFile, FilePaths, ParsedCheat};
use crate::utils::path;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cheats = [0-9]+$").expect("valid cheats header pattern"));

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^cheat([0-9]+)_(desc|code|enable)[ \t]*=[ \t]*"?([^"]*)"?$"#)
        .expect("valid cheat field pattern")
});

/// Parse a cheat list.
///
/// A missing or malformed `cheats = N` header yields an empty list, the same
/// result as a file with zero cheats. Lines that are not cheat fields are
/// ignored. Cheats are returned in the order their index first appears.
pub fn parse(text: &str) -> Vec<ParsedCheat> {
    let mut lines = text.split('\n');

    let header = lines.next().unwrap_or_default().trim_end_matches('\r');
    if !HEADER.is_match(header) {
        return Vec::new();
    }

    let mut assembled: Vec<(u64, ParsedCheat)> = Vec::new();

    for line in lines {
        let Some(caps) = FIELD.captures(line.trim()) else {
            continue;
        };
        let Ok(index) = caps[1].parse::<u64>() else {
            continue;
        };

        let slot = match assembled.iter().position(|(i, _)| *i == index) {
            Some(pos) => pos,
            None => {
                assembled.push((index, ParsedCheat::default()));
                assembled.len() - 1
            }
        };
        let cheat = &mut assembled[slot].1;

        let value = &caps[3];
        match &caps[2] {
            "desc" => cheat.desc = value.to_string(),
            "code" => cheat.code = value.to_string(),
            _ => cheat.enable = value.eq_ignore_ascii_case("true"),
        }
    }

    assembled.into_iter().map(|(_, cheat)| cheat).collect()
}

/// Name of the cheats file for a program path (`/data/games/x.gba` → `x.cheats`).
///
/// Returns `None` when no program is known.
pub fn cheats_file_name(program: Option<&str>) -> Option<String> {
    let base = path::file_name(program?);
    if base.is_empty() {
        return None;
    }
    Some(path::replace_extension(base, FILE_EXTENSION))
}

/// Serialize a cheat list for the given program.
///
/// Returns `None` without a current program, even for a non-empty list.
pub fn serialize(cheats: &[ParsedCheat], program: Option<&str>) -> Option<CheatsFile> {
    let name = cheats_file_name(program)?;

    let blocks: Vec<String> = cheats
        .iter()
        .enumerate()
        .map(|(i, cheat)| {
            format!(
                "cheat{i}_desc = \"{}\"\ncheat{i}_enable = {}\ncheat{i}_code = \"{}\"\n",
                cheat.desc, cheat.enable, cheat.code
            )
        })
        .collect();

    let content = format!("{} = {}\n\n{}", COUNT_KEY, cheats.len(), blocks.join("\n"));

    Some(CheatsFile { name, content })
}

/// Load and parse the cheats file of the running program.
///
/// A missing file reads as an empty list.
pub fn read_current_cheats<F: FileReader + ?Sized>(
    fs: &F,
    paths: &FilePaths,
    program: Option<&str>,
) -> Vec<ParsedCheat> {
    let Some(name) = cheats_file_name(program) else {
        return Vec::new();
    };
    match fs.read_file(&path::join(&paths.cheats_path, &name)) {
        Ok(bytes) => parse(&String::from_utf8_lossy(&bytes)),
        Err(_) => Vec::new(),
    }
}
