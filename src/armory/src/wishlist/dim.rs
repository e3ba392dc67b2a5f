//! DIM wishlist text format
//!
//! One roll per line:
//!
//! ```text
//! dimwishlist:item=3260753130&perks=101,301#notes:PvE god roll|tags:pve,mkb
//! ```
//!
//! Files may also carry `title:` and `description:` headers, `//notes:`
//! lines that annotate every following roll up to the next blank line, and
//! `//` comments. An entry is written once per cosmetic variant of its
//! weapon, since consumers match on exact item hashes.

use super::{expand_alternatives, WishlistItem};
use crate::dedupe::PerkMatrixBuilder;
use crate::hash::ItemHash;
use crate::manifest::Catalog;

const LINE_PREFIX: &str = "dimwishlist:";
const NOTES_MARKER: &str = "#notes:";
const TAGS_MARKER: &str = "|tags:";
const BLOCK_NOTES_PREFIX: &str = "//notes:";
const TITLE_PREFIX: &str = "title:";
const DESCRIPTION_PREFIX: &str = "description:";

/// Errors raised while parsing wishlist lines
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WishlistParseError {
    #[error("Not a wishlist line (expected `dimwishlist:` prefix)")]
    NotAWishlistLine,

    #[error("Wishlist line has no item= parameter")]
    MissingItem,

    #[error("Invalid {field} hash: {value}")]
    InvalidHash { field: &'static str, value: String },
}

/// How rolls with several perks in one column are written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// One line per roll, alternatives listed together
    #[default]
    Compact,
    /// One line per combination of single perks, for consumers that AND
    /// every listed perk
    Expanded,
}

/// Make notes safe for the single-line format
pub fn sanitize_notes(notes: &str) -> String {
    notes
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "-")
        .trim()
        .to_string()
}

/// Format one line for an exact item hash
pub fn format_line(
    item_hash: ItemHash,
    perk_hashes: &[ItemHash],
    notes: Option<&str>,
    tags: &[String],
) -> String {
    let perks = perk_hashes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let mut line = format!("{LINE_PREFIX}item={item_hash}&perks={perks}");

    if let Some(notes) = notes.map(sanitize_notes).filter(|n| !n.is_empty()) {
        line.push_str(NOTES_MARKER);
        line.push_str(&notes);
    }
    let tags: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        line.push_str(TAGS_MARKER);
        line.push_str(&tags.join(","));
    }
    line
}

/// Parse one `dimwishlist:` line
pub fn parse_line(line: &str) -> Result<WishlistItem, WishlistParseError> {
    let body = line
        .trim()
        .strip_prefix(LINE_PREFIX)
        .ok_or(WishlistParseError::NotAWishlistLine)?;

    let (body, tags) = match body.split_once(TAGS_MARKER) {
        Some((body, tags)) => (body, parse_tags(tags)),
        None => (body, Vec::new()),
    };
    let (params, notes) = match body.split_once(NOTES_MARKER) {
        Some((params, notes)) => (params, Some(notes.trim())),
        None => (body, None),
    };

    let mut weapon_hash = None;
    let mut perk_hashes = Vec::new();
    for param in params.split('&') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim() {
            "item" => weapon_hash = Some(parse_hash("item", value)?),
            "perks" => {
                for perk in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    perk_hashes.push(parse_hash("perk", perk)?);
                }
            }
            _ => {}
        }
    }

    let weapon_hash = weapon_hash.ok_or(WishlistParseError::MissingItem)?;
    let mut item = WishlistItem::new(weapon_hash, perk_hashes).with_tags(tags);
    if let Some(notes) = notes {
        item = item.with_notes(notes);
    }
    Ok(item)
}

fn parse_hash(field: &'static str, value: &str) -> Result<ItemHash, WishlistParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| WishlistParseError::InvalidHash {
            field,
            value: value.trim().to_string(),
        })
}

fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Every line for one entry: one per cosmetic variant of its weapon, and in
/// expanded mode one per perk combination as well
pub fn export_item(item: &WishlistItem, catalog: &Catalog, mode: ExportMode) -> Vec<String> {
    let rolls = match mode {
        ExportMode::Compact => vec![item.clone()],
        ExportMode::Expanded => {
            match PerkMatrixBuilder::new(catalog).build_for_definition(item.weapon_hash) {
                Some(weapon) => expand_alternatives(item, &weapon.perk_matrix),
                None => vec![item.clone()],
            }
        }
    };

    let variants = catalog.variant_hashes(item.weapon_hash);
    rolls
        .iter()
        .flat_map(|roll| {
            variants.iter().map(move |&hash| {
                format_line(hash, &roll.perk_hashes, roll.notes.as_deref(), &roll.tags)
            })
        })
        .collect()
}

// ============================================================================
// Files
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistFile {
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Vec<WishlistItem>,
}

/// A rejected line, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub error: WishlistParseError,
}

impl WishlistFile {
    /// Parse a wishlist file. Bad roll lines are reported and skipped; lines
    /// that aren't part of the format are ignored.
    pub fn parse(text: &str) -> (Self, Vec<LineError>) {
        let mut file = WishlistFile::default();
        let mut errors = Vec::new();
        let mut block_notes: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                block_notes = None;
            } else if let Some(notes) = line.strip_prefix(BLOCK_NOTES_PREFIX) {
                let notes = notes.trim();
                block_notes = (!notes.is_empty()).then(|| notes.to_string());
            } else if line.starts_with("//") {
                continue;
            } else if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
                file.title.get_or_insert_with(|| title.trim().to_string());
            } else if let Some(description) = line.strip_prefix(DESCRIPTION_PREFIX) {
                file.description
                    .get_or_insert_with(|| description.trim().to_string());
            } else if line.starts_with(LINE_PREFIX) {
                match parse_line(line) {
                    Ok(mut item) => {
                        if item.notes.is_none() {
                            item.notes = block_notes.clone();
                        }
                        file.items.push(item);
                    }
                    Err(error) => {
                        tracing::debug!(line = index + 1, %error, "skipping wishlist line");
                        errors.push(LineError {
                            line: index + 1,
                            error,
                        });
                    }
                }
            } else {
                tracing::trace!(line = index + 1, "ignoring unrecognized wishlist line");
            }
        }

        (file, errors)
    }

    /// Render the file, writing each entry once per cosmetic variant
    pub fn render(&self, catalog: &Catalog, mode: ExportMode) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("{TITLE_PREFIX}{title}\n"));
        }
        if let Some(description) = &self.description {
            out.push_str(&format!("{DESCRIPTION_PREFIX}{}\n", sanitize_notes(description)));
        }
        if !out.is_empty() {
            out.push('\n');
        }
        for item in &self.items {
            for line in export_item(item, catalog, mode) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FATEBRINGER, FATEBRINGER_HOLO};
    use crate::wishlist::Wishlist;

    #[test]
    fn test_format_line() {
        let line = format_line(
            123,
            &[1, 2],
            Some("Great | roll\nfor PvE"),
            &["pve".into(), " ".into(), "mkb".into()],
        );
        assert_eq!(
            line,
            "dimwishlist:item=123&perks=1,2#notes:Great - roll for PvE|tags:pve,mkb"
        );
        assert_eq!(format_line(9, &[], None, &[]), "dimwishlist:item=9&perks=");
    }

    #[test]
    fn test_parse_line() {
        let item = parse_line("dimwishlist:item=123&perks=1, 2,2#notes:Great roll|tags:pve,mkb").unwrap();
        assert_eq!(item.weapon_hash, 123);
        assert_eq!(item.perk_hashes, vec![1, 2]);
        assert_eq!(item.notes.as_deref(), Some("Great roll"));
        assert_eq!(item.tags, vec!["pve", "mkb"]);

        let bare = parse_line("dimwishlist:item=123").unwrap();
        assert!(bare.perk_hashes.is_empty());
        assert!(bare.notes.is_none());

        let tags_only = parse_line("dimwishlist:item=5&perks=7|tags:pvp").unwrap();
        assert_eq!(tags_only.tags, vec!["pvp"]);
        assert!(tags_only.notes.is_none());
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(parse_line("item=1&perks=2"), Err(WishlistParseError::NotAWishlistLine));
        assert_eq!(parse_line("dimwishlist:perks=2"), Err(WishlistParseError::MissingItem));
        assert_eq!(
            parse_line("dimwishlist:item=-69420&perks=2"),
            Err(WishlistParseError::InvalidHash {
                field: "item",
                value: "-69420".into()
            })
        );
        assert!(matches!(
            parse_line("dimwishlist:item=1&perks=2,x"),
            Err(WishlistParseError::InvalidHash { field: "perk", .. })
        ));
    }

    #[test]
    fn test_export_one_line_per_variant() {
        let catalog = fixtures::catalog();
        let item = WishlistItem::new(FATEBRINGER_HOLO, [101, 301]).with_notes("god roll");
        let lines = export_item(&item, &catalog, ExportMode::Compact);
        assert_eq!(
            lines,
            vec![
                "dimwishlist:item=1000&perks=101,301#notes:god roll",
                "dimwishlist:item=1001&perks=101,301#notes:god roll",
            ]
        );

        // Importing either line and looking up by the other variant finds it
        for line in &lines {
            let mut wishlist = Wishlist::new();
            wishlist.insert_collapsed(parse_line(line).unwrap(), &catalog);
            let found = wishlist.entries_for(&catalog, FATEBRINGER);
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].identity(), item.identity());
        }
    }

    #[test]
    fn test_expanded_export() {
        let catalog = fixtures::catalog();
        let item = WishlistItem::new(FATEBRINGER, [101, 102, 401]);
        let lines = export_item(&item, &catalog, ExportMode::Expanded);
        assert_eq!(
            lines,
            vec![
                "dimwishlist:item=1000&perks=101,401",
                "dimwishlist:item=1001&perks=101,401",
                "dimwishlist:item=1000&perks=102,401",
                "dimwishlist:item=1001&perks=102,401",
            ]
        );
    }

    #[test]
    fn test_file_framing() {
        let text = "\
title:My Rolls
description:Things I want
// a comment

//notes:Block notes
dimwishlist:item=1000&perks=101
dimwishlist:item=1000&perks=102#notes:Own notes
dimwishlist:item=oops

dimwishlist:item=1000&perks=103
random text
";
        let (file, errors) = WishlistFile::parse(text);
        assert_eq!(file.title.as_deref(), Some("My Rolls"));
        assert_eq!(file.description.as_deref(), Some("Things I want"));
        assert_eq!(file.items.len(), 3);
        assert_eq!(file.items[0].notes.as_deref(), Some("Block notes"));
        assert_eq!(file.items[1].notes.as_deref(), Some("Own notes"));
        assert_eq!(file.items[2].notes, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 8);

        let catalog = fixtures::catalog();
        let rendered = file.render(&catalog, ExportMode::Compact);
        assert!(rendered.starts_with("title:My Rolls\ndescription:Things I want\n\n"));
        assert_eq!(rendered.lines().filter(|l| l.starts_with(LINE_PREFIX)).count(), 6);

        let (reparsed, errors) = WishlistFile::parse(&rendered);
        assert!(errors.is_empty());
        let collapsed: Wishlist = {
            let mut wishlist = Wishlist::new();
            for item in reparsed.items {
                wishlist.insert_collapsed(item, &catalog);
            }
            wishlist
        };
        assert_eq!(collapsed.len(), 3);
    }
}
