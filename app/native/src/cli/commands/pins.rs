//! Pin management commands.
//!
//! Operates on the persisted pin file directly; the running engine picks the
//! changes up on its next enforcement batch.

use clap::Subcommand;
use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::error::VeilError;
use crate::menubar::{JsonPinStore, PinStore, PinnedIdentifier};

/// Pin management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum PinsCommands {
    /// List stored pins.
    #[command(after_long_help = r#"Examples:
  veil pins list            # Table of stored pins
  veil pins list --json     # JSON output"#)]
    List {
        /// Output in JSON format.
        #[arg(long, short)]
        json: bool,
    },

    /// Pin an icon identifier to the always-hidden zone.
    ///
    /// Accepted forms: `<owner>`, `<owner>::axid:<id>`,
    /// `<owner>::statusItem:<index>` and `menuextra:<key>`.
    Add {
        /// Encoded pin.
        pin: String,
    },

    /// Remove a stored pin.
    Remove {
        /// Encoded pin, exactly as listed.
        pin: String,
    },

    /// Drop pins that cannot be parsed.
    Prune,

    /// Show the path of the pin file.
    Path,
}

/// Execute pin subcommands against `store`.
///
/// # Errors
///
/// Returns an error if the pin file cannot be read or written, or the pin is
/// invalid.
pub fn execute(cmd: &PinsCommands, store: &JsonPinStore) -> Result<(), VeilError> {
    match cmd {
        PinsCommands::List { json } => list_pins(store, *json),
        PinsCommands::Add { pin } => add_pin(store, pin),
        PinsCommands::Remove { pin } => remove_pin(store, pin),
        PinsCommands::Prune => prune_pins(store),
        PinsCommands::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PinEntry {
    pin: String,
    kind: Option<&'static str>,
    owner: Option<String>,
    error: Option<String>,
}

fn describe(raw: &str) -> PinEntry {
    match raw.parse::<PinnedIdentifier>() {
        Ok(pin) => PinEntry {
            pin: raw.to_string(),
            kind: Some(match pin {
                PinnedIdentifier::MenuExtra(_) => "menu extra",
                PinnedIdentifier::AxId { .. } => "ax id",
                PinnedIdentifier::StatusIndex { .. } => "status index",
                PinnedIdentifier::BareOwner(_) => "owner",
            }),
            owner: pin.owner().map(str::to_string),
            error: None,
        },
        Err(err) => PinEntry {
            pin: raw.to_string(),
            kind: None,
            owner: None,
            error: Some(err.to_string()),
        },
    }
}

fn list_pins(store: &JsonPinStore, json: bool) -> Result<(), VeilError> {
    #[derive(Tabled)]
    struct PinRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Pin")]
        pin: String,
        #[tabled(rename = "Kind")]
        kind: String,
        #[tabled(rename = "Owner")]
        owner: String,
        #[tabled(rename = "Valid")]
        valid: String,
    }

    let entries: Vec<PinEntry> = store.load()?.iter().map(String::as_str).map(describe).collect();

    if json {
        output::print_highlighted_json(&serde_json::to_value(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No pins stored.".dimmed());
        return Ok(());
    }

    let rows: Vec<PinRow> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| PinRow {
            index: i + 1,
            pin: output::truncate(&entry.pin, 60),
            kind: entry.kind.unwrap_or("-").to_string(),
            owner: entry.owner.clone().unwrap_or_else(|| "-".to_string()),
            valid: output::format_bool(entry.error.is_none()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Pins ({})", entries.len()).bold());
    println!("{table}");
    Ok(())
}

fn add_pin(store: &JsonPinStore, raw: &str) -> Result<(), VeilError> {
    let pin: PinnedIdentifier =
        raw.parse().map_err(|err| VeilError::InvalidArguments(format!("Invalid pin: {err}")))?;
    let encoded = pin.to_string();

    let mut pins = store.load()?;
    if pins.contains(&encoded) {
        println!("{} {encoded}", "Already pinned:".dimmed());
        return Ok(());
    }

    pins.push(encoded.clone());
    store.save(&pins)?;
    println!("{} {encoded}", "Pinned:".green());
    Ok(())
}

fn remove_pin(store: &JsonPinStore, raw: &str) -> Result<(), VeilError> {
    let mut pins = store.load()?;
    let before = pins.len();
    pins.retain(|stored| stored != raw);

    if pins.len() == before {
        return Err(VeilError::InvalidArguments(format!("Pin not found: {raw}")));
    }

    store.save(&pins)?;
    println!("{} {raw}", "Removed:".green());
    Ok(())
}

fn prune_pins(store: &JsonPinStore) -> Result<(), VeilError> {
    let pins = store.load()?;
    let (kept, dropped): (Vec<String>, Vec<String>) =
        pins.into_iter().partition(|raw| raw.parse::<PinnedIdentifier>().is_ok());

    if dropped.is_empty() {
        println!("{}", "All pins are valid.".dimmed());
        return Ok(());
    }

    store.save(&kept)?;
    for raw in &dropped {
        println!("{} {raw}", "Dropped:".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store() -> (TempDir, JsonPinStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonPinStore::new(dir.path().join("pins.json"));
        (dir, store)
    }

    #[test]
    fn test_add_normalizes_and_dedupes() {
        let (_dir, store) = store();
        add_pin(&store, "  com.example.app ").unwrap();
        add_pin(&store, "com.example.app").unwrap();
        assert_eq!(store.load().unwrap(), vec!["com.example.app".to_string()]);
    }

    #[test]
    fn test_add_rejects_invalid_pin() {
        let (_dir, store) = store();
        let err = add_pin(&store, "menuextra:").unwrap_err();
        assert!(matches!(err, VeilError::InvalidArguments(_)));
    }

    #[test]
    fn test_remove_missing_pin_is_error() {
        let (_dir, store) = store();
        assert!(remove_pin(&store, "com.example.app").is_err());
    }

    #[test]
    fn test_prune_keeps_valid_pins() {
        let (_dir, store) = store();
        store.save(&["com.example.app".to_string(), "bad pin".to_string()]).unwrap();

        prune_pins(&store).unwrap();

        assert_eq!(store.load().unwrap(), vec!["com.example.app".to_string()]);
    }

    #[test]
    fn test_describe_reports_kind_and_owner() {
        let entry = describe("com.example.app::statusItem:1");
        assert_eq!(entry.kind, Some("status index"));
        assert_eq!(entry.owner.as_deref(), Some("com.example.app"));

        assert!(describe("::axid:").error.is_some());
    }
}
