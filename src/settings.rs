//! User-level settings for batchmargin, read from `settings.toml` in the config directory.
//!
//! Settings only change how the program runs (logging and whether results may be replaced).
//! They never change the numbers it calculates.
use crate::get_batchmargin_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::Result;
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Path of the settings file in the user's config directory
pub fn get_settings_file_path() -> PathBuf {
    get_batchmargin_config_dir().join(SETTINGS_FILE_NAME)
}

/// Settings which apply to every run. Keys missing from the file take their default value.
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Log level used when BATCHMARGIN_LOG_LEVEL is unset (e.g. "warn", "debug" or "off")
    pub log_level: String,
    /// Replace batch_margins.csv in the output directory without needing --overwrite
    pub overwrite: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            overwrite: false,
        }
    }
}

impl Settings {
    /// Load the user's settings, or the defaults if they have no settings file
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file listing every setting with its description and default.
    ///
    /// The settings themselves are commented out, so the file loads as the defaults until the
    /// user edits it.
    pub fn default_file_contents() -> String {
        let defaults = toml::Table::try_from(Settings::default())
            .expect("Settings should always serialise to a TOML table");

        let mut out = String::from("# Settings for batchmargin. Uncomment a line to change it.\n");
        for (key, value) in &defaults {
            let docs = Settings::get_field_docs(key).expect("Every setting should be documented");
            out.push('\n');
            for doc_line in docs.lines() {
                writeln!(&mut out, "# {}", doc_line.trim()).unwrap();
            }
            writeln!(&mut out, "#{key} = {value}").unwrap();
        }

        out
    }
}
