use crate::errors::CliError;
use inquire::{Confirm, Text};
use miette::{IntoDiagnostic, Result};
use regex::Regex;

pub mod archive;
pub mod config;
pub mod generator;
pub mod progress;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Version ids double as directory names.
pub fn is_valid_version_id(id: impl AsRef<str>) -> bool {
    Regex::new(r"^[[:word:]][[:word:]. -]*$").is_ok_and(|re| re.is_match(id.as_ref()))
}

pub fn validate_version_id(id: impl AsRef<str>) -> Result<()> {
    let id = id.as_ref();
    if !is_valid_version_id(id) {
        return Err(CliError::invalid_version(id).into());
    }
    Ok(())
}

pub fn prompt_version() -> Result<String> {
    Text::new("Enter the version:")
        .with_help_message("r or release for the latest release, s or snapshot for the latest snapshot")
        .prompt()
        .into_diagnostic()
}

pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message)
        .with_default(default)
        .prompt()
        .into_diagnostic()
}
