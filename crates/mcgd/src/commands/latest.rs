use super::refresh_catalog;
use crate::println_pad;
use crate::utils::config;
use colored::Colorize;
use mcgd_fetch::HttpDownloader;
use miette::Result;

pub fn print_latest() -> Result<()> {
    let cfg = config::load_config();
    let downloader = HttpDownloader::new().map_err(crate::errors::CliError::from)?;
    let catalog = refresh_catalog(&downloader, &cfg)?;

    let none = || "(unknown)".to_string();
    println_pad!(
        "{} {}\n{} {}",
        "release: ".bright_white(),
        catalog.latest.release.unwrap_or_else(none).bright_cyan().bold(),
        "snapshot:".bright_white(),
        catalog.latest.snapshot.unwrap_or_else(none).bright_cyan().bold()
    );
    Ok(())
}
