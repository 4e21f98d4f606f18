mod build;
mod latest;

pub use build::*;
pub use latest::*;

use crate::errors::CliError;
use crate::utils::config::AppConfig;
use mcgd_fetch::{Downloader, VersionCatalog};

/// The local catalog, merged with the upstream manifest when it is reachable.
///
/// An unreachable upstream is tolerated as long as the local catalog knows
/// some versions.
pub(crate) fn refresh_catalog<D: Downloader>(
    downloader: &D,
    cfg: &AppConfig,
) -> Result<VersionCatalog, CliError> {
    let path = cfg.catalog_path();
    let mut catalog = VersionCatalog::load(&path)?;

    match VersionCatalog::fetch_remote(downloader) {
        Ok(upstream) => {
            if catalog.merge(upstream) {
                tracing::info!("Version catalog updated: {}", path);
                catalog.save(&path)?;
            }
        }
        Err(err) if !catalog.versions.is_empty() => {
            tracing::warn!("Using the local version catalog, upstream unreachable: {}", err);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(catalog)
}
