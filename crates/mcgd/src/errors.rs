use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Downloaded file does not match its hash: {url}")]
    #[diagnostic(
        code(integrity::mismatch),
        help("Expected SHA-1 {expected}, got {actual}. The partial file was removed; run the build again")
    )]
    IntegrityMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown version: {version}")]
    #[diagnostic(
        code(version::not_found),
        help("Run `mcgd latest` to refresh the version catalog, or pass a descriptor with --manifest-json")
    )]
    VersionNotFound { version: String },

    #[error("No version given")]
    #[diagnostic(
        code(version::missing),
        help("In quiet mode, pass --version (r/release, s/snapshot or an id) or --manifest-json")
    )]
    VersionMissing,

    #[error("Invalid version id: {version}")]
    #[diagnostic(
        code(version::invalid_id),
        help("Version ids may only contain letters, digits, spaces, dots, dashes and underscores")
    )]
    InvalidVersion { version: String },

    #[error("Output already exists: {path}")]
    #[diagnostic(
        code(output::exists),
        help("Pass --overwrite to replace it, or choose another directory with --output")
    )]
    OutputExists { path: Utf8PathBuf },

    #[error("Unknown {kind} in {category} '{file}': {detail}")]
    #[diagnostic(
        code(schema::unknown_shape),
        help("This version uses a data shape the listings do not support yet")
    )]
    UnknownShape {
        category: String,
        file: String,
        kind: String,
        detail: String,
    },

    #[error("Missing {category} under {root}: none of [{}] exists", candidates.join(", "))]
    #[diagnostic(
        code(layout::missing_category),
        help("The generator output is incomplete; check its log and run the build again")
    )]
    MissingCategory {
        category: String,
        root: Utf8PathBuf,
        candidates: Vec<String>,
    },

    #[error("The data generator failed")]
    #[diagnostic(
        code(generator::failed),
        help("Check that `{java}` is a Java runtime able to run this server version (set `java` in config.toml)")
    )]
    GeneratorFailed { java: String },

    #[error("Fetching failed")]
    #[diagnostic(code(fetch::failed))]
    Fetch {
        #[source]
        source: mcgd_fetch::Error,
    },

    #[error("Listing failed")]
    #[diagnostic(code(listing::failed))]
    Listing {
        #[source]
        source: mcgd_listing::Error,
    },

    #[error("Archive operation failed")]
    #[diagnostic(code(archive::failed))]
    Archive {
        #[from]
        source: zip::result::ZipError,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn version_not_found(version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            version: version.into(),
        }
    }

    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    pub fn output_exists(path: impl Into<Utf8PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    pub fn generator_failed(java: impl Into<String>) -> Self {
        Self::GeneratorFailed { java: java.into() }
    }
}

impl From<mcgd_fetch::Error> for CliError {
    fn from(error: mcgd_fetch::Error) -> Self {
        match error {
            mcgd_fetch::Error::Integrity {
                url,
                expected,
                actual,
                ..
            } => Self::IntegrityMismatch {
                url,
                expected,
                actual,
            },
            mcgd_fetch::Error::UnknownVersion(version) => Self::VersionNotFound { version },
            source => Self::Fetch { source },
        }
    }
}

impl From<mcgd_listing::Error> for CliError {
    fn from(error: mcgd_listing::Error) -> Self {
        match error {
            mcgd_listing::Error::Schema {
                category,
                file,
                kind,
                detail,
            } => Self::UnknownShape {
                category: category.to_string(),
                file,
                kind: kind.to_string(),
                detail,
            },
            mcgd_listing::Error::Resolution {
                category,
                root,
                candidates,
            } => Self::MissingCategory {
                category,
                root,
                candidates,
            },
            source => Self::Listing { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_map_to_codes() {
        let err = CliError::from(mcgd_fetch::Error::UnknownVersion("9.9".into()));
        assert!(matches!(err, CliError::VersionNotFound { ref version } if version == "9.9"));

        let err = CliError::from(mcgd_fetch::Error::Integrity {
            url: "u".into(),
            expected: "a".into(),
            actual: "b".into(),
            path: "p".into(),
        });
        assert_eq!(err.code().unwrap().to_string(), "integrity::mismatch");
    }

    #[test]
    fn test_schema_error_keeps_location() {
        let err = CliError::from(mcgd_listing::Error::schema(
            "loot_tables",
            "entities/zombie",
            "function",
            "minecraft:teleport",
        ));
        assert_eq!(err.code().unwrap().to_string(), "schema::unknown_shape");
        assert_eq!(
            err.to_string(),
            "Unknown function in loot_tables 'entities/zombie': minecraft:teleport"
        );
    }
}
