//! CLI-specific error types and exit code mapping

use sbomfetch_core::error::SbomfetchError;

/// CLI-specific error type.
///
/// Recovered per-task failures never reach this type; they are part of the
/// rendered report. Only fatal errors end up here.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading, validation or logging setup failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (directory creation, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sbomfetch-core.
    #[error("{0}")]
    Core(#[from] SbomfetchError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success (including partial runs) |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 3    | SBOM document or source error    |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(inner) => match inner {
                SbomfetchError::Config(_) => 2,
                SbomfetchError::Document(_) => 3,
                SbomfetchError::Io(_) => 10,
                SbomfetchError::Download(_) | SbomfetchError::Extract(_) => 1,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<sbomfetch_resolver::ResolverError> for CliError {
    fn from(e: sbomfetch_resolver::ResolverError) -> Self {
        Self::Core(e.into())
    }
}

impl From<sbomfetch_downloader::DownloaderError> for CliError {
    fn from(e: sbomfetch_downloader::DownloaderError) -> Self {
        Self::Core(e.into())
    }
}

impl From<sbomfetch_extractor::ExtractorError> for CliError {
    fn from(e: sbomfetch_extractor::ExtractorError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbomfetch_core::error::{ConfigError, DocumentError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad log format".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(SbomfetchError::Config(ConfigError::FileNotFound {
            path: "sbomfetch.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_document_error() {
        let err = CliError::Core(SbomfetchError::Document(DocumentError::ParseFailed {
            reason: "EOF while parsing".to_owned(),
        }));
        assert_eq!(err.exit_code(), 3, "document error should return exit code 3");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(CliError::Core(SbomfetchError::Io(io_err)).exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("unknown section".to_owned());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_resolver_strict_failure_maps_to_document_exit_code() {
        let err: CliError = sbomfetch_resolver::ResolverError::Validation(Vec::new()).into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_resolver_missing_input_maps_to_document_exit_code() {
        let err: CliError = sbomfetch_resolver::ResolverError::Source(
            "no attestations found in image.att".to_owned(),
        )
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("image.att"));
    }

    #[test]
    fn test_downloader_setup_failure_is_general_error() {
        let err: CliError =
            sbomfetch_downloader::DownloaderError::ClientBuild("tls backend".to_owned()).into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(err.to_string(), "execution failed");
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("unknown log format 'xml'".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("xml"));
    }
}
