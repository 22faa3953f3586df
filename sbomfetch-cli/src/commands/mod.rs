//! Command handlers -- one module per subcommand

pub mod config;
pub mod extract;
pub mod fetch;
pub mod resolve;

use tracing::info;

use sbomfetch_core::SbomfetchConfig;
use sbomfetch_resolver::{
    AttestationFileSource, RelationshipPolicy, ResolverConfig, SbomSource, SpdxFileSource,
};

use crate::cli::InputArgs;
use crate::error::CliError;

/// Resolver settings from the config file, with `--strict` applied.
pub(crate) fn resolver_config(
    config: &SbomfetchConfig,
    input: &InputArgs,
) -> Result<ResolverConfig, CliError> {
    let mut resolver_config = ResolverConfig::from_core(&config.resolve);
    if input.strict {
        resolver_config.relationship_policy = RelationshipPolicy::Strict;
    }
    resolver_config.validate()?;
    Ok(resolver_config)
}

/// Reads the SPDX document bytes from the input file or attestation.
pub(crate) async fn read_document(
    input: &InputArgs,
    resolver_config: &ResolverConfig,
) -> Result<Vec<u8>, CliError> {
    let max_size = resolver_config.max_document_size;
    let bytes = if input.attestation {
        fetch_from(&AttestationFileSource::new(&input.input, max_size)).await?
    } else {
        fetch_from(&SpdxFileSource::new(&input.input, max_size)).await?
    };
    Ok(bytes)
}

async fn fetch_from<S: SbomSource>(source: &S) -> Result<Vec<u8>, CliError> {
    info!(source = %source.describe(), "reading SBOM");
    let bytes = source.fetch_document().await?;
    info!(bytes = bytes.len(), "SBOM loaded");
    Ok(bytes)
}
