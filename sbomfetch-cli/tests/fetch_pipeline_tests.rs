//! End-to-end tests for the `fetch`, `resolve` and `extract` handlers.
//!
//! A local HTTP server serves tarballs built in memory; the SBOM points at it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use httpmock::prelude::*;
use tempfile::TempDir;

use sbomfetch_cli::cli::{ExtractArgs, FetchArgs, InputArgs, ResolveArgs};
use sbomfetch_cli::commands::{extract, fetch, resolve};
use sbomfetch_cli::error::CliError;
use sbomfetch_core::SbomfetchConfig;

fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, body.as_bytes())
            .expect("append entry");
    }
    let mut encoder = builder.into_inner().expect("finish tar");
    encoder.flush().expect("flush");
    encoder.finish().expect("finish gzip")
}

fn spdx_document(server: &MockServer) -> serde_json::Value {
    serde_json::json!({
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "packages": [
            { "SPDXID": "SPDXRef-Package-libgcc", "name": "libgcc" },
            { "SPDXID": "SPDXRef-Package-glibc", "name": "glibc" },
            {
                "SPDXID": "SPDXRef-Package-glibc-src",
                "name": "glibc-src",
                "downloadLocation": server.url("/gnu/glibc-2.41.tar.gz")
            },
            { "SPDXID": "SPDXRef-Package-zlib", "name": "zlib" },
            {
                "SPDXID": "SPDXRef-Package-zlib-src",
                "name": "zlib-src",
                "downloadLocation": server.url("/zlib-1.3.1.tar.gz")
            },
            { "SPDXID": "SPDXRef-Package-gone", "name": "gone" },
            {
                "SPDXID": "SPDXRef-Package-gone-src",
                "name": "gone-src",
                "downloadLocation": server.url("/gone-0.1.tar.gz")
            }
        ],
        "relationships": [
            {
                "spdxElementId": "SPDXRef-Package-libgcc",
                "relationshipType": "GENERATED_FROM",
                "relatedSpdxElement": "SPDXRef-Package-glibc-src"
            },
            {
                "spdxElementId": "SPDXRef-Package-zlib",
                "relationshipType": "GENERATED_FROM",
                "relatedSpdxElement": "SPDXRef-Package-zlib-src"
            },
            {
                "spdxElementId": "SPDXRef-Package-gone",
                "relationshipType": "GENERATED_FROM",
                "relatedSpdxElement": "SPDXRef-Package-gone-src"
            },
            {
                "spdxElementId": "SPDXRef-Package-glibc",
                "relationshipType": "GENERATED_FROM",
                "relatedSpdxElement": "SPDXRef-Package-missing-src"
            }
        ]
    })
}

struct Fixture {
    server: MockServer,
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gnu/glibc-2.41.tar.gz");
            then.status(200)
                .body(tar_gz(&[("glibc-2.41/README", "GNU C Library")]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/zlib-1.3.1.tar.gz");
            then.status(200)
                .body(tar_gz(&[("zlib-1.3.1/zlib.h", "#define ZLIB_VERSION")]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/gone-0.1.tar.gz");
            then.status(404);
        });

        Self {
            server,
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn write_sbom(&self) -> PathBuf {
        let path = self.dir.path().join("sbom.spdx.json");
        let doc = spdx_document(&self.server);
        fs::write(&path, serde_json::to_vec(&doc).expect("json")).expect("write sbom");
        path
    }

    fn write_attestation(&self) -> PathBuf {
        let other = serde_json::json!({
            "_type": "https://in-toto.io/Statement/v0.1",
            "predicateType": "https://slsa.dev/provenance/v0.2",
            "predicate": {}
        });
        let spdx = serde_json::json!({
            "_type": "https://in-toto.io/Statement/v0.1",
            "predicateType": "https://spdx.dev/Document",
            "predicate": spdx_document(&self.server)
        });
        let line = |statement: &serde_json::Value| {
            serde_json::json!({
                "payloadType": "application/vnd.in-toto+json",
                "payload": STANDARD.encode(serde_json::to_vec(statement).expect("json")),
                "signatures": []
            })
            .to_string()
        };

        let path = self.dir.path().join("image.att.json");
        fs::write(&path, format!("{}\n{}\n", line(&other), line(&spdx))).expect("write att");
        path
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }
}

fn input(path: &Path, attestation: bool, strict: bool) -> InputArgs {
    InputArgs {
        input: path.to_path_buf(),
        attestation,
        strict,
    }
}

fn fetch_args(input: InputArgs, out_dir: PathBuf) -> FetchArgs {
    FetchArgs {
        input,
        out_dir,
        concurrency: Some(2),
        no_extract: false,
    }
}

#[tokio::test]
async fn test_fetch_downloads_and_extracts() {
    let fx = Fixture::new();
    let sbom = fx.write_sbom();
    let args = fetch_args(input(&sbom, false, false), fx.out());

    let report = fetch::run(&args, &SbomfetchConfig::default())
        .await
        .expect("fetch should succeed despite a 404");

    assert_eq!(report.resolve.task_count, 3);
    assert_eq!(report.resolve.warnings.len(), 1);
    assert_eq!(report.downloads.succeeded, 2);
    assert_eq!(report.downloads.failed, 1);
    assert!(report.downloads.failures[0].url.ends_with("/gone-0.1.tar.gz"));
    assert_eq!(report.downloads.failures[0].owners, vec!["gone"]);

    let archives = fx.out().join(fetch::ARCHIVES_DIR);
    assert!(archives.join("glibc-2.41.tar.gz").is_file());
    assert!(archives.join("zlib-1.3.1.tar.gz").is_file());
    assert!(!archives.join("gone-0.1.tar.gz").exists());

    let extraction = report.extraction.expect("extraction enabled by default");
    assert_eq!(extraction.succeeded, 2);
    assert_eq!(extraction.failed, 0);
    assert_eq!(
        fs::read_to_string(fx.out().join("glibc-2.41/README")).expect("extracted"),
        "GNU C Library"
    );
    assert!(fx.out().join("zlib-1.3.1/zlib.h").is_file());

    let glibc = extraction
        .archives
        .iter()
        .find(|a| a.archive.ends_with("glibc-2.41.tar.gz"))
        .expect("glibc archive in report");
    assert_eq!(glibc.owners, vec!["libgcc"]);
    assert!(!fx.out().join(fetch::SBOM_COPY).exists());
}

#[tokio::test]
async fn test_fetch_from_attestation_saves_sbom_copy() {
    let fx = Fixture::new();
    let att = fx.write_attestation();
    let mut args = fetch_args(input(&att, true, false), fx.out());
    args.no_extract = true;

    let report = fetch::run(&args, &SbomfetchConfig::default())
        .await
        .expect("fetch from attestation");

    assert!(report.extraction.is_none());
    assert_eq!(report.downloads.succeeded, 2);
    assert!(!fx.out().join("glibc-2.41").exists());

    let copy = fs::read(fx.out().join(fetch::SBOM_COPY)).expect("sbom copy saved");
    let doc: serde_json::Value = serde_json::from_slice(&copy).expect("valid JSON");
    assert_eq!(doc["packages"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn test_fetch_strict_mode_aborts_before_downloading() {
    let fx = Fixture::new();
    let sbom = fx.write_sbom();
    let args = fetch_args(input(&sbom, false, true), fx.out());

    let err = match fetch::run(&args, &SbomfetchConfig::default()).await {
        Ok(_) => panic!("strict mode should reject the missing source package"),
        Err(e) => e,
    };
    assert_eq!(err.exit_code(), 3);
    let archives = fx.out().join(fetch::ARCHIVES_DIR);
    assert_eq!(fs::read_dir(archives).expect("dir").count(), 0);
}

#[tokio::test]
async fn test_fetch_missing_input_is_document_error() {
    let fx = Fixture::new();
    let args = fetch_args(
        input(&fx.dir.path().join("nope.json"), false, false),
        fx.out(),
    );

    let err = match fetch::run(&args, &SbomfetchConfig::default()).await {
        Ok(_) => panic!("missing input should fail"),
        Err(e) => e,
    };
    assert!(matches!(err, CliError::Core(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_fetch_rejects_invalid_concurrency_override() {
    let fx = Fixture::new();
    let sbom = fx.write_sbom();
    let mut args = fetch_args(input(&sbom, false, false), fx.out());
    args.concurrency = Some(0);

    let err = match fetch::run(&args, &SbomfetchConfig::default()).await {
        Ok(_) => panic!("zero concurrency should be rejected"),
        Err(e) => e,
    };
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_resolve_lists_tasks_without_network() {
    let fx = Fixture::new();
    let sbom = fx.write_sbom();
    let args = ResolveArgs {
        input: input(&sbom, false, false),
    };

    let report = resolve::run(&args, &SbomfetchConfig::default())
        .await
        .expect("resolve");

    let urls: Vec<_> = report.tasks.iter().map(|t| t.url.as_str()).collect();
    let mut sorted = urls.clone();
    sorted.sort_unstable();
    assert_eq!(urls, sorted, "tasks are ordered by URL");
    assert_eq!(urls.len(), 3);
    assert!(!fx.out().exists(), "resolve must not create output");

    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["counts"]["packages"], 7);
    assert_eq!(json["warnings"][0]["kind"], "missing_source");
}

#[tokio::test]
async fn test_extract_command_reports_per_archive() {
    let fx = Fixture::new();
    let good = fx.dir.path().join("hello-1.0.tar.gz");
    fs::write(&good, tar_gz(&[("hello-1.0/main.c", "int main;")])).expect("write");
    let bad = fx.dir.path().join("notes.zip");
    fs::write(&bad, b"PK").expect("write");

    let args = ExtractArgs {
        archives: vec![good, bad],
        into: fx.out(),
        concurrency: None,
    };
    let report = extract::run(&args, &SbomfetchConfig::default())
        .await
        .expect("extract");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert!(fx.out().join("hello-1.0/main.c").is_file());
    let failed = report
        .archives
        .iter()
        .find(|a| a.error.is_some())
        .expect("failed archive");
    assert!(failed.archive.ends_with("notes.zip"));
    assert_eq!(failed.owners, vec!["unknown"]);
}
