//! Integration tests for the docsight pipeline.
//!
//! Most tests here exercise the LLM-free portions of the run — scanning,
//! classification, the empty-input guard, report writing, credentials
//! loading — and need no API key or pdfium library.
//!
//! The final live test drives the whole pipeline against a real provider
//! and is gated behind the `E2E_ENABLED` environment variable so it does
//! not run in CI unless explicitly requested:
//!
//!   E2E_ENABLED=1 cargo test --test pipeline -- --nocapture

use docsight::{
    load_credentials, run, run_to_file, DocsightError, ReportFormat, RunConfig,
};
use std::path::Path;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A 1×1 transparent PNG, the smallest well-formed image we can plant in
/// a test directory.
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn config_for(documents: &Path, output: &Path) -> RunConfig {
    RunConfig::builder()
        .documents_path(documents)
        .output_path(output)
        .build()
        .unwrap()
}

/// Skip the live test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run live e2e tests");
            return;
        }
    };
}

// ── Classification through the public run() surface ──────────────────────────

#[tokio::test]
async fn missing_documents_directory_is_input_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("does-not-exist"), &dir.path().join("out"));

    let result = run(&config).await;
    assert!(matches!(result, Err(DocsightError::InputPath { .. })));
}

#[tokio::test]
async fn empty_documents_directory_is_no_processable_input() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("documents");
    std::fs::create_dir(&docs).unwrap();
    let config = config_for(&docs, &dir.path().join("out"));

    // Resolved before any provider lookup, so no API key is needed.
    let result = run(&config).await;
    assert!(matches!(
        result,
        Err(DocsightError::NoProcessableInput { .. })
    ));
}

#[tokio::test]
async fn unsupported_only_directory_is_no_processable_input() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("documents");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("notes.txt"), b"plain text").unwrap();
    std::fs::write(docs.join("data.csv"), b"a,b\n1,2\n").unwrap();
    std::fs::create_dir(docs.join("subfolder")).unwrap();

    let config = config_for(&docs, &dir.path().join("out"));
    let result = run(&config).await;
    assert!(matches!(
        result,
        Err(DocsightError::NoProcessableInput { .. })
    ));
}

#[tokio::test]
async fn no_output_file_created_when_run_fails() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("documents");
    let out = dir.path().join("out");
    std::fs::create_dir(&docs).unwrap();

    let config = config_for(&docs, &out);
    let result = run_to_file(&config).await;

    assert!(result.is_err());
    assert!(!out.exists(), "failed run must not create the output dir");
}

// ── Classification details via the pipeline module ───────────────────────────

#[test]
fn scan_orders_entries_by_file_name_bytes() {
    use docsight::pipeline::classify::{scan_directory, DocumentKind};

    let dir = tempfile::tempdir().unwrap();
    // Deliberately created out of order; uppercase sorts before lowercase
    // in byte order.
    std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
    std::fs::write(dir.path().join("a.png"), TINY_PNG).unwrap();
    std::fs::write(dir.path().join("B.JPG"), b"\xFF\xD8\xFF").unwrap();

    let entries = scan_directory(dir.path()).unwrap();
    let names: Vec<String> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["B.JPG", "a.png", "b.pdf"]);

    // Indices follow sort order.
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.index, i);
    }

    assert!(matches!(entries[0].kind, DocumentKind::Image(_)));
    assert!(matches!(entries[1].kind, DocumentKind::Image(_)));
    assert_eq!(entries[2].kind, DocumentKind::Convertible);
}

#[test]
fn mixed_directory_classifies_and_counts() {
    use docsight::pipeline::classify::{processable_count, scan_directory, DocumentKind};

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("photo.jpeg"), b"\xFF\xD8\xFF").unwrap();
    std::fs::write(dir.path().join("chart.webp"), b"RIFF").unwrap();
    std::fs::write(dir.path().join("doc.pdf"), b"%PDF-1.4").unwrap();
    std::fs::write(dir.path().join("readme.md"), b"# hi").unwrap();
    std::fs::write(dir.path().join("noext"), b"???").unwrap();

    let entries = scan_directory(dir.path()).unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(processable_count(&entries), 3);

    let unsupported: Vec<String> = entries
        .iter()
        .filter(|e| e.kind == DocumentKind::Unsupported)
        .map(|e| e.name())
        .collect();
    assert_eq!(unsupported, vec!["noext", "readme.md"]);
}

// ── Report writing ───────────────────────────────────────────────────────────

#[tokio::test]
async fn report_file_name_tracks_format() {
    use docsight::{writer::write_report, Report, StageUsage};

    let dir = tempfile::tempdir().unwrap();

    let md = Report {
        format: ReportFormat::Markdown,
        body: "# Findings\n".to_string(),
        usage: StageUsage::default(),
    };
    let html = Report {
        format: ReportFormat::Html,
        body: "<html><body><h1>Findings</h1></body></html>\n".to_string(),
        usage: StageUsage::default(),
    };

    let md_path = write_report(&md, dir.path()).await.unwrap();
    let html_path = write_report(&html, dir.path()).await.unwrap();

    assert!(md_path.ends_with("report.md"));
    assert!(html_path.ends_with("report.html"));
    assert_eq!(std::fs::read_to_string(&md_path).unwrap(), "# Findings\n");
}

// ── Credentials loading ──────────────────────────────────────────────────────

#[test]
fn credentials_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.properties");
    std::fs::write(
        &path,
        "[langfuse]\n\
         langfuse_public_key = pk-lf-test\n\
         langfuse_secret_key = sk-lf-test\n\
         langfuse_host = https://cloud.langfuse.com\n",
    )
    .unwrap();

    let creds = load_credentials(&path);
    assert!(creds.is_complete());
    assert_eq!(creds.public_key.as_deref(), Some("pk-lf-test"));
    assert_eq!(
        creds.host.as_deref(),
        Some("https://cloud.langfuse.com")
    );
}

#[test]
fn missing_credentials_file_degrades_to_empty() {
    let creds = load_credentials(Path::new("/definitely/not/here.properties"));
    assert!(!creds.is_complete());
    assert!(creds.public_key.is_none());
}

// ── Live end-to-end (requires API key + pdfium) ──────────────────────────────

#[tokio::test]
async fn live_run_produces_clean_report() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("documents");
    let out = dir.path().join("out");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("pixel.png"), TINY_PNG).unwrap();

    let config = RunConfig::builder()
        .documents_path(&docs)
        .output_path(&out)
        .guidance("describe whatever you can see, however minimal")
        .build()
        .unwrap();

    let (path, output) = run_to_file(&config).await.expect("live run should succeed");

    let body = std::fs::read_to_string(&path).unwrap();
    assert!(!body.trim().is_empty());
    assert!(body.ends_with('\n'), "report must end with a newline");
    assert!(
        !body.lines().next().unwrap_or("").starts_with("```"),
        "report must not start with a code fence"
    );
    assert!(!body.contains("\n\n\n\n"), "no runs of blank lines");

    assert_eq!(output.stats.images_analyzed, 1);
    assert!(output.stats.total_output_tokens > 0);
    println!("✓ live run: {} bytes at {}", body.len(), path.display());
}
