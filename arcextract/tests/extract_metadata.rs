use std::fs;
use std::path::{Path, PathBuf};

use arcextract::cdx::{CdxExtractor, MemoryCdxSource};
use arcextract::harvest::{HarvestJobInfo, MemoryHarvestJobSource};
use arcextract::pipeline::{InputDialect, MetadataPipeline, OutputFormat, PipelineError};
use arcio::cdx::{dates, CdxEntry, CdxFormat};

fn entry(wayback_date: &str, container: &str) -> CdxEntry {
    CdxEntry {
        url: "http://example.org/".into(),
        url_normalized: "example.org/".into(),
        capture_time: dates::parse_wayback(wayback_date).unwrap(),
        content_type: Some("text/html".into()),
        http_status: Some(200),
        digest: "AAL2SABAJWFQ4DKTXRF3QPTWZ75TUHPC".into(),
        redirect_url: None,
        container_filename: container.into(),
        file_offset: 1574,
    }
}

fn source_with(entries: &[CdxEntry]) -> MemoryCdxSource {
    let format = CdxFormat::canonical();
    let mut source = MemoryCdxSource::new();
    source.insert_lines(
        "http://example.org/",
        entries.iter().map(|e| format.format_line(e).unwrap()),
    );
    source
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn url_date_identifier_resolves_to_one_row_with_job_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "wids.csv",
        "Type;#;url;date;location;filename\n\
         X;1;http://example.org/;2012-04-02T23:52:39Z;;\n",
    );
    let output = dir.path().join("metadata.csv");

    let mut jobs = MemoryHarvestJobSource::new();
    jobs.insert(HarvestJobInfo {
        id: 42,
        job_type: "FOCUSED".into(),
        name: "test".into(),
    });

    let pipeline = MetadataPipeline::new(
        input,
        CdxExtractor::new(source_with(&[entry("20120402235239", "42-117-3.warc")])),
        Some(Box::new(jobs)),
        output.clone(),
    );
    pipeline
        .run(InputDialect::Wid, OutputFormat::Csv)
        .unwrap();

    let written = fs::read_to_string(output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("URL;Normalized URL;Date;"));
    assert_eq!(
        lines[1],
        "http://example.org/;example.org/;20120402235239;text/html;200;\
         AAL2SABAJWFQ4DKTXRF3QPTWZ75TUHPC;;42-117-3.warc;1574;42;FOCUSED;test"
    );
}

#[test]
fn interval_filtering_excludes_out_of_range_captures() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "intervals.csv",
        "Type;url;earliest;latest\n\
         W;http://example.org/;2012-01-01;2012-12-31\n",
    );
    let output = dir.path().join("metadata.csv");

    let source = source_with(&[
        entry("20120301000000", "42-117-3.warc"),
        entry("20120615120000", "42-117-3.warc"),
        entry("20130101000000", "43-117-1.warc"),
    ]);
    let pipeline =
        MetadataPipeline::new(input, CdxExtractor::new(source), None, output.clone());
    pipeline
        .run(InputDialect::UrlInterval, OutputFormat::Csv)
        .unwrap();

    let written = fs::read_to_string(output).unwrap();
    let rows: Vec<&str> = written.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.contains(";2012")));
    // Unresolved job info shows up as placeholders, not omitted rows
    assert!(rows.iter().all(|row| row.ends_with("N/A;N/A;N/A")));
}

#[test]
fn cdx_export_with_job_extraction_is_rejected_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "wids.csv",
        "X;1;http://example.org/;2012-04-02T23:52:39Z;;\n",
    );
    let output = dir.path().join("entries.cdx");

    let pipeline = MetadataPipeline::new(
        input,
        CdxExtractor::new(source_with(&[entry("20120402235239", "42-117-3.warc")])),
        Some(Box::new(MemoryHarvestJobSource::new())),
        output.clone(),
    );

    match pipeline.run(InputDialect::Wid, OutputFormat::Cdx) {
        Err(PipelineError::ConflictingOutput) => {}
        other => panic!("unexpected result: {:?}", other.err()),
    }
    assert!(!output.exists());
}

#[test]
fn occupied_output_location_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "wids.csv",
        "X;1;http://example.org/;2012-04-02T23:52:39Z;;\n",
    );
    let output = write_input(dir.path(), "metadata.csv", "already here\n");

    let pipeline = MetadataPipeline::new(
        input,
        CdxExtractor::new(MemoryCdxSource::new()),
        None,
        output.clone(),
    );

    match pipeline.run(InputDialect::Wid, OutputFormat::Csv) {
        Err(PipelineError::OutputOccupied(path)) => assert_eq!(path, output),
        other => panic!("unexpected result: {:?}", other.err()),
    }
    assert_eq!(fs::read_to_string(output).unwrap(), "already here\n");
}

#[test]
fn missing_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = MetadataPipeline::new(
        dir.path().join("does-not-exist.csv"),
        CdxExtractor::new(MemoryCdxSource::new()),
        None,
        dir.path().join("metadata.csv"),
    );

    assert!(matches!(
        pipeline.run(InputDialect::Wid, OutputFormat::Csv),
        Err(PipelineError::InputMissing(_))
    ));
}

#[test]
fn cdx_export_round_trips_through_the_reader() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "intervals.csv",
        "W;http://example.org/;;\n",
    );
    let output = dir.path().join("entries.cdx");

    let expected = vec![
        entry("20120301000000", "42-117-3.warc"),
        entry("20120615120000", "42-117-3.warc"),
    ];
    let pipeline = MetadataPipeline::new(
        input,
        CdxExtractor::new(source_with(&expected)),
        None,
        output.clone(),
    );
    pipeline
        .run(InputDialect::UrlInterval, OutputFormat::Cdx)
        .unwrap();

    let reread = arcio::cdx::reader::read_file(output).unwrap();
    assert_eq!(reread, expected);
}
