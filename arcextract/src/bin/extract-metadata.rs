use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgMatches, Command};

use arcextract::cdx::{CdxExtractor, HttpCdxSource};
use arcextract::harvest::{HarvestJobSource, HttpHarvestJobSource};
use arcextract::pipeline::{InputDialect, MetadataPipeline, OutputFormat};

fn main() {
    pretty_env_logger::init();

    let matches = Command::new("extract-metadata")
        .about(
            "Correlates a CSV file of web identifiers with CDX index records \
             and, optionally, harvest job metadata",
        )
        .arg(
            Arg::new("input")
                .value_name("CSV_FILE")
                .required(true)
                .help(
                    "Input CSV file, in the WID dialect \
                     ('W'/'X';#;url;date;location;filename) or the URL interval \
                     dialect ('W';url;earliest;latest)",
                ),
        )
        .arg(
            Arg::new("dialect")
                .value_name("DIALECT")
                .required(true)
                .help("Input dialect: 'WID' or 'URL'"),
        )
        .arg(
            Arg::new("cdx-server")
                .value_name("CDX_URL")
                .required(true)
                .help("Base URL of the CDX server"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .value_name("JOBS_URL")
                .help("Base URL of the harvest job service; enables job metadata extraction"),
        )
        .arg(
            Arg::new("output-format")
                .long("output-format")
                .value_name("FORMAT")
                .default_value("CSV")
                .help(
                    "Output format: 'CSV' (metadata export) or 'CDX' (classical \
                     index file); CDX cannot be combined with --jobs",
                ),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help(
                    "Location for the output file; must not already exist \
                     [default: metadata.csv or entries.cdx]",
                ),
        )
        .get_matches();

    let dialect = match required_arg(&matches, "dialect").parse::<InputDialect>() {
        Ok(dialect) => dialect,
        Err(e) => die(&e.to_string()),
    };
    let format = match OutputFormat::from_arg(required_arg(&matches, "output-format")) {
        Ok(format) => format,
        Err(e) => die(&e.to_string()),
    };

    let source = match HttpCdxSource::new(required_arg(&matches, "cdx-server")) {
        Ok(source) => source,
        Err(e) => die(&format!("the CDX server url is invalid: {}", e)),
    };
    let jobs: Option<Box<dyn HarvestJobSource>> = match matches.get_one::<String>("jobs") {
        Some(base) => match HttpHarvestJobSource::new(base) {
            Ok(source) => Some(Box::new(source)),
            Err(e) => die(&format!("the harvest job service url is invalid: {}", e)),
        },
        None => None,
    };

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(match format {
                OutputFormat::Csv => "metadata.csv",
                OutputFormat::Cdx => "entries.cdx",
            })
        });

    let pipeline = MetadataPipeline::new(
        PathBuf::from(required_arg(&matches, "input")),
        CdxExtractor::new(source),
        jobs,
        output,
    );
    if let Err(e) = pipeline.run(dialect, format) {
        eprintln!("{}", e);
        process::exit(1);
    }
    println!("Finished");
}

fn required_arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => die(&format!("missing required argument '{}'", name)),
    }
}

fn die(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}
