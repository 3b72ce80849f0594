use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};

use arcio::warc::Compression;
use arcextract::packer::{HttpArchiveStore, WarcPacker};

fn main() {
    pretty_env_logger::init();

    let matches = Command::new("warc-extract")
        .about("Re-materializes the captures listed in a CDX file into WARC containers")
        .arg(
            Arg::new("cdx-file")
                .value_name("CDX_FILE")
                .required(true)
                .help("The CDX file listing the captures to extract"),
        )
        .arg(
            Arg::new("archive")
                .value_name("ARCHIVE_URL")
                .required(true)
                .help("Base URL of the archive repository serving container files"),
        )
        .arg(
            Arg::new("out-dir")
                .value_name("DIR")
                .default_value(".")
                .help("Directory to write the WARC files into (created if missing)"),
        )
        .arg(
            Arg::new("compress")
                .long("compress")
                .action(ArgAction::SetTrue)
                .help("Write individually gzip-compressed records (.warc.gz)"),
        )
        .get_matches();

    let entries = match arcio::cdx::reader::read_file(required_arg(&matches, "cdx-file")) {
        Ok(entries) => entries,
        Err(e) => die(&format!("could not read the CDX file: {}", e)),
    };
    let store = match HttpArchiveStore::new(required_arg(&matches, "archive")) {
        Ok(store) => store,
        Err(e) => die(&format!("the archive repository url is invalid: {}", e)),
    };

    let compression = if matches.get_flag("compress") {
        Compression::Gzip
    } else {
        Compression::None
    };
    let packer = WarcPacker::with_compression(store, compression);
    let out_dir = PathBuf::from(required_arg(&matches, "out-dir"));

    match packer.pack(&entries, &out_dir) {
        Ok(summary) => {
            println!(
                "Packed {} of {} captures into {} files ({} skipped)",
                summary.packed,
                entries.len(),
                summary.files.len(),
                summary.skipped
            );
            println!("Finished");
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
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
