//! ldreg - command-line access to a file-backed registry store.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use ldreg::rdf::nquads::QuadWriter;
use ldreg::rdf::Iri;
use ldreg::storage::Query;
use ldreg::store::{NQuadsSink, Store};
use ldreg::StoreConfig;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut verbose = false;
    let mut positional: Vec<String> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("ldreg v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            a if a.starts_with('-') && a != "-" => {
                eprintln!("Unknown option: {}", a);
                return ExitCode::FAILURE;
            }
            a => positional.push(a.to_string()),
        }
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let [path, command, rest @ ..] = positional.as_slice() else {
        print_help();
        return ExitCode::FAILURE;
    };

    let config = StoreConfig::new(PathBuf::from(path))
        .create_if_missing(true)
        .verbose(verbose);
    let store = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&store, command, rest) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("ldreg - versioned linked-data registry store");
    println!();
    println!("Usage: ldreg [OPTIONS] STORE COMMAND [ARGS]");
    println!();
    println!("Commands:");
    println!("  load FILE              Load N-Quads bootstrap data");
    println!("  export URI [FILE]      Export a register tree as N-Quads (stdout by default)");
    println!("  import URI FILE        Replace a register tree from an export");
    println!("  versions URI           List the version history as JSON");
    println!("  describe URI           Print the current version as N-Quads");
    println!("  members REGISTER       List current members as JSON");
    println!("  query PATTERNS         Run a basic graph pattern query");
    println!("  delete URI             Delete an item or register with its history");
    println!();
    println!("Options:");
    println!("  -v, --verbose          Enable debug logging");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
}

fn run(store: &Store, command: &str, args: &[String]) -> CliResult {
    match (command, args) {
        ("load", [file]) => {
            let count = store.load_bootstrap(BufReader::new(File::open(file)?))?;
            println!("{} statement(s) loaded", count);
        }
        ("export", [uri, rest @ ..]) => {
            let uri = Iri::new(uri.as_str())?;
            let writer: Box<dyn Write> = match rest {
                [file] => Box::new(BufWriter::new(File::create(file)?)),
                _ => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let mut sink = NQuadsSink::new(writer);
            store.export_tree(&uri, &mut sink)?;
            eprintln!("{} statement(s) exported", sink.count());
        }
        ("import", [uri, file]) => {
            let uri = Iri::new(uri.as_str())?;
            let count = store.import_tree(&uri, BufReader::new(File::open(file)?))?;
            println!("{} statement(s) imported", count);
        }
        ("versions", [uri]) => {
            let versions = store.list_versions(&Iri::new(uri.as_str())?)?;
            println!("{}", serde_json::to_string_pretty(&versions)?);
        }
        ("describe", [uri]) => {
            let description = store.get_current_version(&Iri::new(uri.as_str())?)?;
            let mut out = BufWriter::new(io::stdout().lock());
            let mut quads = QuadWriter::new(&mut out);
            for triple in description.description().graph().triples() {
                quads.write(None, &triple)?;
            }
            quads.finish().flush()?;
        }
        ("members", [register]) => {
            let members = store.list_members(&Iri::new(register.as_str())?, &[])?;
            println!("{}", serde_json::to_string_pretty(&members)?);
        }
        ("query", [text]) => {
            let rows = store.query(&Query::parse(text)?);
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        ("delete", [uri]) => {
            store.delete(&Iri::new(uri.as_str())?)?;
        }
        _ => {
            print_help();
            return Err(format!("unknown command or wrong arguments: {}", command).into());
        }
    }
    Ok(())
}
