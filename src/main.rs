//! placemark - KML/KMZ to feature converter

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::executor::block_on;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use placemark::{DefaultProxy, FeatureRecord, FileLoader, KmlDataSource, LoadOptions};

#[derive(Parser)]
#[command(name = "placemark")]
#[command(version, about = "Convert KML and KMZ documents into geographic features", long_about = None)]
#[command(after_help = "EXAMPLES:
    placemark places.kml               Summarize the features of a document
    placemark tour.kmz --json          Print the converted model as JSON
    placemark doc.kml --base http://example.com/kml/")]
struct Cli {
    /// Input file (KML or KMZ)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Base URI for relative references (defaults to the input path)
    #[arg(long, value_name = "URI")]
    base: Option<String>,

    /// Route absolute resource URLs through PREFIX?<url>
    #[arg(long, value_name = "PREFIX")]
    proxy: Option<String>,

    /// Print the feature collection as JSON
    #[arg(long)]
    json: bool,

    /// Log progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("placemark=info"),
        2 => EnvFilter::new("placemark=debug"),
        _ => EnvFilter::new("placemark=trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let data = std::fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;

    let mut options = LoadOptions::new();
    if let Some(prefix) = &cli.proxy {
        options = options.with_proxy(DefaultProxy::new(prefix.clone()));
    }
    let mut source = KmlDataSource::with_loader(Arc::new(FileLoader::new())).with_options(options);
    let base = cli.base.clone().unwrap_or_else(|| cli.input.clone());

    let loaded = if placemark::is_zip(&data) {
        let load = source
            .load_kmz(data, Some(base.as_str()))
            .map_err(|e| e.to_string())?;
        block_on(load).map(|_| ())
    } else {
        let text = placemark::decode_text(&data);
        block_on(source.load_str(&text, Some(base.as_str()))).map(|_| ())
    };
    loaded.map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(source.features()).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        show_summary(&cli.input, &source);
    }
    Ok(())
}

fn show_summary(path: &str, source: &KmlDataSource) {
    println!("File: {path}");
    if let Some(name) = source.name() {
        println!("Name: {name}");
    }
    println!("Features: {}", source.features().len());
    for record in source.features() {
        let depth = ancestors(source, record);
        println!(
            "{}{:?} {}{}",
            "  ".repeat(depth + 1),
            record.kind,
            record.id,
            record
                .name
                .as_deref()
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default()
        );
    }
}

fn ancestors(source: &KmlDataSource, record: &FeatureRecord) -> usize {
    let mut depth = 0;
    let mut current = source.features().parent_of(record);
    while let Some(parent) = current {
        depth += 1;
        current = source.features().parent_of(parent);
    }
    depth
}
