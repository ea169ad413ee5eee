//! Probes each named producer and prints what its features and properties
//! support.
//!
//! With no producer names the built-in defaults are scanned (or the list in
//! `SAXPROBE_PRODUCERS`). Producers that cannot be created, or whose scan hits
//! an unexpected failure, are reported and skipped; the exit status stays 0
//! as long as the report itself could be written.

use anyhow::{Result, anyhow, bail};
use saxprobe::{
    DEFAULT_PRODUCERS, JsonReport, ProbeRunner, ProducerRegistry, ReportSink, SampleRegistry,
    TextReport, default_producer_names, logging, resolve_catalog,
};
use std::env;
use std::io::{self, BufWriter};
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("sax-probe: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    logging::init(cli.verbose);

    let catalog = resolve_catalog(cli.catalog_path.as_deref())?;
    let registry = ProducerRegistry::with_builtins();
    let samples = SampleRegistry::with_builtins();
    let names = if cli.producers.is_empty() {
        default_producer_names()
    } else {
        cli.producers
    };

    let runner = ProbeRunner::new(&registry, &catalog, &samples);
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    let mut sink: Box<dyn ReportSink> = match cli.format {
        Format::Text => Box::new(TextReport::new(out)),
        Format::Json => Box::new(JsonReport::new(out)),
    };
    let summary = runner.run(&names, sink.as_mut())?;

    tracing::info!(
        catalog = catalog.name(),
        producers = summary.producers.len(),
        unavailable = summary.unavailable(),
        aborted = summary.aborted(),
        entries = summary.entries_scanned(),
        "run complete"
    );
    Ok(())
}

#[derive(Clone, Copy)]
enum Format {
    Text,
    Json,
}

struct Cli {
    producers: Vec<String>,
    catalog_path: Option<PathBuf>,
    format: Format,
    verbose: bool,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut producers = Vec::new();
        let mut catalog_path = None;
        let mut format = Format::Text;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            let arg = arg
                .into_string()
                .map_err(|_| anyhow!("invalid UTF-8 in argument"))?;
            match arg.as_str() {
                "--catalog" => {
                    catalog_path = Some(PathBuf::from(next_value("--catalog", &mut args)?))
                }
                "--format" => {
                    format = match next_value("--format", &mut args)?.as_str() {
                        "text" => Format::Text,
                        "json" => Format::Json,
                        other => bail!("--format must be text or json, got {other}"),
                    }
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => usage(0),
                flag if flag.starts_with('-') => bail!("unknown argument: {flag}"),
                name => producers.push(name.to_string()),
            }
        }

        Ok(Self {
            producers,
            catalog_path,
            format,
            verbose,
        })
    }
}

fn next_value(flag: &str, args: &mut env::ArgsOs) -> Result<String> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?
        .into_string()
        .map_err(|_| anyhow!("{flag} must be valid UTF-8"))?;
    if value.is_empty() {
        bail!("{flag} must not be empty");
    }
    Ok(value)
}

fn usage(code: i32) -> ! {
    eprintln!("{}", usage_text(&ProducerRegistry::with_builtins()));
    std::process::exit(code);
}

fn usage_text(registry: &ProducerRegistry) -> String {
    let registered = registry.names().collect::<Vec<_>>().join(", ");
    format!(
        "Usage: sax-probe [--catalog PATH] [--format text|json] [--verbose] [PRODUCER ...]

Scans each producer's features and properties and classifies their support.

Options:
  --catalog PATH      Probe the entries listed in a JSON catalog (or set SAXPROBE_CATALOG).
  --format FORMAT     text (default) or json (one record per line).
  --verbose, -v       Log every probe step to stderr (RUST_LOG overrides).
  --help, -h          Show this help text.

Without PRODUCER arguments, SAXPROBE_PRODUCERS or the default list
({defaults}) is scanned.

Registered producers: {registered}",
        defaults = DEFAULT_PRODUCERS.join(", "),
    )
}
