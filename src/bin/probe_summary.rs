//! Plain-text summary of `sax-probe --format json` output.
//!
//! Reads probe records from stdin (`sax-probe --format json | probe-summary`)
//! and prints per-producer outcome counts followed by every anomalous entry,
//! so contract violations stand out in long runs.

use anyhow::{Context, Result, bail};
use saxprobe::{read_probe_records, render_summary};
use std::io::{self, BufReader, IsTerminal};

fn main() {
    if let Err(err) = run() {
        eprintln!("probe-summary: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--help" | "-h" => usage(0),
            other => bail!("unknown argument: {other}"),
        }
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!(
            "probe-summary expects probe records on stdin \
             (e.g. sax-probe --format json | probe-summary)"
        );
    }
    let records = read_probe_records(BufReader::new(stdin.lock()))
        .context("reading probe records from stdin")?;

    let mut output = String::new();
    render_summary(&records, &mut output).context("rendering summary")?;
    print!("{output}");
    Ok(())
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: sax-probe --format json | probe-summary

Prints per-producer outcome counts and lists anomalous entries."
    );
    std::process::exit(code);
}
