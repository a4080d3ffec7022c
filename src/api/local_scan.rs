//! Local subject scanning
//!
//! Entry points behind the `nascan` subcommands: build a table from the
//! first query record, seal it, and scan every subject record in parallel.

use anyhow::{bail, Context, Result};
use bio::io::fasta;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use super::scan_driver::{min_offset_array_size, ScanDriver};
use crate::blastinput::{ScanArgs, SelectArgs};
use crate::core::blast_diagnostics::{diagnostics_enabled, ScanDiagnosticCounters};
use crate::core::blast_encoding::PackedSequence;
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::LookupTableWrap;
use crate::error::ScanError;

/// Hits of one subject record.
pub struct SubjectHits {
    pub subject_id: String,
    pub hits: Vec<OffsetPair>,
}

fn record_id(record: &fasta::Record) -> String {
    record
        .id()
        .split_whitespace()
        .next()
        .unwrap_or("unknown")
        .to_string()
}

/// Read the first record of a FASTA file.
pub fn read_query(path: &Path) -> Result<fasta::Record> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("failed to open query {}", path.display()))?;
    match reader.records().next() {
        Some(record) => record.with_context(|| format!("failed to parse query {}", path.display())),
        None => bail!("query file {} has no records", path.display()),
    }
}

/// Read every record of a FASTA file.
pub fn read_subjects(path: &Path) -> Result<Vec<fasta::Record>> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("failed to open subjects {}", path.display()))?;
    reader
        .records()
        .map(|r| r.with_context(|| format!("failed to parse subjects {}", path.display())))
        .collect()
}

/// Scan every subject with `wrap`, one driver per worker thread.
///
/// Results are returned in subject order.
pub fn scan_subjects(
    wrap: &LookupTableWrap,
    subjects: &[fasta::Record],
    capacity: usize,
    diagnostics: Option<&ScanDiagnosticCounters>,
    bar: &ProgressBar,
) -> Result<Vec<SubjectHits>, ScanError> {
    subjects
        .par_iter()
        .map_init(
            || {
                ScanDriver::new(wrap, capacity).map(|driver| match diagnostics {
                    Some(counters) => driver.with_diagnostics(counters),
                    None => driver,
                })
            },
            |driver, record| -> Result<SubjectHits, ScanError> {
                let driver = driver.as_mut().map_err(|e| e.clone())?;
                let subject = PackedSequence::from_iupac(record.seq());
                let hits = driver.collect(wrap, &subject.view())?;
                bar.inc(1);
                Ok(SubjectHits {
                    subject_id: record_id(record),
                    hits,
                })
            },
        )
        .collect()
}

/// Write `subject_id  q_off  s_off` lines.
pub fn write_hits<W: Write>(writer: &mut W, results: &[SubjectHits]) -> io::Result<()> {
    for result in results {
        for pair in &result.hits {
            writeln!(writer, "{}\t{}\t{}", result.subject_id, pair.q_off, pair.s_off)?;
        }
    }
    writer.flush()
}

pub fn run_scan(args: ScanArgs) -> Result<()> {
    let num_threads = if args.num_threads == 0 {
        num_cpus::get()
    } else {
        args.num_threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to build thread pool")?;

    let query = read_query(&args.query)?;
    let table = args
        .table
        .build_table(query.seq())
        .with_context(|| format!("failed to build lookup table for {}", record_id(&query)))?;
    let wrap = match args.strategy {
        Some(strategy) => LookupTableWrap::with_strategy(table, strategy)?,
        None => LookupTableWrap::new(table),
    };
    info!(
        query = %record_id(&query),
        query_length = query.seq().len(),
        table = wrap.kind().name(),
        strategy = %wrap.strategy(),
        longest_chain = wrap.longest_chain(),
        "sealed lookup table"
    );

    let min_capacity = min_offset_array_size(&wrap);
    let capacity = if args.buffer_size < min_capacity {
        warn!(
            requested = args.buffer_size,
            used = min_capacity,
            "buffer size raised to the table's minimum"
        );
        min_capacity
    } else {
        args.buffer_size
    };

    let subjects = read_subjects(&args.subject)?;
    info!(subjects = subjects.len(), threads = num_threads, "scanning subjects");
    if subjects.is_empty() {
        return Ok(());
    }

    let counters = diagnostics_enabled().then(ScanDiagnosticCounters::new);

    let bar = ProgressBar::new(subjects.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("invalid progress bar template")?,
    );

    let results = scan_subjects(&wrap, &subjects, capacity, counters.as_ref(), &bar)?;
    bar.finish_and_clear();

    let total: usize = results.iter().map(|r| r.hits.len()).sum();
    info!(hits = total, "scan complete");

    let stdout = io::stdout();
    let mut writer: Box<dyn Write> = if let Some(path) = &args.out {
        Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ))
    } else {
        Box::new(BufWriter::new(stdout.lock()))
    };
    write_hits(&mut writer, &results).context("failed to write hits")?;

    if let Some(counters) = &counters {
        counters.print_summary(wrap.strategy().name());
    }
    Ok(())
}

/// Report the routine the selector picks for a table shape.
pub fn run_select(args: SelectArgs) -> Result<()> {
    // the selector only looks at the table shape, so an empty query suffices
    let table = args
        .table
        .build_table(b"")
        .context("invalid lookup table shape")?;
    let wrap = LookupTableWrap::new(table);
    debug!(strategy = %wrap.strategy(), "selector result");
    println!("{}", wrap.strategy());
    Ok(())
}
