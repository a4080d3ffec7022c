//! NASCAN Arguments
//!
//! Table shape arguments are shared by `scan` and `select`; `scan` adds the
//! input, buffer and output options.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::api::scan_driver::DEFAULT_OFFSET_ARRAY_SIZE;
use crate::core::blast_nalookup::{
    DiscTemplate, LookupTable, MbLookupTable, NaLookupTable, SmallNaLookupTable,
};
use crate::core::blast_nascan::ScanStrategy;
use crate::error::LookupError;

/// Lookup table layout requested on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKindArg {
    /// Thick backbone with inline hits (word size 4-8)
    Standard,
    /// 16-bit backbone for short queries (word size 4-8)
    Small,
    /// Hashed chains with a presence vector (word size 9-12 or a template)
    Megablast,
}

fn parse_template(name: &str) -> Result<DiscTemplate, String> {
    DiscTemplate::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = DiscTemplate::ALL.iter().map(|t| t.name()).collect();
        format!("unknown template '{}' (expected one of: {})", name, names.join(", "))
    })
}

fn parse_strategy(name: &str) -> Result<ScanStrategy, String> {
    ScanStrategy::from_name(name).ok_or_else(|| format!("unknown scan routine '{}'", name))
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    #[arg(long, value_enum, default_value_t = TableKindArg::Small)]
    pub table: TableKindArg,
    #[arg(short, long, default_value_t = 8)]
    pub word_size: usize,
    /// Bases between scanned words (0 = byte-aligned stride 4, word size 8 only)
    #[arg(long, default_value_t = 1)]
    pub scan_step: usize,
    /// Discontiguous template, e.g. 11_18_coding (megablast only; overrides --word-size)
    #[arg(long, value_parser = parse_template)]
    pub template: Option<DiscTemplate>,
    /// Second template of the same shape sharing the presence vector
    #[arg(long, value_parser = parse_template, requires = "template")]
    pub second_template: Option<DiscTemplate>,
    /// Scan discontiguous words at every fourth position
    #[arg(long, default_value_t = false, requires = "template")]
    pub full_byte_scan: bool,
}

impl TableArgs {
    /// Build the requested table over `query` (IUPAC text).
    pub fn build_table(&self, query: &[u8]) -> Result<LookupTable, LookupError> {
        let table = match self.table {
            TableKindArg::Standard => {
                NaLookupTable::build(query, self.word_size, self.scan_step)?.into()
            }
            TableKindArg::Small => {
                SmallNaLookupTable::build(query, self.word_size, self.scan_step)?.into()
            }
            TableKindArg::Megablast => match self.template {
                Some(template) => MbLookupTable::build_discontiguous(
                    query,
                    template,
                    self.second_template,
                    self.full_byte_scan,
                )?
                .into(),
                None => {
                    MbLookupTable::build_contiguous(query, self.word_size, self.scan_step)?.into()
                }
            },
        };
        Ok(table)
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub query: PathBuf,
    #[arg(short, long)]
    pub subject: PathBuf,
    #[command(flatten)]
    pub table: TableArgs,
    /// Force a scan routine by name instead of the selector's choice
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<ScanStrategy>,
    /// Offset pairs held per scan call (raised to the table's minimum if smaller)
    #[arg(long, default_value_t = DEFAULT_OFFSET_ARRAY_SIZE)]
    pub buffer_size: usize,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub table: TableArgs,
}
