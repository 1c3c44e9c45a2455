use crate::models::period::{PeriodMode, WeekKey};
use clap::Parser;
use std::path::PathBuf;

/// Session settings, all taken from the command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "dompet", about = "Track a student's income and expenses for one session")]
pub struct Config {
    /// Initial grouping of the summary and report views.
    #[arg(long, value_enum, default_value_t = PeriodMode::Monthly)]
    pub mode: PeriodMode,

    /// Weekly keys: `iso` keeps the ISO year, `number` merges equal week
    /// numbers of different years.
    #[arg(long, value_enum, default_value_t = WeekKey::Iso)]
    pub week_key: WeekKey,

    /// Currency symbol printed in front of amounts.
    #[arg(long, default_value = "Rp")]
    pub currency: String,

    /// Where `export` writes when no path is given.
    #[arg(long, default_value = "dompet_mahasiswa.csv")]
    pub export_path: PathBuf,

    /// Log level for stderr output; RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
