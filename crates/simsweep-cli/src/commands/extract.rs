use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use simsweep_exp::{
    collect_output_files, metric_table_tsv, MetricExtractor, MetricRecord, DEFAULT_MARKER,
};
use tracing::info;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory holding the simulator output files.
    #[arg(long)]
    pub results: PathBuf,
    /// Glob selecting output files inside `--results`.
    #[arg(long, default_value = "*")]
    pub pattern: String,
    /// Substring identifying the metric line.
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,
    /// Separator between the label and the value on the metric line.
    #[arg(long, default_value_t = '=')]
    pub delimiter: char,
    /// Run names become the path text after this marker instead of the file name.
    #[arg(long)]
    pub root_marker: Option<String>,
    /// Destination of the two-column metric table.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ExtractArgs) -> Result<(), Box<dyn Error>> {
    let files = collect_output_files(&args.results, &args.pattern)?;
    let mut extractor = MetricExtractor::new(args.marker.as_str()).with_delimiter(args.delimiter);
    if let Some(root) = &args.root_marker {
        extractor = extractor.with_results_root(root.as_str());
    }

    let scanned = files.len();
    let records: Vec<MetricRecord> = extractor.extract(files).collect();
    if let Some(parent) = args.out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.out, metric_table_tsv(&records)?)?;
    info!(
        scanned,
        records = records.len(),
        out = %args.out.display(),
        "metric table written"
    );
    Ok(())
}
