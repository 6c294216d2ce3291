use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use csv::WriterBuilder;
use simsweep_exp::{expand, load_plan};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
}

/// Writes `sequence`, every axis and every derived field as TSV on stdout.
pub fn run(args: &ExpandArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let resolver = plan.resolver()?;

    let mut columns = vec!["sequence".to_string()];
    columns.extend(plan.axes.names().map(str::to_string));
    columns.extend(resolver.fields().iter().map(|field| field.name.clone()));

    let stdout = io::stdout();
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(stdout.lock());
    writer.write_record(&columns)?;

    let mut rows = 0usize;
    for (sequence, record) in expand(&plan.axes) {
        let record = match resolver.resolve(record) {
            Ok(record) => record,
            Err(err) => {
                warn!(%sequence, error = %err, "configuration skipped");
                continue;
            }
        };
        let mut row = Vec::with_capacity(columns.len());
        row.push(sequence.to_string());
        for column in &columns[1..] {
            row.push(record.get(column).map(ToString::to_string).unwrap_or_default());
        }
        writer.write_record(&row)?;
        rows += 1;
    }
    writer.flush()?;
    info!(rows, "expanded configurations");
    Ok(())
}
