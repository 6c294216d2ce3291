use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::json;
use simsweep_exp::{load_plan, write_sweep, DirectoryStore, MemoryStore, SweepGenerator};
use tracing::info;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Directory receiving the run scripts; overrides the plan's `scripts_dir`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Directory the simulator writes into; overrides the plan's `results_dir`.
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Host the scripts are rendered for; selects the plan's host preamble.
    #[arg(long, env = "HOSTNAME", default_value = "localhost")]
    pub host: String,
    /// Remove the scripts directory before writing.
    #[arg(long)]
    pub clean: bool,
    /// Render everything in memory and only print the summary.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut plan = load_plan(&args.plan)?;
    if let Some(out) = &args.out {
        plan.output.scripts_dir = absolute(out)?;
    }
    if let Some(results) = &args.results {
        plan.output.results_dir = absolute(results)?;
    }

    let generator = SweepGenerator::new(&plan, args.host.as_str())?;
    let summary = if args.dry_run {
        write_sweep(&generator, &mut MemoryStore::new())?
    } else {
        let scripts_dir = plan.scripts_dir();
        if args.clean && scripts_dir.exists() {
            info!(dir = %scripts_dir.display(), "removing previous scripts");
            fs::remove_dir_all(&scripts_dir)?;
        }
        let mut store = DirectoryStore::create(&scripts_dir)?;
        write_sweep(&generator, &mut store)?
    };

    let report = json!({
        "plan": plan.name,
        "host": args.host,
        "combinations": summary.combinations,
        "scripts": summary.scripts,
        "failures": summary.failures.len(),
        "manifest_id": summary.manifest.id,
        "scripts_dir": plan.scripts_dir().display().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} runs could not be generated", summary.failures.len()).into())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    Ok(env::current_dir()?.join(path))
}
