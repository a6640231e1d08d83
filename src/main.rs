use anyhow::{bail, Context};
use mprkit::{init_logging, Exporter, JobDescription, PostOptions, RecordingSink};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

const USAGE: &str = "Usage: mprkit [flags] <job.json> [output-dir]

Flags:
  --no-comments            Suppress comment output
  --precision=N            Coordinate precision (default 3)
  --workpiece-length=X     Workpiece length in mm
  --workpiece-width=Y      Workpiece width in mm
  --workpiece-thickness=Z  Workpiece thickness in mm
  --g54                    Offset output to the part minimum (legacy flag)
  --no-z-offset            Keep the machine Z reference when offsetting
  --log                    Verbose logging";

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (flags, positional): (Vec<&String>, Vec<&String>) = args
        .iter()
        .partition(|a| a.starts_with("--") || a.starts_with('/'));

    let argstring = flags
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let options = PostOptions::parse_args(&argstring)?;

    init_logging(options.verbose)?;

    let Some(job_path) = positional.first() else {
        bail!("{}", USAGE);
    };
    let output_dir = positional
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let job_text = fs::read_to_string(job_path)
        .with_context(|| format!("Failed to read job description {}", job_path))?;
    let job: JobDescription =
        serde_json::from_str(&job_text).context("Failed to parse job description")?;

    let mut sink = RecordingSink::new();
    let output = Exporter::new(&options).export(&job, &mut sink)?;

    if !sink.events.is_empty() {
        warn!(
            "Export finished with {} corrections/fallbacks",
            sink.events.len()
        );
    }

    let base_name = job.base_name();
    let mpr_path = output_dir.join(format!("{}.mpr", base_name));
    let nc_path = output_dir.join(format!("{}.nc", base_name));

    // The MPR side carries CRLF endings and the G-code side LF; both are
    // written as-is.
    fs::write(&mpr_path, output.mpr.as_bytes())
        .with_context(|| format!("Failed to write {}", mpr_path.display()))?;
    fs::write(&nc_path, output.gcode.as_bytes())
        .with_context(|| format!("Failed to write {}", nc_path.display()))?;

    info!(
        "mprkit {}: wrote {} and {}",
        mprkit::VERSION,
        mpr_path.display(),
        nc_path.display()
    );

    Ok(())
}
