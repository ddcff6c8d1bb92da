use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "orbitsweep", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a render configuration and report what a run would produce.
    Plan(PlanArgs),
    /// Validate a render configuration and exit.
    Validate(ValidateArgs),
    /// Print the metadata.json document a run would write.
    Metadata(MetadataArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input render configuration JSON.
    #[arg(long = "config")]
    config_path: PathBuf,

    /// Dump every enumerated sweep point as JSON lines.
    #[arg(long)]
    frames: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input render configuration JSON.
    #[arg(long = "config")]
    config_path: PathBuf,
}

#[derive(Parser, Debug)]
struct MetadataArgs {
    /// Input render configuration JSON.
    #[arg(long = "config")]
    config_path: PathBuf,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Metadata(args) => cmd_metadata(args),
    }
}

fn read_config(path: &PathBuf) -> anyhow::Result<orbitsweep::RenderConfig> {
    let cfg = orbitsweep::RenderConfig::from_path(path)
        .with_context(|| format!("load render config '{}'", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate render config '{}'", path.display()))?;
    Ok(cfg)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config_path)?;
    let sweep = &cfg.sweep;

    println!("dataset:    {}", cfg.dataset_dir().display());
    println!("masks:      {}", cfg.mask_dir().display());
    println!("images:     {}", cfg.image_dir().display());
    println!(
        "axes:       {} azimuths x {} elevations x {} zooms x {} liquid levels",
        sweep.azimuth_count(),
        sweep.elevation_count(),
        sweep.zoom_count(),
        sweep.liquid.count()
    );
    println!("frames:     {}", cfg.estimated_frame_count());
    println!("files:      {}", cfg.estimated_file_count());

    if args.frames {
        for (i, point) in orbitsweep::sweep_points(&cfg).iter().enumerate() {
            let line = serde_json::to_string(point).context("serialize sweep point")?;
            println!("{:08} {line}", i + 1);
        }
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    read_config(&args.config_path)?;
    eprintln!("ok: {}", args.config_path.display());
    Ok(())
}

fn cmd_metadata(args: MetadataArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config_path)?;
    let meta = orbitsweep::DatasetMetadata::from_config(&cfg);
    match args.out {
        Some(path) => {
            meta.write(&path)
                .with_context(|| format!("write metadata '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&meta).context("serialize metadata")?;
            println!("{json}");
        }
    }
    Ok(())
}
