use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use gifsplit::{
    BackgroundMatter, BatchCoordinator, BatchOptions, BatchReport, ColorKeyMatter,
    DEFAULT_FRAME_COUNT_CAP, ExportConfig, FileOutcome, FileResult, GifProbe, ProgressMailbox,
    UnavailableMatter, discover_gifs,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  gifsplit process gifs/\n  gifsplit process dance.gif wave.gif --remove-background --animated --progress\n  gifsplit process gifs/ --remove-background --key ffffff --tolerance 24 --no-stills\n  gifsplit probe dance.gif --json\n  gifsplit completions zsh > _gifsplit";

#[derive(Debug, Parser)]
#[command(
    name = "gifsplit",
    version,
    about = "Split animated GIFs into PNG frames and background-free GIFs",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert GIFs into frames and/or background-free GIFs.
    #[command(
        about = "Process a batch of GIFs",
        after_help = "Without --remove-background only PNG frames are written, to <dir>/converted.\nWith it, output goes to <dir>/nobg_converted, where <dir> is the first input's directory."
    )]
    Process {
        /// GIF files or directories containing GIF files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Remove the background of every frame.
        #[arg(long)]
        remove_background: bool,
        /// Do not write PNG frames (requires --remove-background).
        #[arg(long)]
        no_stills: bool,
        /// Write the processed frames as nobg_<name>.gif (requires --remove-background).
        #[arg(long)]
        animated: bool,
        /// Per-channel tolerance of the colour key.
        #[arg(long, default_value_t = 16)]
        tolerance: u8,
        /// Fixed key colour as RRGGBB. Sampled from frame corners when omitted.
        #[arg(long)]
        key: Option<String>,
        /// Run without a matting engine.
        #[arg(long)]
        no_matting: bool,
        /// Frames counted per file before the count is estimated.
        #[arg(long, default_value_t = DEFAULT_FRAME_COUNT_CAP)]
        frame_cap: usize,
        /// Write the output folder here instead of next to the first input.
        #[arg(long)]
        output_root: Option<PathBuf>,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// Print the batch report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print frame count, delay, and size of GIFs.
    #[command(about = "Inspect GIF metadata", visible_alias = "info")]
    Probe {
        /// GIF files or directories containing GIF files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(global: &GlobalOptions) {
    let default_level = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn parse_key(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = discover_gifs(input)?;
            if found.is_empty() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("no GIF files in {}", input.display()).yellow()
                );
            }
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn requested_config(remove_background: bool, no_stills: bool, animated: bool) -> ExportConfig {
    let requested = ExportConfig {
        remove_background,
        export_stills: !no_stills,
        export_animated: animated,
    };
    let normalized = requested.normalized();
    if normalized != requested {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "--no-stills and --animated only apply with --remove-background; writing PNG frames"
                .yellow()
        );
    }
    normalized
}

fn print_failure(progress_bar: Option<&ProgressBar>, result: &FileResult) {
    if let FileOutcome::Failed { reason, .. } = &result.outcome {
        let line = format!(
            "{} {}",
            "failed:".red().bold(),
            format!("{}: {reason}", result.display_name).red()
        );
        match progress_bar {
            Some(pb) => pb.println(line),
            None => eprintln!("{line}"),
        }
    }
}

fn report_json(report: &BatchReport) -> serde_json::Value {
    json!({
        "status": report.status_line(),
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "cancelled": report.cancelled,
        "files": report.results.iter().map(|result| {
            let (outcome, detail) = match &result.outcome {
                FileOutcome::Succeeded { frames, artifacts } => ("succeeded", json!({
                    "frames": frames,
                    "artifacts": artifacts.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
                })),
                FileOutcome::Failed { kind, reason } => ("failed", json!({
                    "kind": format!("{kind:?}"),
                    "reason": reason,
                })),
                FileOutcome::Cancelled => ("cancelled", json!({})),
            };
            json!({
                "path": result.path.display().to_string(),
                "name": result.display_name,
                "outcome": outcome,
                "detail": detail,
            })
        }).collect::<Vec<_>>(),
    })
}

fn process(
    inputs: &[PathBuf],
    config: ExportConfig,
    matter: Arc<dyn BackgroundMatter>,
    frame_cap: usize,
    output_root: Option<&Path>,
    show_progress: bool,
    json_output: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let paths = expand_inputs(inputs)?;
    if paths.is_empty() {
        return Err("no input GIFs".into());
    }

    let mailbox = ProgressMailbox::new();
    let mut options = BatchOptions::new()
        .with_progress(Arc::new(mailbox.clone()))
        .with_frame_count_cap(frame_cap);
    if let Some(root) = output_root {
        options = options.with_output_root(root);
    }

    let coordinator = BatchCoordinator::new(matter).with_options(options);
    let handle = coordinator.spawn(paths, config)?;

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {percent:>3}% {msg}",
        )?;
        pb.set_style(style.progress_chars("##-"));
        Some(pb)
    } else {
        None
    };

    while !handle.is_finished() {
        if let (Some(pb), Some(info)) = (&progress_bar, mailbox.latest()) {
            pb.set_position(info.overall_percent.round() as u64);
            pb.set_message(info.status);
        }
        for failure in mailbox.take_failures() {
            print_failure(progress_bar.as_ref(), &failure);
        }
        thread::sleep(Duration::from_millis(50));
    }

    let report = handle.join()?;
    for failure in mailbox.take_failures() {
        print_failure(progress_bar.as_ref(), &failure);
    }
    if let Some(pb) = progress_bar {
        pb.set_position(100);
        pb.finish_with_message(report.status_line());
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else if report.is_success() {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "{} ({} file(s))",
                report.status_line(),
                report.succeeded()
            )
            .green()
        );
    } else {
        println!(
            "{} {}",
            "done:".yellow().bold(),
            format!(
                "{} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            )
            .yellow()
        );
    }

    Ok(report.is_success())
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match cli.command {
        Commands::Process {
            inputs,
            remove_background,
            no_stills,
            animated,
            tolerance,
            key,
            no_matting,
            frame_cap,
            output_root,
            progress,
            json,
        } => {
            let config = requested_config(remove_background, no_stills, animated);
            let matter: Arc<dyn BackgroundMatter> = if no_matting {
                Arc::new(UnavailableMatter)
            } else {
                let mut matter = ColorKeyMatter::new().with_tolerance(tolerance);
                if let Some(key) = key {
                    let rgb = parse_key(&key).ok_or(format!("invalid --key colour: {key}"))?;
                    matter = matter.with_key(rgb);
                }
                Arc::new(matter)
            };
            process(
                &inputs,
                config,
                matter,
                frame_cap,
                output_root.as_deref(),
                progress,
                json,
            )
        }
        Commands::Probe { inputs, json } => {
            let paths = expand_inputs(&inputs)?;
            let results = GifProbe::probe_many(&paths);
            let mut all_ok = true;
            if json {
                let payload: Vec<_> = paths
                    .iter()
                    .zip(&results)
                    .map(|(path, result)| match result {
                        Ok(metadata) => json!({
                            "path": path.display().to_string(),
                            "frame_count": metadata.frame_count,
                            "frame_count_exact": metadata.frame_count_exact,
                            "frame_delay_ms": metadata.frame_delay_ms,
                            "width": metadata.width,
                            "height": metadata.height,
                        }),
                        Err(error) => json!({
                            "path": path.display().to_string(),
                            "error": error.to_string(),
                        }),
                    })
                    .collect();
                all_ok = results.iter().all(Result::is_ok);
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (path, result) in paths.iter().zip(&results) {
                    match result {
                        Ok(metadata) => println!(
                            "{}: {}{} frame(s), {} ms, {}x{}",
                            path.display(),
                            metadata.frame_count,
                            if metadata.frame_count_exact { "" } else { "+" },
                            metadata.frame_delay_ms,
                            metadata.width,
                            metadata.height,
                        ),
                        Err(error) => {
                            all_ok = false;
                            eprintln!("{} {error}", "error:".red().bold());
                        }
                    }
                }
            }
            Ok(all_ok)
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "gifsplit", &mut std::io::stdout());
            Ok(true)
        }
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
