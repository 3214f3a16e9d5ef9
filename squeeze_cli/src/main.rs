use clap::{Parser, Subcommand, ValueEnum};
use squeeze_core::trim::{TrimAction, TrimResult};
use squeeze_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "squeeze")]
#[command(about = "Compress training sessions to fit a time budget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress every session of a plan
    Compress {
        /// Plan JSON file
        plan: PathBuf,

        /// Session time budget in minutes (defaults to the plan's targetMinutes)
        #[arg(long)]
        target_minutes: Option<u32>,

        /// Config file (defaults to the user config path)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Compression strategy
        #[arg(long, value_enum, default_value_t = Strategy::Segments)]
        strategy: Strategy,

        /// Override the core-lift set cap
        #[arg(long)]
        core_lift_max_sets: Option<u32>,

        /// Override the circuit size limit
        #[arg(long)]
        max_block_exercises: Option<u32>,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Also write one CSV row per segment
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also save the full result as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    Defaults,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Core lifts, supersets, circuits and singles
    Segments,
    /// Trim sets then drop exercises
    Trim,
}

struct CompressArgs {
    plan: PathBuf,
    target_minutes: Option<u32>,
    config: Option<PathBuf>,
    strategy: Strategy,
    overrides: CompressionOverrides,
    json: bool,
    csv: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    squeeze_core::logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            plan,
            target_minutes,
            config,
            strategy,
            core_lift_max_sets,
            max_block_exercises,
            json,
            csv,
            out,
        } => cmd_compress(CompressArgs {
            plan,
            target_minutes,
            config,
            strategy,
            overrides: CompressionOverrides {
                core_lift_max_sets,
                max_block_exercises,
                ..Default::default()
            },
            json,
            csv,
            out,
        }),
        Commands::Defaults => cmd_defaults(),
    }
}

fn cmd_compress(args: CompressArgs) -> Result<()> {
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&args.plan)?)?;

    let Some(input) = translate(&raw) else {
        println!("Nothing to compress: no usable sessions in {}", args.plan.display());
        return Ok(());
    };

    let target_minutes = args.target_minutes.or(input.target_minutes).ok_or_else(|| {
        Error::Config("no target: pass --target-minutes or set targetMinutes in the plan".into())
    })?;
    tracing::debug!(
        "Compressing {} session(s) to {} min with {:?}",
        input.sessions.len(),
        target_minutes,
        args.strategy
    );

    match args.strategy {
        Strategy::Segments => {
            let config = resolve_config(args.config.as_deref())?.merged(&args.overrides);
            let outcome = compress_plan(&input, target_minutes, &config)?;

            if let Some(ref path) = args.csv {
                let rows = squeeze_core::export::save_segments_csv(&outcome, path)?;
                eprintln!("Wrote {} segment rows to {}", rows, path.display());
            }
            if let Some(ref path) = args.out {
                save_outcome_json(&outcome, path)?;
                eprintln!("Saved result to {}", path.display());
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                display_outcome(&outcome);
            }
        }
        Strategy::Trim => {
            if args.csv.is_some() || args.out.is_some() {
                return Err(Error::Config(
                    "--csv and --out are only available with --strategy segments".into(),
                ));
            }
            let results: Vec<TrimResult> = input
                .sessions
                .iter()
                .map(|s| reduce_session(&SessionRecord::from_context(s), target_minutes))
                .collect();

            if args.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                display_trim(&results);
            }
        }
    }

    Ok(())
}

fn cmd_defaults() -> Result<()> {
    print!("{}", CompressionConfig::default().to_toml_string()?);
    Ok(())
}

fn resolve_config(path: Option<&Path>) -> Result<CompressionConfig> {
    match path {
        Some(path) => CompressionConfig::load_from(path),
        None => CompressionConfig::load(),
    }
}

fn display_outcome(outcome: &CompressionOutcome) {
    for session in &outcome.sessions {
        let summary = &session.summary;
        println!("\n╭─────────────────────────────────────────╮");
        println!("│  SESSION {}", summary.session_id);
        println!("╰─────────────────────────────────────────╯");

        for segment in &session.segments {
            let timing = segment.timing();
            println!(
                "  {:>2}. {:<18} {:>4}s  {}",
                segment.order(),
                segment.kind().as_str(),
                timing.total_seconds,
                describe_segment(segment)
            );
        }

        println!();
        println!(
            "  {}s -> {}s (target {}s, {} sets kept of {})",
            summary.original_duration_seconds,
            summary.compressed_duration_seconds,
            summary.target_seconds,
            summary.retained_set_count,
            summary.original_set_count
        );
        if summary.meets_target {
            println!("  ✓ Fits the time budget");
        } else {
            println!(
                "  ✗ Over budget by {}s",
                summary.target_delta_seconds.unsigned_abs()
            );
        }
    }

    println!();
    let plan = &outcome.summary;
    println!(
        "{} of {} session(s) fit {} min ({}s saved overall)",
        plan.sessions_meeting_target,
        plan.session_count,
        plan.target_minutes,
        plan.duration_delta_seconds
    );
    if !outcome.meets_time_constraint {
        println!("Time constraint not met");
    }
}

fn describe_segment(segment: &Segment) -> String {
    let exercises: Vec<String> = segment
        .exercises()
        .iter()
        .map(|e| format!("{} ×{}", e.name, e.sets.len()))
        .collect();
    match segment {
        Segment::AccessorySuperset(s) => format!("{} ({} rounds)", exercises.join(" + "), s.rounds),
        Segment::AccessoryBlock(b) => format!("{} ({} rounds)", exercises.join(" → "), b.rounds),
        _ => exercises.join(""),
    }
}

fn display_trim(results: &[TrimResult]) {
    for result in results {
        println!("\nSession {}", result.session_id);
        for exercise in &result.exercises {
            println!("  → {} ×{}", exercise.name, exercise.sets);
        }
        for action in &result.actions {
            match action {
                TrimAction::TrimmedSet {
                    exercise_id,
                    from,
                    to,
                } => println!("  - trimmed {} {} -> {} sets", exercise_id, from, to),
                TrimAction::Dropped { exercise_id } => println!("  - dropped {}", exercise_id),
            }
        }
        let mark = if result.meets_target { "✓" } else { "✗" };
        println!(
            "  {} ~{}s -> ~{}s (target {}s)",
            mark, result.original_seconds, result.estimated_seconds, result.target_seconds
        );
    }
}
