use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use grn_core::{paramset, SynthError};
use grn_graph::{Product, Uts};
use grn_model::{CompiledModel, ModelDoc};
use grn_synth::{report, synthesise, SynthOptions};

#[derive(Parser, Debug)]
#[command(name = "grn-synth", about = "Parameter synthesis for Thomas-network models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate the parametrizations under which the model satisfies its
    /// property.
    Synth(SynthArgs),
    /// Parse and construct only; print a JSON summary of the model and its
    /// state space.
    Stats(StatsArgs),
}

#[derive(ClapArgs, Debug)]
struct SynthArgs {
    /// Model document, JSON or YAML.
    #[arg(long)]
    model: PathBuf,
    /// Number of workers sharing the run.
    #[arg(long, default_value_t = 1)]
    processes: u64,
    /// 1-based index of this worker.
    #[arg(long, default_value_t = 1)]
    worker: u64,
    /// Emit a witness for every accepted parametrization.
    #[arg(long)]
    witnesses: bool,
    /// Render witnesses as level tuples instead of state ids.
    #[arg(long)]
    long_witnesses: bool,
    /// Emit a robustness value for every accepted parametrization.
    #[arg(long)]
    robustness: bool,
    /// Bound on the BFS depth.
    #[arg(long)]
    bound: Option<usize>,
    /// SQLite database with per-batch starting masks.
    #[arg(long)]
    filter: Option<PathBuf>,
    /// SQLite database to write the accepted masks into.
    #[arg(long)]
    filter_out: Option<PathBuf>,
    /// Write a JSON run report here.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the result stream here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct StatsArgs {
    /// Model document, JSON or YAML.
    #[arg(long)]
    model: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SynthError> {
    paramset::self_test()?;
    match cli.command {
        Command::Synth(args) => {
            let model = load_model(&args.model)?;
            let options = SynthOptions {
                processes: args.processes,
                worker: args.worker,
                witnesses: args.witnesses,
                long_witnesses: args.long_witnesses,
                robustness: args.robustness,
                bound: args.bound,
                filter: args.filter,
                filter_out: args.filter_out,
                report: args.report,
            };
            match &args.output {
                Some(path) => {
                    let file = File::create(path)
                        .map_err(|err| SynthError::io(path.display().to_string(), &err))?;
                    let mut out = BufWriter::new(file);
                    synthesise(&model, &options, &mut out)?;
                    out.flush()
                        .map_err(|err| SynthError::io(path.display().to_string(), &err))?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    synthesise(&model, &options, &mut out)?;
                }
            }
            Ok(())
        }
        Command::Stats(args) => {
            let model = load_model(&args.model)?;
            let uts =
                Uts::build(&model.network, &model.kinetics, model.property.experiment())?;
            let product = Product::build(uts, model.property.clone())?;
            let summary = report::stats_json(&model, &product);
            println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
            Ok(())
        }
    }
}

fn load_model(path: &PathBuf) -> Result<CompiledModel, SynthError> {
    ModelDoc::load(path)?.compile()
}
