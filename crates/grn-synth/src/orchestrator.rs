//! The round loop of one worker: check every assigned batch, analyse the
//! accepted parametrizations and emit the result stream.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use log::info;

use grn_check::SynthesisManager;
use grn_core::{ErrorInfo, ParamNo, Paramset, BatchSplitter, SynthError};
use grn_graph::{Product, Uts};
use grn_model::{CompiledModel, PropertyKind};

use crate::filter;

/// Options of a synthesis run, the core-relevant slice of the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    /// Number of workers sharing the parametrization space.
    pub processes: u64,
    /// 1-based index of this worker.
    pub worker: u64,
    /// Emit a witness for every accepted parametrization.
    pub witnesses: bool,
    /// Render witnesses as level tuples instead of state ids.
    pub long_witnesses: bool,
    /// Emit a robustness value for every accepted parametrization.
    pub robustness: bool,
    /// Bound on the BFS depth.
    pub bound: Option<usize>,
    /// Starting-mask filter database.
    pub filter: Option<PathBuf>,
    /// Database to write the accepted masks into.
    pub filter_out: Option<PathBuf>,
    /// File to write the JSON run report into.
    pub report: Option<PathBuf>,
}

impl SynthOptions {
    /// One worker covering everything, no analysis extras.
    pub fn single() -> Self {
        Self {
            processes: 1,
            worker: 1,
            ..Self::default()
        }
    }
}

/// Totals of one worker's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthSummary {
    /// Parametrizations accepted by this worker.
    pub accepted: u64,
    /// Parametrizations examined by this worker.
    pub examined: u64,
    /// Batches this worker processed.
    pub batches: u64,
}

/// Runs the synthesis for one worker and writes the result stream to `out`.
///
/// Output lines are `paramno:(values):robustness:witness` with disabled
/// fields left empty, ordered by ascending parametrization number.
pub fn synthesise(
    model: &CompiledModel,
    options: &SynthOptions,
    out: &mut dyn Write,
) -> Result<SynthSummary, SynthError> {
    let started = Instant::now();
    let uts = Uts::build(&model.network, &model.kinetics, model.property.experiment())?;
    let product = Product::build(uts, model.property.clone())?;
    let splitter =
        BatchSplitter::new(model.kinetics.param_count(), options.processes, options.worker)?;

    let masks = match &options.filter {
        Some(path) => Some(filter::load_masks(path, splitter.total_batches())?),
        None => None,
    };
    let mut mask_writer = match &options.filter_out {
        Some(path) => Some(filter::MaskWriter::create(path)?),
        None => None,
    };

    let mut manager = SynthesisManager::new(&product);
    let mut summary = SynthSummary {
        accepted: 0,
        examined: 0,
        batches: 0,
    };
    for batch in splitter.batches() {
        let starting = match &masks {
            Some(masks) => batch.clamp(masks[batch.index as usize]),
            None => batch.starting_mask(),
        };
        summary.examined += starting.count() as u64;
        summary.batches += 1;

        let report = manager.check_batch(starting, (batch.first, batch.last), options.bound);
        for bit in report.accepted.iter_ones() {
            let param_no: ParamNo = batch.param_of_bit(bit);
            let (robustness, witness) = if options.witnesses || options.robustness {
                let hint = if product.kind() == PropertyKind::Automaton {
                    report
                        .finals
                        .iter()
                        .find(|(_, mask)| mask.contains(Paramset::single(bit)))
                        .map(|&(f, _)| f)
                } else {
                    None
                };
                let analysis = manager
                    .analyse((batch.first, batch.last), bit, hint, options.bound)
                    .ok_or_else(|| {
                        SynthError::NoContextMatch(
                            ErrorInfo::new(
                                "analysis-disagrees",
                                "accepted parametrization failed its own analysis",
                            )
                            .with_context("param", param_no.to_string()),
                        )
                    })?;
                (
                    options.robustness.then_some(analysis.robustness),
                    options
                        .witnesses
                        .then(|| manager.render_witness(&analysis.transitions, options.long_witnesses)),
                )
            } else {
                (None, None)
            };
            writeln!(
                out,
                "{param_no}:{}:{}:{}",
                model.kinetics.color_string(param_no),
                robustness.map(|r| r.to_string()).unwrap_or_default(),
                witness.unwrap_or_default()
            )
            .map_err(|err| SynthError::io("result stream", &err))?;
        }
        summary.accepted += report.accepted.count() as u64;

        if let Some(writer) = &mut mask_writer {
            writer.store(batch.index, report.accepted)?;
        }
    }

    info!(
        "worker {}/{} accepted {} of {} parametrizations over {} batches in {:.3}s",
        options.worker,
        options.processes,
        summary.accepted,
        summary.examined,
        summary.batches,
        started.elapsed().as_secs_f64()
    );
    if let Some(path) = &options.report {
        let report = crate::report::run_json(model, options, &summary, started.elapsed());
        std::fs::write(path, serde_json::to_string_pretty(&report).unwrap_or_default())
            .map_err(|err| SynthError::io(path.display().to_string(), &err))?;
    }
    Ok(summary)
}
