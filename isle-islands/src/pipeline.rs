//! Per-chromosome orchestration of SICER and SICER-DF runs.
//!
//! Every stage runs once per chromosome on a bounded rayon pool and collects its
//! results into a [`PerChrom`] store before the next stage starts. The only
//! cross-chromosome steps are the library totals computed between stages and the
//! genome-wide Benjamini-Hochberg corrections, which run on the calling thread over
//! the complete stores in genome order.

use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;

use isle_core::GenomeData;
use isle_core::ReadSet;
use isle_core::models::{AnnotatedIsland, DifferentialIsland, Island, Read, UnionIsland};
use isle_core::redundancy::{RedundancyReport, remove_redundant_reads};
use isle_core::utils::remove_all_extensions;
use isle_core::windows::{ChromWindows, generate_windows};

use crate::associate::IslandIndex;
use crate::background::{BackgroundModel, FixedBackground, PoissonBackground};
use crate::config::SicerConfig;
use crate::differential::{
    Direction, LibraryCorrelation, LibraryScaling, compare_libraries,
    correct_differential_genome_wide, filter_by_direction, library_correlation,
};
use crate::errors::IslandError;
use crate::merge::combine_proximal_windows;
use crate::scoring::filter_and_score_windows;
use crate::significance::{ControlScaling, annotate_islands, correct_genome_wide, filter_by_fdr};
use crate::store::PerChrom;
use crate::threshold::filter_islands_by_score;
use crate::union::find_union_islands;

///
/// Runs per-chromosome stages on a worker pool of `min(cpu, chromosomes)` threads.
///
pub struct Orchestrator {
    pool: rayon::ThreadPool,
    chroms: Vec<(String, u32)>,
    show_progress: bool,
}

impl Orchestrator {
    pub fn new(genome: &GenomeData, cpu: usize, show_progress: bool) -> Result<Self, IslandError> {
        let threads = cpu.min(genome.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        debug!("Worker pool of {} threads", threads);

        Ok(Orchestrator {
            pool,
            chroms: genome
                .iter()
                .map(|(chrom, length)| (chrom.to_string(), length))
                .collect(),
            show_progress,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn progress(&self, stage: &'static str) -> ProgressBar {
        let bar = if self.show_progress {
            ProgressBar::new(self.chroms.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(stage);
        bar
    }

    ///
    /// Run `f` on every chromosome of the genome. `f` receives the chromosome name
    /// and length. Results are in genome order.
    ///
    pub fn map_chroms<U, F>(&self, stage: &'static str, f: F) -> PerChrom<U>
    where
        U: Send,
        F: Fn(&str, u32) -> U + Sync,
    {
        let bar = self.progress(stage);
        let results: Vec<(String, U)> = self.pool.install(|| {
            self.chroms
                .par_iter()
                .map(|(chrom, length)| {
                    let result = f(chrom, *length);
                    bar.inc(1);
                    (chrom.clone(), result)
                })
                .collect()
        });
        bar.finish_and_clear();
        debug!("Stage {} finished on {} chromosomes", stage, results.len());
        PerChrom::from_ordered(results)
    }

    ///
    /// Fallible [`Orchestrator::map_chroms`]. The first error aborts the stage.
    ///
    pub fn try_map_chroms<U, F>(&self, stage: &'static str, f: F) -> Result<PerChrom<U>, IslandError>
    where
        U: Send,
        F: Fn(&str, u32) -> Result<U, IslandError> + Sync,
    {
        let bar = self.progress(stage);
        let results: Result<Vec<(String, U)>, IslandError> = self.pool.install(|| {
            self.chroms
                .par_iter()
                .map(|(chrom, length)| -> Result<(String, U), IslandError> {
                    let result = f(chrom, *length)?;
                    bar.inc(1);
                    Ok((chrom.clone(), result))
                })
                .collect()
        });
        bar.finish_and_clear();
        Ok(PerChrom::from_ordered(results?))
    }

    ///
    /// Mutate every chromosome's value in place, in parallel.
    ///
    pub fn for_each_mut<T, U, F>(&self, stage: &'static str, store: &mut PerChrom<T>, f: F) -> PerChrom<U>
    where
        T: Send,
        U: Send,
        F: Fn(&str, &mut T) -> U + Sync,
    {
        let bar = self.progress(stage);
        let entries: Vec<(&str, &mut T)> = store.iter_mut().collect();
        let results: Vec<(String, U)> = self.pool.install(|| {
            entries
                .into_par_iter()
                .map(|(chrom, value)| {
                    let result = f(chrom, value);
                    bar.inc(1);
                    (chrom.to_string(), result)
                })
                .collect()
        });
        bar.finish_and_clear();
        PerChrom::from_ordered(results)
    }
}

///
/// Reads of a library split per chromosome in genome order.
///
pub fn split_by_chrom(mut reads: ReadSet, genome: &GenomeData) -> PerChrom<Vec<Read>> {
    PerChrom::from_ordered(
        genome
            .chroms()
            .iter()
            .map(|chrom| (chrom.clone(), reads.reads.remove(chrom).unwrap_or_default()))
            .collect(),
    )
}

fn chrom_slice<'a>(store: &'a PerChrom<Vec<Read>>, chrom: &str) -> &'a [Read] {
    store.get(chrom).map(Vec::as_slice).unwrap_or(&[])
}

fn library_name(reads: &ReadSet, fallback: &str) -> String {
    reads
        .path
        .as_deref()
        .map(remove_all_extensions)
        .unwrap_or_else(|| fallback.to_string())
}

///
/// Background model for a run: the Poisson null model, with any value the
/// configuration fixes taking its place.
///
pub fn background_model(
    config: &SicerConfig,
    total_tags: u64,
    effective_genome_length: f64,
) -> Box<dyn BackgroundModel> {
    if let (Some(min_window_count), Some(score_threshold)) =
        (config.min_window_count, config.score_threshold)
    {
        return Box::new(FixedBackground {
            min_window_count,
            score_threshold,
        });
    }

    let poisson = PoissonBackground::new(
        total_tags,
        config.window_size,
        config.gap_size,
        config.window_pvalue,
        effective_genome_length,
        config.bin_size,
    );
    match (config.min_window_count, config.score_threshold) {
        (None, None) => Box::new(poisson),
        (min_window_count, score_threshold) => Box::new(FixedBackground {
            min_window_count: min_window_count.unwrap_or_else(|| poisson.min_window_count()),
            score_threshold: score_threshold
                .unwrap_or_else(|| poisson.score_threshold(config.e_value)),
        }),
    }
}

fn deduplicate(
    orchestrator: &Orchestrator,
    reads: &mut PerChrom<Vec<Read>>,
    cutoff: u32,
    name: &str,
) -> RedundancyReport {
    let report = orchestrator
        .for_each_mut("redundancy", reads, |_, chrom_reads| {
            remove_redundant_reads(chrom_reads, cutoff)
        })
        .values()
        .fold(RedundancyReport::default(), |total, report| total + *report);
    info!(
        "{}: {} reads, {} retained after removing redundant reads (cutoff {})",
        name, report.total, report.retained, cutoff
    );
    report
}

///
/// Everything a SICER run produces, per chromosome in genome order.
///
#[derive(Debug, Clone)]
pub struct SicerOutput {
    pub name: String,
    pub control_name: Option<String>,
    pub treatment_report: RedundancyReport,
    pub control_report: Option<RedundancyReport>,
    /// Deduplicated treatment reads.
    pub treatment_reads: PerChrom<Vec<Read>>,
    pub windows: PerChrom<ChromWindows>,
    pub total_tags_in_windows: u64,
    pub window_average: f64,
    pub min_window_count: u32,
    pub score_threshold: f64,
    /// Islands passing the score threshold.
    pub candidate_islands: PerChrom<Vec<Island>>,
    /// Candidate islands tested against the control, with genome-wide correction.
    pub annotated_islands: Option<PerChrom<Vec<AnnotatedIsland>>>,
    /// Annotated islands passing the FDR cutoff.
    pub significant_islands: Option<PerChrom<Vec<AnnotatedIsland>>>,
    /// Treatment reads in the final islands, with their windows.
    pub island_reads: Option<PerChrom<Vec<Read>>>,
    pub island_read_windows: Option<PerChrom<ChromWindows>>,
}

impl SicerOutput {
    pub fn library_size(&self) -> u64 {
        self.treatment_report.retained as u64
    }

    ///
    /// Final island coordinates: the significant islands when a control was given,
    /// the candidate islands otherwise.
    ///
    pub fn final_islands(&self) -> PerChrom<Vec<Island>> {
        match &self.significant_islands {
            Some(significant) => significant.map(|_, islands| {
                islands.iter().map(|annotated| annotated.island.clone()).collect()
            }),
            None => self.candidate_islands.clone(),
        }
    }

    /// Treatment reads in significant islands.
    pub fn significant_read_count(&self) -> Option<u64> {
        self.significant_islands.as_ref().map(|significant| {
            significant
                .flatten()
                .map(|island| island.treatment_count as u64)
                .sum()
        })
    }
}

///
/// Call islands on `treatment`, optionally testing them against `control`.
///
pub fn run_sicer(
    treatment: ReadSet,
    control: Option<ReadSet>,
    genome: &GenomeData,
    config: &SicerConfig,
) -> Result<SicerOutput, IslandError> {
    config.validate()?;
    let orchestrator = Orchestrator::new(genome, config.cpu, config.show_progress)?;

    let name = library_name(&treatment, "treatment");
    let mut treatment_reads = split_by_chrom(treatment, genome);
    let treatment_report = deduplicate(
        &orchestrator,
        &mut treatment_reads,
        config.redundancy_threshold,
        &name,
    );
    if treatment_report.retained == 0 {
        return Err(IslandError::EmptyLibrary(name));
    }

    let control = match control {
        Some(control) => {
            let control_name = library_name(&control, "control");
            let mut control_reads = split_by_chrom(control, genome);
            let report = deduplicate(
                &orchestrator,
                &mut control_reads,
                config.redundancy_threshold,
                &control_name,
            );
            if report.retained == 0 {
                return Err(IslandError::EmptyLibrary(control_name));
            }
            Some((control_name, control_reads, report))
        }
        None => None,
    };

    let windows = orchestrator.map_chroms("windowing", |chrom, length| {
        generate_windows(
            chrom_slice(&treatment_reads, chrom),
            chrom,
            length,
            config.fragment_size,
            config.window_size,
        )
    });
    let total_tags_in_windows: u64 = windows.values().map(|chrom| chrom.total_tags).sum();

    let genome_length = genome.genome_length();
    let effective_genome_length = genome.effective_length(config.effective_genome_fraction).floor();
    let window_average = if effective_genome_length > 0.0 {
        total_tags_in_windows as f64 * config.window_size as f64 / effective_genome_length
    } else {
        0.0
    };
    info!(
        "Genome length {}, effective genome length {}, window average {:.6}",
        genome_length, effective_genome_length, window_average
    );

    let background = background_model(config, total_tags_in_windows, effective_genome_length);
    let min_window_count = background.min_window_count();
    let score_threshold = background.score_threshold(config.e_value);
    info!(
        "Minimum tags in an eligible window: {}; island score threshold: {}",
        min_window_count, score_threshold
    );

    let candidate_islands = orchestrator.map_chroms("islands", |chrom, _| {
        let chrom_windows = windows.get(chrom).map(|w| w.windows.as_slice()).unwrap_or(&[]);
        let scored = filter_and_score_windows(chrom_windows, min_window_count, window_average);
        let islands = combine_proximal_windows(&scored, config.gap_size);
        filter_islands_by_score(islands, score_threshold)
    });
    info!("Total number of islands: {}", candidate_islands.total_len());

    let mut control_name = None;
    let mut control_report = None;
    let mut annotated_islands = None;
    let mut significant_islands = None;

    if let Some((name_of_control, control_reads, report)) = control {
        let scaling = ControlScaling {
            treatment_library_size: treatment_report.retained as u64,
            control_library_size: report.retained as u64,
            effective_genome_size: genome.effective_length(config.effective_genome_fraction),
        };

        let mut annotated = orchestrator.map_chroms("significance", |chrom, length| {
            annotate_islands(
                candidate_islands.get(chrom).map(Vec::as_slice).unwrap_or(&[]),
                chrom_slice(&treatment_reads, chrom),
                chrom_slice(&control_reads, chrom),
                config.fragment_size,
                length,
                &scaling,
            )
        });
        correct_genome_wide(annotated.values_mut());

        let significant =
            annotated.map(|_, islands| filter_by_fdr(islands, config.false_discovery_rate));
        info!(
            "Given significance {}, there are {} significant islands",
            config.false_discovery_rate,
            significant.total_len()
        );

        control_name = Some(name_of_control);
        control_report = Some(report);
        annotated_islands = Some(annotated);
        significant_islands = Some(significant);
    }

    let mut output = SicerOutput {
        name,
        control_name,
        treatment_report,
        control_report,
        treatment_reads,
        windows,
        total_tags_in_windows,
        window_average,
        min_window_count,
        score_threshold,
        candidate_islands,
        annotated_islands,
        significant_islands,
        island_reads: None,
        island_read_windows: None,
    };
    if let Some(count) = output.significant_read_count() {
        info!(
            "Out of the {} reads in {}, {} reads are in significant islands",
            output.library_size(),
            output.name,
            count
        );
    }

    if config.significant_reads {
        let islands = output.final_islands();
        let treatment_reads = &output.treatment_reads;
        let island_reads = orchestrator.map_chroms("island reads", |chrom, length| {
            let chrom_islands = islands.get(chrom).map(Vec::as_slice).unwrap_or(&[]);
            IslandIndex::new(chrom_islands).filter_reads(
                chrom_slice(treatment_reads, chrom),
                config.fragment_size,
                length,
            )
        });
        let island_read_windows = orchestrator.map_chroms("island read windowing", |chrom, length| {
            generate_windows(
                chrom_slice(&island_reads, chrom),
                chrom,
                length,
                config.fragment_size,
                config.window_size,
            )
        });
        info!("{} reads fall in the final islands", island_reads.total_len());
        output.island_reads = Some(island_reads);
        output.island_read_windows = Some(island_read_windows);
    }

    Ok(output)
}

///
/// Everything a SICER-DF run produces.
///
#[derive(Debug, Clone)]
pub struct SicerDfOutput {
    pub library_a: SicerOutput,
    pub library_b: SicerOutput,
    pub union_islands: PerChrom<Vec<UnionIsland>>,
    /// Union islands compared between the libraries, both directions corrected.
    pub differential_islands: PerChrom<Vec<DifferentialIsland>>,
    pub correlation: LibraryCorrelation,
    pub increased: PerChrom<Vec<DifferentialIsland>>,
    pub decreased: PerChrom<Vec<DifferentialIsland>>,
}

///
/// Compare two treatment libraries, each optionally with its own control.
///
/// Both libraries go through [`run_sicer`]; their final islands are merged into
/// union islands on which the libraries are compared in both directions.
///
pub fn run_sicer_df(
    treatments: [ReadSet; 2],
    controls: Option<[ReadSet; 2]>,
    genome: &GenomeData,
    config: &SicerConfig,
) -> Result<SicerDfOutput, IslandError> {
    config.validate()?;

    let [treatment_a, treatment_b] = treatments;
    let (control_a, control_b) = match controls {
        Some([control_a, control_b]) => (Some(control_a), Some(control_b)),
        None => (None, None),
    };

    let library_a = run_sicer(treatment_a, control_a, genome, config)?;
    let library_b = run_sicer(treatment_b, control_b, genome, config)?;

    let orchestrator = Orchestrator::new(genome, config.cpu, config.show_progress)?;

    let islands_a = library_a.final_islands();
    let islands_b = library_b.final_islands();
    let union_islands = orchestrator.try_map_chroms("union", |chrom, _| {
        find_union_islands(
            chrom,
            islands_a.get(chrom).map(Vec::as_slice).unwrap_or(&[]),
            islands_b.get(chrom).map(Vec::as_slice).unwrap_or(&[]),
        )
    })?;
    info!(
        "{} union islands of {} and {}",
        union_islands.total_len(),
        library_a.name,
        library_b.name
    );

    let scaling = LibraryScaling {
        library_size_a: library_a.library_size(),
        library_size_b: library_b.library_size(),
    };
    let mut differential_islands = orchestrator.map_chroms("comparison", |chrom, length| {
        compare_libraries(
            union_islands.get(chrom).map(Vec::as_slice).unwrap_or(&[]),
            chrom_slice(&library_a.treatment_reads, chrom),
            chrom_slice(&library_b.treatment_reads, chrom),
            config.fragment_size,
            length,
            &scaling,
        )
    });
    correct_differential_genome_wide(differential_islands.values_mut());

    let (reads_a, reads_b) = differential_islands
        .flatten()
        .fold((0u64, 0u64), |(a, b), island| {
            (a + island.count_a as u64, b + island.count_b as u64)
        });
    info!(
        "Reads on union islands: {} of {}, {} of {}",
        reads_a, library_a.name, reads_b, library_b.name
    );

    let correlation = library_correlation(differential_islands.flatten());
    if let Some(pearson) = correlation.pearson {
        info!(
            "Pearson's correlation is {} with p-value {}",
            pearson.coefficient, pearson.p_value
        );
    }
    if let Some(spearman) = correlation.spearman {
        info!(
            "Spearman's correlation is {} with p-value {}",
            spearman.coefficient, spearman.p_value
        );
    }

    let directional = |direction: Direction| {
        let filtered = differential_islands.map(|_, islands| {
            filter_by_direction(islands, direction, config.false_discovery_rate_df)
        });
        info!(
            "{} {} islands at FDR {}",
            filtered.total_len(),
            direction.label(),
            config.false_discovery_rate_df
        );
        filtered
    };
    let increased = directional(Direction::Increased);
    let decreased = directional(Direction::Decreased);

    Ok(SicerDfOutput {
        library_a,
        library_b,
        union_islands,
        differential_islands,
        correlation,
        increased,
        decreased,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_core::models::Strand;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn genome() -> GenomeData {
        GenomeData::new(vec![
            ("chr2".to_string(), 20_000),
            ("chr1".to_string(), 20_000),
        ])
        .unwrap()
    }

    fn read(chrom: &str, start: u32, strand: Strand) -> Read {
        Read {
            chrom: chrom.to_string(),
            start,
            end: start + 25,
            name: "r".to_string(),
            score: 0,
            strand,
        }
    }

    /// Background reads every 1000bp plus a dense block on chr1.
    fn library(genome: &GenomeData, block_start: u32, block_reads: u32) -> ReadSet {
        let mut reads = Vec::new();
        for chrom in ["chr1", "chr2"] {
            for start in (100..19_000).step_by(1000) {
                reads.push(read(chrom, start, Strand::Forward));
            }
        }
        for i in 0..block_reads {
            reads.push(read("chr1", block_start + (i * 7) % 600, Strand::Forward));
            reads.push(read("chr1", block_start + (i * 11) % 600 + 1, Strand::Reverse));
        }
        ReadSet::from_reads(reads, genome)
    }

    fn config() -> SicerConfig {
        SicerConfig {
            window_size: 200,
            gap_size: 200,
            fragment_size: 0,
            effective_genome_fraction: 1.0,
            cpu: 2,
            min_window_count: Some(3),
            score_threshold: Some(10.0),
            false_discovery_rate: 0.05,
            false_discovery_rate_df: 0.05,
            ..SicerConfig::default()
        }
    }

    #[rstest]
    fn test_orchestrator_keeps_genome_order(genome: GenomeData) {
        let orchestrator = Orchestrator::new(&genome, 8, false).unwrap();
        assert_eq!(orchestrator.threads(), 2);

        let lengths = orchestrator.map_chroms("lengths", |chrom, length| format!("{}:{}", chrom, length));
        assert_eq!(
            lengths.values().cloned().collect::<Vec<String>>(),
            vec!["chr2:20000".to_string(), "chr1:20000".to_string()]
        );
    }

    #[rstest]
    fn test_try_map_chroms_propagates_errors(genome: GenomeData) {
        let orchestrator = Orchestrator::new(&genome, 1, false).unwrap();
        let result: Result<PerChrom<u32>, IslandError> =
            orchestrator.try_map_chroms("failing", |chrom, _| {
                if chrom == "chr1" {
                    Err(IslandError::InvalidConfig("boom".to_string()))
                } else {
                    Ok(1)
                }
            });
        assert!(result.is_err());
    }

    #[rstest]
    fn test_background_model_overrides() {
        let config = SicerConfig {
            min_window_count: Some(4),
            score_threshold: Some(7.5),
            ..SicerConfig::default()
        };
        let model = background_model(&config, 1000, 1e6);
        assert_eq!(model.min_window_count(), 4);
        assert_eq!(model.score_threshold(1.0), 7.5);

        let partial = SicerConfig {
            score_threshold: Some(7.5),
            bin_size: 0.01,
            ..SicerConfig::default()
        };
        let poisson = PoissonBackground::new(1000, 200, 600, 0.2, 1e6, 0.01);
        let model = background_model(&partial, 1000, 1e6);
        assert_eq!(model.min_window_count(), poisson.min_window_count());
        assert_eq!(model.score_threshold(1.0), 7.5);
    }

    #[rstest]
    fn test_run_sicer_without_control(genome: GenomeData) {
        let output = run_sicer(library(&genome, 5000, 30), None, &genome, &config()).unwrap();

        assert_eq!(output.treatment_report.total, 38 + 60);
        assert!(output.annotated_islands.is_none());
        assert_eq!(output.candidate_islands.chroms(), &["chr2".to_string(), "chr1".to_string()]);
        assert!(output.candidate_islands.get("chr2").unwrap().is_empty());

        let chr1 = output.candidate_islands.get("chr1").unwrap();
        assert_eq!(chr1.len(), 1);
        assert!(chr1[0].start >= 4800 && chr1[0].end <= 5799);
    }

    #[rstest]
    fn test_run_sicer_with_control(genome: GenomeData) {
        let treatment = library(&genome, 5000, 30);
        let control = library(&genome, 12_000, 0);
        let config = SicerConfig {
            significant_reads: true,
            ..config()
        };

        let output = run_sicer(treatment, Some(control), &genome, &config).unwrap();

        let annotated = output.annotated_islands.as_ref().unwrap();
        let island = &annotated.get("chr1").unwrap()[0];
        assert!(island.treatment_count >= 60);
        assert!(island.p_value < 1e-10);
        assert!(island.corrected_significance <= config.false_discovery_rate);

        let significant = output.significant_islands.as_ref().unwrap();
        assert_eq!(significant.total_len(), 1);
        assert_eq!(output.significant_read_count(), Some(island.treatment_count as u64));

        let island_reads = output.island_reads.as_ref().unwrap();
        assert_eq!(island_reads.total_len() as u32, island.treatment_count);
    }

    #[rstest]
    fn test_empty_treatment_is_an_error(genome: GenomeData) {
        let result = run_sicer(ReadSet::default(), None, &genome, &config());
        assert!(matches!(result, Err(IslandError::EmptyLibrary(_))));
    }

    #[rstest]
    fn test_run_sicer_df(genome: GenomeData) {
        let a = library(&genome, 5000, 30);
        let b = library(&genome, 15_000, 30);

        let output = run_sicer_df([a, b], None, &genome, &config()).unwrap();

        let union = output.union_islands.get("chr1").unwrap();
        assert_eq!(union.len(), 2);
        assert!(union[0].end < union[1].start);

        let increased = output.increased.get("chr1").unwrap();
        let decreased = output.decreased.get("chr1").unwrap();
        assert_eq!(increased.len(), 1);
        assert_eq!(decreased.len(), 1);
        assert!(increased[0].island.start < 6000);
        assert!(decreased[0].island.start >= 14_800);
        assert_eq!(output.differential_islands.total_len(), 2);
    }
}
