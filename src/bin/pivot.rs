//! pivot - A/B testing statistics CLI
//!
//! Command-line front end for planning and analysing online experiments.

use clap::{Parser, Subcommand, ValueEnum};
use pivot_point::advisory::{check_saturation, Advisory};
use pivot_point::config::AnalysisConfig;
use pivot_point::data::{
    read_revenue_file, Alternative, ContingencyTable, ContinuousSample, MultiVariantResult,
    ProportionSample, TestResult,
};
use pivot_point::error::{PivotError, Result};
use pivot_point::power::{
    observed_power, project_runtime, ContinuousProjectionRow, ProjectionTable,
};
use pivot_point::test::{
    diff_confidence_interval, interaction_test_with, means_test_with, multi_variant_test_with,
    srm_test, ConfidenceInterval, ExperimentSample, VarianceModel,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CLI-friendly alternative hypothesis
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAlternative {
    /// Variant differs from control in either direction
    TwoSided,
    /// One-sided, in the direction of the observed effect (an increase when planning)
    OneSided,
    /// Variant is larger than control
    Larger,
    /// Variant is smaller than control
    Smaller,
}

impl CliAlternative {
    /// Fixed alternative, or `None` for a one-sided test in the observed direction.
    fn fixed(self) -> Option<Alternative> {
        match self {
            CliAlternative::TwoSided => Some(Alternative::TwoSided),
            CliAlternative::OneSided => None,
            CliAlternative::Larger => Some(Alternative::Larger),
            CliAlternative::Smaller => Some(Alternative::Smaller),
        }
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Statistics for online A/B testing
#[derive(Parser)]
#[command(name = "pivot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// Analysis configuration YAML; command flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project the minimum detectable effect over the experiment runtime
    Mde {
        /// Average visitors per week, all groups together
        #[arg(long)]
        visitors: u64,

        /// Average conversions per week, all groups together
        #[arg(long)]
        conversions: u64,

        /// Number of groups, control included
        #[arg(short, long, default_value = "2")]
        groups: usize,

        /// Significance level
        #[arg(long)]
        alpha: Option<f64>,

        /// Statistical power
        #[arg(long)]
        power: Option<f64>,

        /// Alternative hypothesis
        #[arg(long, value_enum)]
        alternative: Option<CliAlternative>,

        /// Number of weeks to project
        #[arg(long)]
        weeks: Option<usize>,

        /// Standard deviation of a continuous metric; adds its MDE per week
        #[arg(long)]
        std_dev: Option<f64>,

        /// Write the projection to a TSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check observed group sizes for a sample ratio mismatch
    Srm {
        /// Visitors per group (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        counts: Vec<u64>,

        /// Intended traffic share per group (comma-separated, sums to 1); even split if omitted
        #[arg(long, value_delimiter = ',')]
        frequencies: Option<Vec<f64>>,
    },

    /// Check two concurrent experiments for traffic interaction
    Interaction {
        /// One row of the contingency table, e.g. --row 500,500 (repeat per row)
        #[arg(long = "row", required = true)]
        rows: Vec<String>,
    },

    /// Test conversion rates of one or more variants against control
    Significance {
        /// Control visitors
        #[arg(long)]
        control_visitors: u64,

        /// Control conversions
        #[arg(long)]
        control_conversions: u64,

        /// Visitors per variant (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        variant_visitors: Vec<u64>,

        /// Conversions per variant (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        variant_conversions: Vec<u64>,

        /// Intended traffic share per group, control first; even split if omitted
        #[arg(long, value_delimiter = ',')]
        split: Option<Vec<f64>>,

        /// Significance level
        #[arg(long)]
        alpha: Option<f64>,

        /// Alternative hypothesis
        #[arg(long, value_enum)]
        alternative: Option<CliAlternative>,

        /// Write comparisons to a TSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test revenue per visitor from order-revenue CSV files
    Revenue {
        /// CSV with one order revenue per row for control
        #[arg(long)]
        control_file: PathBuf,

        /// Control visitors
        #[arg(long)]
        control_visitors: u64,

        /// CSV per variant (repeat per variant)
        #[arg(long = "variant-file", required = true)]
        variant_files: Vec<PathBuf>,

        /// Visitors per variant (comma-separated, same order as the files)
        #[arg(long, value_delimiter = ',', required = true)]
        variant_visitors: Vec<u64>,

        /// Significance level
        #[arg(long)]
        alpha: Option<f64>,

        /// Alternative hypothesis
        #[arg(long, value_enum)]
        alternative: Option<CliAlternative>,

        /// Use Student's pooled-variance t-test instead of Welch's
        #[arg(long)]
        pooled: bool,

        /// Write comparisons to a TSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate an example analysis configuration
    ExampleConfig {
        /// Output path for the configuration YAML
        #[arg(short, long, default_value = "pivot.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Mde {
            visitors,
            conversions,
            groups,
            alpha,
            power,
            alternative,
            weeks,
            std_dev,
            output,
        } => cmd_mde(
            config,
            cli.format,
            MdeArgs {
                visitors,
                conversions,
                groups,
                alpha,
                power,
                alternative,
                weeks,
                std_dev,
            },
            output.as_deref(),
        ),

        Commands::Srm {
            counts,
            frequencies,
        } => cmd_srm(&config, cli.format, &counts, frequencies.as_deref()),

        Commands::Interaction { rows } => cmd_interaction(&config, cli.format, &rows),

        Commands::Significance {
            control_visitors,
            control_conversions,
            variant_visitors,
            variant_conversions,
            split,
            alpha,
            alternative,
            output,
        } => cmd_significance(
            config,
            cli.format,
            (control_visitors, control_conversions),
            &variant_visitors,
            &variant_conversions,
            split.as_deref(),
            alpha,
            alternative,
            output.as_deref(),
        ),

        Commands::Revenue {
            control_file,
            control_visitors,
            variant_files,
            variant_visitors,
            alpha,
            alternative,
            pooled,
            output,
        } => cmd_revenue(
            config,
            cli.format,
            (control_file.as_path(), control_visitors),
            &variant_files,
            &variant_visitors,
            alpha,
            alternative,
            pooled,
            output.as_deref(),
        ),

        Commands::ExampleConfig { output } => cmd_example_config(&output),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading analysis configuration");
            AnalysisConfig::from_file(path)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn emit<T: Serialize + fmt::Display>(format: OutputFormat, report: &T) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
    }
    Ok(())
}

fn log_advisories(advisories: &[Advisory]) {
    for advisory in advisories {
        warn!("{}", advisory);
    }
}

fn write_advisories(f: &mut fmt::Formatter<'_>, advisories: &[Advisory]) -> fmt::Result {
    for advisory in advisories {
        writeln!(f, "Warning: {}", advisory)?;
    }
    Ok(())
}

/// Alternative for one comparison: the fixed one, or one-sided toward the observed effect.
fn alternative_for<S: ExperimentSample>(
    fixed: Option<Alternative>,
    control: &S,
    variant: &S,
) -> Alternative {
    fixed.unwrap_or_else(|| {
        Alternative::toward_observed(variant.point_estimate() - control.point_estimate())
    })
}

fn resolve_alternative(
    config: &AnalysisConfig,
    flag: Option<CliAlternative>,
) -> Option<Alternative> {
    match flag {
        Some(flag) => flag.fixed(),
        None => Some(config.alternative),
    }
}

// === mde ===

struct MdeArgs {
    visitors: u64,
    conversions: u64,
    groups: usize,
    alpha: Option<f64>,
    power: Option<f64>,
    alternative: Option<CliAlternative>,
    weeks: Option<usize>,
    std_dev: Option<f64>,
}

#[derive(Serialize)]
struct MdeReport {
    projection: ProjectionTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    continuous: Vec<ContinuousProjectionRow>,
    advisories: Vec<Advisory>,
}

impl fmt::Display for MdeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.projection)?;
        if let Some(std_dev) = self.std_dev {
            writeln!(f)?;
            writeln!(f, "Continuous metric (std dev {}):", std_dev)?;
            writeln!(f, "  {:>5}  {:>12}", "Weeks", "MDE")?;
            for row in &self.continuous {
                writeln!(f, "  {:>5}  {:>12.4}", row.week, row.mde)?;
            }
        }
        write_advisories(f, &self.advisories)
    }
}

fn cmd_mde(
    mut config: AnalysisConfig,
    format: OutputFormat,
    args: MdeArgs,
    output: Option<&Path>,
) -> Result<()> {
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(power) = args.power {
        config.power = power;
    }
    if let Some(weeks) = args.weeks {
        config.weeks = weeks;
    }
    // A one-sided MDE is the same in either direction
    config.alternative =
        resolve_alternative(&config, args.alternative).unwrap_or(Alternative::Larger);
    config.validate()?;

    info!(
        visitors = args.visitors,
        conversions = args.conversions,
        groups = args.groups,
        "projecting MDE"
    );

    let params = config.power_parameters();
    let mut advisories = config.thresholds.check_parameters(params.alpha, params.power);
    let projection = project_runtime(
        args.visitors,
        args.conversions,
        args.groups,
        &params,
        config.weeks,
    )?;
    advisories.extend(config.thresholds.check_projection(&projection));

    let continuous = match args.std_dev {
        Some(std_dev) => projection.continuous_mde(std_dev)?,
        None => Vec::new(),
    };

    if let Some(path) = output {
        info!(path = %path.display(), "writing projection");
        projection.to_tsv(path)?;
    }

    log_advisories(&advisories);
    emit(
        format,
        &MdeReport {
            projection,
            std_dev: args.std_dev,
            continuous,
            advisories,
        },
    )
}

// === srm ===

#[derive(Serialize)]
struct SrmReport {
    counts: Vec<u64>,
    expected_frequencies: Option<Vec<f64>>,
    result: TestResult,
    threshold: f64,
    srm_detected: bool,
    advisories: Vec<Advisory>,
}

impl fmt::Display for SrmReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample ratio mismatch check")?;
        writeln!(f, "  Observed: {:?}", self.counts)?;
        if let Some(freqs) = &self.expected_frequencies {
            writeln!(f, "  Expected shares: {:?}", freqs)?;
        }
        writeln!(f, "  {}", self.result)?;
        if !self.srm_detected {
            writeln!(
                f,
                "The p-value is not smaller than {}. No SRM detected.",
                self.threshold
            )?;
        }
        write_advisories(f, &self.advisories)
    }
}

fn cmd_srm(
    config: &AnalysisConfig,
    format: OutputFormat,
    counts: &[u64],
    frequencies: Option<&[f64]>,
) -> Result<()> {
    info!(groups = counts.len(), "checking sample ratio");
    let result = srm_test(counts, frequencies)?;
    let advisories: Vec<Advisory> = config.thresholds.check_srm(&result).into_iter().collect();
    log_advisories(&advisories);

    emit(
        format,
        &SrmReport {
            counts: counts.to_vec(),
            expected_frequencies: frequencies.map(<[f64]>::to_vec),
            result,
            threshold: config.thresholds.srm,
            srm_detected: !advisories.is_empty(),
            advisories,
        },
    )
}

// === interaction ===

#[derive(Serialize)]
struct InteractionReport {
    table: Vec<Vec<u64>>,
    result: TestResult,
    threshold: f64,
    interaction_detected: bool,
    advisories: Vec<Advisory>,
}

impl fmt::Display for InteractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Traffic interaction check")?;
        for row in &self.table {
            writeln!(f, "  {:?}", row)?;
        }
        writeln!(f, "  {}", self.result)?;
        if !self.interaction_detected {
            writeln!(
                f,
                "The p-value is not smaller than {}. No traffic interaction detected.",
                self.threshold
            )?;
        }
        write_advisories(f, &self.advisories)
    }
}

fn parse_row(row: &str) -> Result<Vec<u64>> {
    row.split(',')
        .map(|value| {
            value.trim().parse::<u64>().map_err(|_| {
                PivotError::InvalidArgument(format!(
                    "'{}' is not a visitor count",
                    value.trim()
                ))
            })
        })
        .collect()
}

fn cmd_interaction(config: &AnalysisConfig, format: OutputFormat, rows: &[String]) -> Result<()> {
    let rows = rows
        .iter()
        .map(|row| parse_row(row))
        .collect::<Result<Vec<_>>>()?;
    let table = ContingencyTable::new(rows)?;
    info!(
        rows = table.n_rows(),
        cols = table.n_cols(),
        "checking traffic interaction"
    );

    let result = interaction_test_with(&table, config.yates)?;
    let advisories: Vec<Advisory> = config
        .thresholds
        .check_interaction(&result)
        .into_iter()
        .collect();
    log_advisories(&advisories);

    emit(
        format,
        &InteractionReport {
            table: table.rows().to_vec(),
            result,
            threshold: config.thresholds.interaction,
            interaction_detected: !advisories.is_empty(),
            advisories,
        },
    )
}

// === significance ===

#[derive(Serialize)]
struct SignificanceReport {
    sample_ratio: TestResult,
    comparisons: MultiVariantResult,
    intervals: Vec<ConfidenceInterval>,
    observed_power: Vec<f64>,
    advisories: Vec<Advisory>,
}

impl fmt::Display for SignificanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample ratio check: {}", self.sample_ratio)?;
        write!(f, "{}", self.comparisons)?;
        for ((c, ci), power) in self
            .comparisons
            .comparisons
            .iter()
            .zip(&self.intervals)
            .zip(&self.observed_power)
        {
            writeln!(
                f,
                "  {}: {:.0}% CI for the difference [{:.2}, {:.2}] PP, observed power {:.2}",
                c.label,
                ci.level * 100.0,
                ci.lower * 100.0,
                ci.upper * 100.0,
                power
            )?;
        }
        write_advisories(f, &self.advisories)
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_significance(
    mut config: AnalysisConfig,
    format: OutputFormat,
    (control_visitors, control_conversions): (u64, u64),
    variant_visitors: &[u64],
    variant_conversions: &[u64],
    split: Option<&[f64]>,
    alpha: Option<f64>,
    alternative: Option<CliAlternative>,
    output: Option<&Path>,
) -> Result<()> {
    if variant_visitors.len() != variant_conversions.len() {
        return Err(PivotError::InvalidArgument(format!(
            "Got visitors for {} variants but conversions for {}",
            variant_visitors.len(),
            variant_conversions.len()
        )));
    }
    if let Some(alpha) = alpha {
        config.alpha = alpha;
    }
    config.validate()?;
    let fixed = resolve_alternative(&config, alternative);

    let control = ProportionSample::new(control_visitors, control_conversions)?;
    let variants = variant_visitors
        .iter()
        .zip(variant_conversions)
        .map(|(&v, &c)| ProportionSample::new(v, c))
        .collect::<Result<Vec<_>>>()?;
    info!(variants = variants.len(), "testing conversion rates");

    let mut advisories: Vec<Advisory> = std::iter::once(&control)
        .chain(&variants)
        .filter_map(check_saturation)
        .collect();

    let counts: Vec<u64> = std::iter::once(control.visitors())
        .chain(variants.iter().map(|v| v.visitors()))
        .collect();
    let sample_ratio = srm_test(&counts, split)?;
    advisories.extend(config.thresholds.check_srm(&sample_ratio));

    let comparisons = multi_variant_test_with(&control, &variants, config.alpha, |c, v| {
        c.test_against(v, alternative_for(fixed, c, v))
    })?;

    let intervals = variants
        .iter()
        .map(|v| diff_confidence_interval(&control, v, comparisons.corrected_alpha))
        .collect::<Result<Vec<_>>>()?;

    let observed = variants
        .iter()
        .map(|v| {
            let alt = alternative_for(fixed, &control, v);
            observed_power(&control, v, comparisons.corrected_alpha, alt)
        })
        .collect::<Result<Vec<_>>>()?;
    for (c, power) in comparisons.comparisons.iter().zip(&observed) {
        debug!(variant = %c.label, observed_power = *power, "post-hoc power");
        if !c.significant {
            advisories.extend(config.thresholds.check_power(*power));
        }
    }

    if let Some(path) = output {
        info!(path = %path.display(), "writing comparisons");
        comparisons.to_tsv(path)?;
    }

    log_advisories(&advisories);
    emit(
        format,
        &SignificanceReport {
            sample_ratio,
            comparisons,
            intervals,
            observed_power: observed,
            advisories,
        },
    )
}

// === revenue ===

#[derive(Serialize)]
struct RevenueGroup {
    label: String,
    visitors: u64,
    orders: usize,
    total_revenue: f64,
    revenue_per_visitor: f64,
}

impl RevenueGroup {
    fn new(label: &str, sample: &ContinuousSample) -> Self {
        Self {
            label: label.to_string(),
            visitors: sample.visitor_count(),
            orders: sample.n_orders(),
            total_revenue: sample.total_revenue(),
            revenue_per_visitor: sample.revenue_per_visitor(),
        }
    }
}

#[derive(Serialize)]
struct RevenueReport {
    variance_model: VarianceModel,
    groups: Vec<RevenueGroup>,
    sample_ratio: TestResult,
    comparisons: MultiVariantResult,
    advisories: Vec<Advisory>,
}

impl fmt::Display for RevenueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:>7}  {:>9}  {:>7}  {:>14}  {:>10}",
            "Group", "Visitors", "Orders", "Revenue", "RPV"
        )?;
        for g in &self.groups {
            writeln!(
                f,
                "  {:>7}  {:>9}  {:>7}  {:>14.2}  {:>10.4}",
                g.label, g.visitors, g.orders, g.total_revenue, g.revenue_per_visitor
            )?;
        }
        writeln!(f, "Sample ratio check: {}", self.sample_ratio)?;
        write!(f, "{}", self.comparisons)?;
        write_advisories(f, &self.advisories)
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_revenue(
    mut config: AnalysisConfig,
    format: OutputFormat,
    (control_file, control_visitors): (&Path, u64),
    variant_files: &[PathBuf],
    variant_visitors: &[u64],
    alpha: Option<f64>,
    alternative: Option<CliAlternative>,
    pooled: bool,
    output: Option<&Path>,
) -> Result<()> {
    if variant_files.len() != variant_visitors.len() {
        return Err(PivotError::InvalidArgument(format!(
            "Got {} variant files but visitor counts for {}",
            variant_files.len(),
            variant_visitors.len()
        )));
    }
    if let Some(alpha) = alpha {
        config.alpha = alpha;
    }
    if pooled {
        config.variance_model = VarianceModel::Pooled;
    }
    config.validate()?;
    let fixed = resolve_alternative(&config, alternative);

    info!(path = %control_file.display(), "loading control revenue");
    let control = ContinuousSample::new(control_visitors, read_revenue_file(control_file)?)?;
    let variants = variant_files
        .iter()
        .zip(variant_visitors)
        .map(|(path, &visitors)| {
            info!(path = %path.display(), "loading variant revenue");
            ContinuousSample::new(visitors, read_revenue_file(path)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let counts: Vec<u64> = std::iter::once(control.visitor_count())
        .chain(variants.iter().map(|v| v.visitor_count()))
        .collect();
    let sample_ratio = srm_test(&counts, None)?;
    let advisories: Vec<Advisory> = config
        .thresholds
        .check_srm(&sample_ratio)
        .into_iter()
        .collect();

    let model = config.variance_model;
    let comparisons = multi_variant_test_with(&control, &variants, config.alpha, |c, v| {
        means_test_with(c, v, alternative_for(fixed, c, v), model)
    })?;

    if let Some(path) = output {
        info!(path = %path.display(), "writing comparisons");
        comparisons.to_tsv(path)?;
    }

    let groups = std::iter::once(RevenueGroup::new("A", &control))
        .chain(
            comparisons
                .comparisons
                .iter()
                .zip(&variants)
                .map(|(c, v)| RevenueGroup::new(&c.label, v)),
        )
        .collect();

    log_advisories(&advisories);
    emit(
        format,
        &RevenueReport {
            variance_model: model,
            groups,
            sample_ratio,
            comparisons,
            advisories,
        },
    )
}

// === example-config ===

fn cmd_example_config(output_path: &Path) -> Result<()> {
    let config = AnalysisConfig::default();
    let yaml = format!(
        "# pivot analysis configuration\n# Command-line flags override these values.\n{}",
        config.to_yaml()?
    );

    std::fs::write(output_path, &yaml)?;
    info!(path = %output_path.display(), "wrote example configuration");
    println!("{}", yaml);

    Ok(())
}
