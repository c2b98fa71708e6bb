//! Phreatic CLI - water-table surfaces from monitoring wells

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use phreatic_algorithms::evaluation::{leave_one_out, CrossValidation};
use phreatic_algorithms::interpolation::{
    empirical_variogram, fit_polynomial, idw, ordinary_kriging, regression_kriging,
    CoordinateFrame, EmpiricalVariogramBin, IdwInterpolator, IdwParams, KrigingInterpolator,
    OrdinaryKrigingParams, PolynomialDegree, PolynomialInterpolator,
    RegressionKrigingInterpolator, RegressionKrigingParams, VariogramModel, VariogramParams,
};
use phreatic_core::{Grid, Interpolator, SampleSet, Surface, SurfaceStatistics, WellRecord};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "phreatic")]
#[command(author, version, about = "Water-table interpolation from scattered wells", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write compact instead of pretty-printed JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inverse distance weighting
    Idw {
        #[command(flatten)]
        input: SampleArgs,
        #[command(flatten)]
        grid: GridArgs,
        /// Distance power (1 = inverse distance, 2 = inverse square)
        #[arg(short, long, default_value = "1.0")]
        power: f64,
        /// Samples closer than this to a grid node are copied verbatim
        #[arg(long, default_value = "1e-5")]
        snap_distance: f64,
    },
    /// Least-squares polynomial trend surface
    Polynomial {
        #[command(flatten)]
        input: SampleArgs,
        #[command(flatten)]
        grid: GridArgs,
        /// Polynomial degree: 1 (planar) or 2 (quadratic)
        #[arg(short, long, default_value = "1")]
        degree: u8,
    },
    /// Ordinary kriging with a fixed variogram model
    Kriging {
        #[command(flatten)]
        input: SampleArgs,
        #[command(flatten)]
        grid: GridArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Polynomial trend plus ordinary kriging of the residuals
    RegressionKriging {
        #[command(flatten)]
        input: SampleArgs,
        #[command(flatten)]
        grid: GridArgs,
        /// Trend degree: 1 (planar) or 2 (quadratic)
        #[arg(short, long, default_value = "1")]
        degree: u8,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Empirical variogram of the samples
    Variogram {
        #[command(flatten)]
        input: SampleArgs,
        /// Number of distance bins
        #[arg(short, long, default_value = "10")]
        bins: usize,
        /// Largest lag to include (default: all pairs)
        #[arg(long)]
        max_lag: Option<f64>,
        /// Also report the residual sum of squares of this model
        #[arg(long)]
        check_model: bool,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Leave-one-out comparison of all methods
    CrossValidate {
        #[command(flatten)]
        input: SampleArgs,
        /// IDW distance power
        #[arg(short, long, default_value = "1.0")]
        power: f64,
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args)]
struct SampleArgs {
    /// Sample as `x,y,z` (repeatable)
    #[arg(short, long = "sample", value_name = "X,Y,Z", allow_hyphen_values = true)]
    samples: Vec<String>,
    /// Well as `id,x,y,top_of_casing,depth_to_water` (repeatable)
    #[arg(short, long = "well", value_name = "ID,X,Y,TOC,DTW", allow_hyphen_values = true)]
    wells: Vec<String>,
}

#[derive(Args)]
struct GridArgs {
    /// Grid x minimum (default: sample extent)
    #[arg(long, allow_negative_numbers = true)]
    x_min: Option<f64>,
    /// Grid x maximum (default: sample extent)
    #[arg(long, allow_negative_numbers = true)]
    x_max: Option<f64>,
    /// Grid y minimum (default: sample extent)
    #[arg(long, allow_negative_numbers = true)]
    y_min: Option<f64>,
    /// Grid y maximum (default: sample extent)
    #[arg(long, allow_negative_numbers = true)]
    y_max: Option<f64>,
    /// Node spacing on both axes
    #[arg(long, default_value = "1.0")]
    step: f64,
}

#[derive(Args)]
struct ModelArgs {
    /// Variogram model: power, spherical, exponential, gaussian
    #[arg(short, long, default_value = "power")]
    model: String,
    /// Nugget (semivariance at zero lag)
    #[arg(long, default_value = "0.0")]
    nugget: f64,
    /// Power model scale
    #[arg(long, default_value = "1.0")]
    scale: f64,
    /// Power model exponent, in (0, 2)
    #[arg(long, default_value = "1.0")]
    exponent: f64,
    /// Partial sill of bounded models
    #[arg(long)]
    sill: Option<f64>,
    /// Range of bounded models
    #[arg(long)]
    range: Option<f64>,
    /// Override C(0) of the kriging system
    #[arg(long)]
    covariance_ceiling: Option<f64>,
}

// ─── JSON output ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SurfaceReport<'a> {
    method: &'a str,
    samples: usize,
    xs: &'a [f64],
    ys: &'a [f64],
    statistics: SurfaceStatistics,
    estimate: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variance: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trend: Option<TrendReport>,
}

#[derive(Serialize)]
struct TrendReport {
    degree: u8,
    /// Coefficients apply to ((x − origin_x) / scale_x, (y − origin_y) / scale_y)
    frame: CoordinateFrame,
    coefficients: Vec<f64>,
    residuals: Vec<f64>,
    rss: f64,
    r_squared: Option<f64>,
}

#[derive(Serialize)]
struct VariogramReport {
    pairs: usize,
    bins: Vec<EmpiricalVariogramBin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<VariogramModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_rss: Option<f64>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MethodReport {
    Ok(CrossValidation),
    Failed { method: &'static str, error: String },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn parse_fields(s: &str, expected: usize, what: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = s.split(',').map(|p| p.trim().to_string()).collect();
    if parts.len() != expected {
        anyhow::bail!("{} must have {} comma-separated fields, got: {}", what, expected, s);
    }
    Ok(parts)
}

fn parse_number(field: &str, name: &str, source: &str) -> Result<f64> {
    field
        .parse()
        .with_context(|| format!("Invalid {} in '{}'", name, source))
}

fn parse_sample(s: &str) -> Result<(f64, f64, f64)> {
    let f = parse_fields(s, 3, "Sample")?;
    Ok((
        parse_number(&f[0], "x", s)?,
        parse_number(&f[1], "y", s)?,
        parse_number(&f[2], "z", s)?,
    ))
}

fn parse_well(s: &str) -> Result<WellRecord> {
    let f = parse_fields(s, 5, "Well")?;
    Ok(WellRecord {
        id: f[0].clone(),
        x: parse_number(&f[1], "x", s)?,
        y: parse_number(&f[2], "y", s)?,
        top_of_casing: parse_number(&f[3], "top of casing", s)?,
        depth_to_water: parse_number(&f[4], "depth to water", s)?,
    })
}

fn load_samples(args: &SampleArgs) -> Result<SampleSet> {
    let mut triples: Vec<(f64, f64, f64)> = args
        .samples
        .iter()
        .map(|s| parse_sample(s))
        .collect::<Result<_>>()?;

    for well in args.wells.iter().map(|w| parse_well(w)) {
        let well = well?;
        info!(
            "Well {}: water table at {:.3}",
            well.id,
            well.water_table_elevation()
        );
        triples.push((well.x, well.y, well.water_table_elevation()));
    }

    if triples.is_empty() {
        anyhow::bail!("No samples given. Use --sample x,y,z or --well id,x,y,toc,dtw.");
    }

    let samples = SampleSet::from_xyz(&triples).context("Invalid samples")?;
    info!("Input: {} samples", samples.len());
    Ok(samples)
}

fn build_grid(args: &GridArgs, samples: &SampleSet) -> Result<Grid> {
    let (x0, y0, x1, y1) = samples.bounds();
    let grid = Grid::with_step(
        (args.x_min.unwrap_or(x0), args.x_max.unwrap_or(x1)),
        (args.y_min.unwrap_or(y0), args.y_max.unwrap_or(y1)),
        args.step,
    )
    .context("Invalid grid")?;
    info!("Grid: {} x {}", grid.cols(), grid.rows());
    Ok(grid)
}

fn parse_degree(degree: u8) -> Result<PolynomialDegree> {
    PolynomialDegree::try_from(degree).context("Invalid polynomial degree")
}

fn parse_model(args: &ModelArgs) -> Result<VariogramModel> {
    let bounded = |name: &str| -> Result<(f64, f64)> {
        match (args.sill, args.range) {
            (Some(sill), Some(range)) => Ok((sill, range)),
            _ => anyhow::bail!("The {} model needs --sill and --range", name),
        }
    };

    let model = match args.model.to_lowercase().as_str() {
        "power" | "pow" => VariogramModel::power(args.nugget, args.scale, args.exponent),
        "spherical" | "sph" => {
            let (sill, range) = bounded("spherical")?;
            VariogramModel::spherical(args.nugget, sill, range)
        }
        "exponential" | "exp" => {
            let (sill, range) = bounded("exponential")?;
            VariogramModel::exponential(args.nugget, sill, range)
        }
        "gaussian" | "gau" => {
            let (sill, range) = bounded("gaussian")?;
            VariogramModel::gaussian(args.nugget, sill, range)
        }
        _ => anyhow::bail!(
            "Unknown model: {}. Use power, spherical, exponential, or gaussian.",
            args.model
        ),
    };
    model.context("Invalid variogram model")
}

fn kriging_params(args: &ModelArgs) -> Result<OrdinaryKrigingParams> {
    let mut params = OrdinaryKrigingParams::new(parse_model(args)?);
    params.covariance_ceiling = args.covariance_ceiling;
    Ok(params)
}

fn trend_report(trend: &phreatic_algorithms::interpolation::PolynomialSurface) -> TrendReport {
    TrendReport {
        degree: trend.degree().order(),
        frame: *trend.frame(),
        coefficients: trend.coefficients().to_vec(),
        residuals: trend.residuals().to_vec(),
        rss: trend.rss(),
        r_squared: trend.r_squared(),
    }
}

fn surface_report<'a>(
    method: &'a str,
    samples: &SampleSet,
    grid: &'a Grid,
    estimate: &Surface,
    variance: Option<&Surface>,
    trend: Option<TrendReport>,
) -> SurfaceReport<'a> {
    SurfaceReport {
        method,
        samples: samples.len(),
        xs: grid.xs(),
        ys: grid.ys(),
        statistics: estimate.statistics(),
        estimate: estimate.to_rows(),
        variance: variance.map(Surface::to_rows),
        trend,
    }
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let stdout = std::io::stdout().lock();
    if compact {
        serde_json::to_writer(stdout, value)
    } else {
        serde_json::to_writer_pretty(stdout, value)
    }
    .context("Failed to write JSON output")?;
    println!();
    Ok(())
}

fn done(name: &str, elapsed: std::time::Duration) {
    info!("{} finished in {:.2?}", name, elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Idw {
            input,
            grid,
            power,
            snap_distance,
        } => {
            let samples = load_samples(&input)?;
            let grid = build_grid(&grid, &samples)?;
            let pb = spinner("Computing IDW...")?;
            let start = Instant::now();
            let surface = idw(&samples, &grid, IdwParams { power, snap_distance })
                .context("Failed to compute IDW")?;
            pb.finish_and_clear();
            done("IDW", start.elapsed());
            emit(
                &surface_report("idw", &samples, &grid, &surface, None, None),
                cli.compact,
            )?;
        }

        Commands::Polynomial {
            input,
            grid,
            degree,
        } => {
            let degree = parse_degree(degree)?;
            let samples = load_samples(&input)?;
            let grid = build_grid(&grid, &samples)?;
            let pb = spinner("Fitting polynomial surface...")?;
            let start = Instant::now();
            let fitted = fit_polynomial(&samples, degree).context("Failed to fit polynomial")?;
            let surface = fitted.predict(&grid).context("Failed to evaluate polynomial")?;
            pb.finish_and_clear();
            done("Polynomial", start.elapsed());
            let name = PolynomialInterpolator::new(degree).name();
            emit(
                &surface_report(name, &samples, &grid, &surface, None, Some(trend_report(&fitted))),
                cli.compact,
            )?;
        }

        Commands::Kriging { input, grid, model } => {
            let params = kriging_params(&model)?;
            let samples = load_samples(&input)?;
            let grid = build_grid(&grid, &samples)?;
            let pb = spinner("Solving kriging system...")?;
            let start = Instant::now();
            let result = ordinary_kriging(&samples, &grid, params)
                .context("Failed to compute kriging")?;
            pb.finish_and_clear();
            done("Kriging", start.elapsed());
            emit(
                &surface_report(
                    "kriging",
                    &samples,
                    &grid,
                    &result.estimate,
                    Some(&result.variance),
                    None,
                ),
                cli.compact,
            )?;
        }

        Commands::RegressionKriging {
            input,
            grid,
            degree,
            model,
        } => {
            let degree = parse_degree(degree)?;
            let ok = kriging_params(&model)?;
            let params = RegressionKrigingParams {
                degree,
                model: ok.model,
                covariance_ceiling: ok.covariance_ceiling,
            };
            let samples = load_samples(&input)?;
            let grid = build_grid(&grid, &samples)?;
            let pb = spinner("Computing regression kriging...")?;
            let start = Instant::now();
            let result = regression_kriging(&samples, &grid, params)
                .context("Failed to compute regression kriging")?;
            pb.finish_and_clear();
            done("Regression kriging", start.elapsed());
            emit(
                &surface_report(
                    "regression-kriging",
                    &samples,
                    &grid,
                    &result.estimate,
                    Some(&result.variance),
                    Some(trend_report(&result.trend)),
                ),
                cli.compact,
            )?;
        }

        Commands::Variogram {
            input,
            bins,
            max_lag,
            check_model,
            model,
        } => {
            let samples = load_samples(&input)?;
            let variogram = empirical_variogram(&samples, VariogramParams { n_bins: bins, max_lag })
                .context("Failed to compute variogram")?;
            info!(
                "Variogram: {} pairs in {} populated bins",
                variogram.total_pairs(),
                variogram.populated().count()
            );

            let (model, model_rss) = if check_model {
                let m = parse_model(&model)?;
                (Some(m), Some(variogram.model_rss(&m)))
            } else {
                (None, None)
            };

            emit(
                &VariogramReport {
                    pairs: variogram.total_pairs(),
                    bins: variogram.bins,
                    model,
                    model_rss,
                },
                cli.compact,
            )?;
        }

        Commands::CrossValidate {
            input,
            power,
            model,
        } => {
            let samples = load_samples(&input)?;
            let ok = kriging_params(&model)?;
            let methods: Vec<Box<dyn Interpolator>> = vec![
                Box::new(IdwInterpolator::new(IdwParams {
                    power,
                    ..Default::default()
                })),
                Box::new(PolynomialInterpolator::new(PolynomialDegree::Linear)),
                Box::new(PolynomialInterpolator::new(PolynomialDegree::Quadratic)),
                Box::new(KrigingInterpolator::new(ok)),
                Box::new(RegressionKrigingInterpolator::new(RegressionKrigingParams {
                    degree: PolynomialDegree::Linear,
                    model: ok.model,
                    covariance_ceiling: ok.covariance_ceiling,
                })),
            ];

            let pb = spinner("Cross-validating...")?;
            let start = Instant::now();
            let reports: Vec<MethodReport> = methods
                .iter()
                .map(|m| match leave_one_out(m.as_ref(), &samples) {
                    Ok(cv) => {
                        info!("{}: RMSE {:.4}, MAE {:.4}", cv.method, cv.rmse, cv.mae);
                        MethodReport::Ok(cv)
                    }
                    Err(e) => {
                        info!("{}: skipped ({})", m.name(), e);
                        MethodReport::Failed {
                            method: m.name(),
                            error: e.to_string(),
                        }
                    }
                })
                .collect();
            pb.finish_and_clear();
            done("Cross-validation", start.elapsed());
            emit(&reports, cli.compact)?;
        }
    }

    Ok(())
}
