//! morphtree CLI - component tree filtering of n-dimensional images

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use morphtree_algorithms::attribute::Attribute;
use morphtree_algorithms::build::{build_tree, TreeBuilderParams};
use morphtree_algorithms::filtering::{attribute_filter, size_opening, AttributeFilterParams, PruningPolicy};
use morphtree_algorithms::pruning::{granulometry, keep_n_lobes, GranulometryParams, KeepNLobesParams};
use morphtree_algorithms::reconstruct::{
    attribute_histogram, attribute_table, attribute_to_image, leaves_to_binary, leaves_to_labels,
    tree_to_image, HistogramParams, HistogramWeight,
};
use morphtree_core::io::{read_tiff, write_tiff, SampleFormat, TiffOptions};
use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, Connectivity, Raster, RasterElement, TreeOrdering};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "morphtree")]
#[command(author, version, about = "Max-tree and min-tree image filtering", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How the component tree is built
#[derive(Args, Clone, Copy)]
struct TreeArgs {
    /// Build a min-tree (dark components) instead of a max-tree
    #[arg(long)]
    min_tree: bool,
    /// Connect diagonal neighbors too
    #[arg(long)]
    full: bool,
}

impl TreeArgs {
    fn params(self) -> TreeBuilderParams {
        TreeBuilderParams {
            ordering: if self.min_tree {
                TreeOrdering::Min
            } else {
                TreeOrdering::Max
            },
            connectivity: if self.full {
                Connectivity::Full
            } else {
                Connectivity::Face
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show image and tree information
    Info {
        /// Input image
        input: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Build the tree and write it back as an image
    Reconstruct {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Output sample type: u8, u16, f32
        #[arg(short, long, default_value = "f32")]
        format: String,
    },
    /// Remove components whose attribute is below a threshold
    Filter {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Attribute: size, physical-size, integrated-intensity, intensity,
        /// peak, leaf, gradient, local-gradient, intensity-variation,
        /// compactness, weighted-compactness, volume
        #[arg(short, long, default_value = "size")]
        attribute: String,
        /// Removal threshold
        #[arg(short, long)]
        threshold: f64,
        /// Pruning policy: direct, subtract, minimum, maximum
        #[arg(short, long, default_value = "direct")]
        policy: String,
        /// Remove components above the threshold instead
        #[arg(short, long)]
        reverse: bool,
        #[arg(short, long, default_value = "f32")]
        format: String,
    },
    /// Size opening (closing with --min-tree)
    Opening {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Minimum component size in pixels
        #[arg(short, long)]
        min_size: usize,
        #[arg(short, long, default_value = "f32")]
        format: String,
    },
    /// Write an attribute map
    Attribute {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        #[arg(short, long, default_value = "size")]
        attribute: String,
        /// Rescale the attribute range onto LO..HI
        #[arg(long, num_args = 2, value_names = ["LO", "HI"])]
        rescale: Option<Vec<f64>>,
        #[arg(short, long, default_value = "f32")]
        format: String,
    },
    /// Granulometric curve as CSV
    Granulometry {
        input: PathBuf,
        /// CSV output (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        tree: TreeArgs,
        #[arg(short, long, default_value = "size")]
        attribute: String,
        /// Remove the largest leaves first
        #[arg(short, long)]
        reverse: bool,
    },
    /// Attribute histogram as CSV
    Histogram {
        input: PathBuf,
        /// CSV output (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        tree: TreeArgs,
        #[arg(short, long, default_value = "gradient")]
        attribute: String,
        /// Number of equal-width bins
        #[arg(short, long, default_value = "16")]
        bins: usize,
        /// Count owned pixels instead of nodes
        #[arg(long)]
        pixels: bool,
    },
    /// Keep the N most prominent lobes and write their label image
    Lobes {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Number of lobes to keep
        #[arg(short = 'n', long)]
        lobes: usize,
        #[arg(short, long, default_value = "volume")]
        attribute: String,
        /// Drop the largest attribute first
        #[arg(short, long)]
        reverse: bool,
        /// Do not queue parents that become leaves
        #[arg(long)]
        no_new_leaves: bool,
        #[arg(short, long, default_value = "u16")]
        format: String,
    },
    /// Write the pixels owned by leaves
    Leaves {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// One label per leaf instead of a binary mask
        #[arg(short, long)]
        labels: bool,
        #[arg(short, long, default_value = "u16")]
        format: String,
    },
    /// Export per-node attributes as JSON
    Table {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Attributes to include (comma separated)
        #[arg(short, long, value_delimiter = ',', default_value = "size,gradient")]
        attributes: Vec<String>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_image(path: &PathBuf) -> Result<Raster<f64>> {
    let pb = spinner("Reading image...");
    let raster: Raster<f64> = read_tiff(path).context("Failed to read image")?;
    pb.finish_and_clear();
    info!("Input: {:?} ({} pixels)", raster.shape(), raster.len());
    Ok(raster)
}

fn build(raster: &Raster<f64>, args: TreeArgs) -> Result<ComponentTree<f64>> {
    let params = args.params();
    let pb = spinner("Building tree...");
    let tree = build_tree(raster, params).context("Failed to build tree")?;
    pb.finish_and_clear();
    info!(
        "{:?}-tree: {} nodes, {} leaves",
        params.ordering,
        tree.len(),
        tree.leaves().count()
    );
    Ok(tree)
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &PathBuf, format: &str) -> Result<()> {
    let options = TiffOptions {
        sample_format: parse_format(format)?,
    };
    let pb = spinner("Writing output...");
    write_tiff(raster, path, Some(options)).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn csv_writer(output: &Option<PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output")?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_format(s: &str) -> Result<SampleFormat> {
    match s.to_lowercase().as_str() {
        "u8" | "byte" => Ok(SampleFormat::U8),
        "u16" => Ok(SampleFormat::U16),
        "f32" | "float" => Ok(SampleFormat::F32),
        _ => anyhow::bail!("Unknown format: {}. Use u8, u16 or f32.", s),
    }
}

fn parse_attribute(s: &str) -> Result<Attribute> {
    let attribute = match s.to_lowercase().as_str() {
        "size" | "area" => Attribute::Size,
        "physical-size" | "physical" => Attribute::PhysicalSize,
        "integrated-intensity" | "integrated" => Attribute::IntegratedIntensity,
        "intensity" | "level" => Attribute::Intensity,
        "peak" | "peak-intensity" => Attribute::PeakIntensity,
        "leaf" => Attribute::Leaf,
        "gradient" | "contrast" => Attribute::Gradient,
        "local-gradient" => Attribute::LocalGradient {
            use_zero_leaves: false,
        },
        "intensity-variation" => Attribute::IntensityVariation,
        "compactness" => Attribute::Compactness { weighted: false },
        "weighted-compactness" => Attribute::Compactness { weighted: true },
        "volume" | "volume-levelling" => Attribute::VolumeLevelling,
        _ => anyhow::bail!("Unknown attribute: {}", s),
    };
    Ok(attribute)
}

fn parse_policy(s: &str) -> Result<PruningPolicy> {
    match s.to_lowercase().as_str() {
        "direct" => Ok(PruningPolicy::Direct),
        "subtract" | "sub" => Ok(PruningPolicy::Subtract),
        "minimum" | "min" => Ok(PruningPolicy::Minimum),
        "maximum" | "max" => Ok(PruningPolicy::Maximum),
        _ => anyhow::bail!("Unknown policy: {}. Use direct, subtract, minimum or maximum.", s),
    }
}

/// Compute `name` into slot 0 of `tree`
fn compute(tree: &mut ComponentTree<f64>, name: &str) -> Result<AttributeSlot> {
    let attribute = parse_attribute(name)?;
    let slot = AttributeSlot::default();
    attribute.compute(tree, slot);
    Ok(slot)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input, tree } => {
            let raster = read_image(&input)?;
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Shape: {:?} ({} pixels)", raster.shape(), raster.len());
            println!("Spacing: {:?}", raster.spacing().as_slice());
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }

            let start = Instant::now();
            let t = build(&raster, tree)?;
            println!("\nTree ({:?}):", t.ordering());
            println!("  Nodes: {}", t.len());
            println!("  Leaves: {}", t.leaves().count());
            println!("  Depth: {}", t.depth());
            println!("  Build time: {:.2?}", start.elapsed());
        }

        Commands::Reconstruct {
            input,
            output,
            tree,
            format,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let t = build(&raster, tree)?;
            let result = tree_to_image(&t).context("Failed to reconstruct")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Reconstruction", &output, elapsed);
        }

        Commands::Filter {
            input,
            output,
            tree,
            attribute,
            threshold,
            policy,
            reverse,
            format,
        } => {
            let policy = parse_policy(&policy)?;
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let slot = compute(&mut t, &attribute)?;
            let params = AttributeFilterParams {
                slot,
                threshold,
                policy,
                reverse_ordering: reverse,
            };
            let removed = attribute_filter(&mut t, &params);
            info!("Removed {} nodes", removed);
            let result = tree_to_image(&t).context("Failed to reconstruct")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Filtered image", &output, elapsed);
        }

        Commands::Opening {
            input,
            output,
            tree,
            min_size,
            format,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let removed = size_opening(&mut t, min_size);
            info!("Removed {} nodes", removed);
            let result = tree_to_image(&t).context("Failed to reconstruct")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Size opening", &output, elapsed);
        }

        Commands::Attribute {
            input,
            output,
            tree,
            attribute,
            rescale,
            format,
        } => {
            let rescale = match rescale.as_deref() {
                None => None,
                Some(&[lo, hi]) => Some((lo, hi)),
                Some(_) => anyhow::bail!("--rescale takes two values"),
            };
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let slot = compute(&mut t, &attribute)?;
            let result: Raster<f64> =
                attribute_to_image(&t, slot, rescale).context("Failed to map attribute")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Attribute map", &output, elapsed);
        }

        Commands::Granulometry {
            input,
            output,
            tree,
            attribute,
            reverse,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let slot = compute(&mut t, &attribute)?;
            let curve = granulometry(
                &mut t,
                &GranulometryParams {
                    slot,
                    reverse_ordering: reverse,
                },
            );
            let elapsed = start.elapsed();

            let mut out = csv_writer(&output)?;
            writeln!(out, "step,node,attribute,pixels,cumulative_pixels")?;
            for (i, step) in curve.steps.iter().enumerate() {
                writeln!(
                    out,
                    "{},{},{},{},{}",
                    i, step.node, step.attribute, step.pixels, step.cumulative_pixels
                )?;
            }
            out.flush()?;
            if let Some(path) = &output {
                done("Granulometry", path, elapsed);
            }
        }

        Commands::Histogram {
            input,
            output,
            tree,
            attribute,
            bins,
            pixels,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let slot = compute(&mut t, &attribute)?;
            let params = HistogramParams {
                slot,
                bins,
                weight: if pixels {
                    HistogramWeight::Pixels
                } else {
                    HistogramWeight::Nodes
                },
            };
            let hist = attribute_histogram(&t, &params).context("Failed to build histogram")?;
            if hist.skipped > 0 {
                info!("Skipped {} non-finite values", hist.skipped);
            }
            let elapsed = start.elapsed();

            let mut out = csv_writer(&output)?;
            writeln!(out, "lower,upper,count")?;
            for bin in &hist.bins {
                writeln!(out, "{},{},{}", bin.lower, bin.upper, bin.count)?;
            }
            out.flush()?;
            if let Some(path) = &output {
                done("Histogram", path, elapsed);
            }
        }

        Commands::Lobes {
            input,
            output,
            tree,
            lobes,
            attribute,
            reverse,
            no_new_leaves,
            format,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let slot = compute(&mut t, &attribute)?;
            let params = KeepNLobesParams {
                slot,
                lobes,
                reverse_ordering: reverse,
                add_new_leaves_to_queue: !no_new_leaves,
            };
            keep_n_lobes(&mut t, &params).context("Failed to select lobes")?;
            let result: Raster<u32> = leaves_to_labels(&t, 0).context("Failed to label lobes")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Lobes", &output, elapsed);
        }

        Commands::Leaves {
            input,
            output,
            tree,
            labels,
            format,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let t = build(&raster, tree)?;
            let result: Raster<u32> = if labels {
                leaves_to_labels(&t, 0)
            } else {
                leaves_to_binary(&t, 255, 0)
            }
            .context("Failed to write leaves")?;
            let elapsed = start.elapsed();
            write_result(&result, &output, &format)?;
            done("Leaves", &output, elapsed);
        }

        Commands::Table {
            input,
            output,
            tree,
            attributes,
        } => {
            let raster = read_image(&input)?;
            let start = Instant::now();
            let mut t = build(&raster, tree)?;
            let mut slots = Vec::with_capacity(attributes.len());
            for (i, name) in attributes.iter().enumerate() {
                let slot = AttributeSlot::new(i).context("Too many attributes")?;
                parse_attribute(name)?.compute(&mut t, slot);
                slots.push(slot);
            }
            let table = attribute_table(&t, &slots);
            let file = File::create(&output).context("Failed to create output")?;
            serde_json::to_writer_pretty(BufWriter::new(file), &table)
                .context("Failed to write table")?;
            done("Attribute table", &output, start.elapsed());
        }
    }

    Ok(())
}
