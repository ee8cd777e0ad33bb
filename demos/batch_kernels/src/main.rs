use std::path::PathBuf;

use argh::FromArgs;

use imgbatch::imgproc::batch::{cutout_batch_with_params, transform_batch_with_params};
use imgbatch::imgproc::params::{CutoutParams, TransformParams};
use imgbatch::io::functional as F;

mod config;

use config::{ModeArg, ParamsBuilder};

#[derive(FromArgs)]
/// Apply geometric kernels to a batch of linearized images stored as a CSV matrix
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Cutout(CutoutArgs),
    Transform(TransformArgs),
}

#[derive(FromArgs)]
/// Overwrite a rectangular region of every image with a fill color
#[argh(subcommand, name = "cutout")]
struct CutoutArgs {
    /// path to the input CSV matrix
    #[argh(option)]
    in_file: PathBuf,

    /// path to the output CSV matrix
    #[argh(option)]
    out_file: PathBuf,

    /// JSON file with the kernel parameters, overridden by the options below
    #[argh(option)]
    params: Option<PathBuf>,

    /// height of the input images
    #[argh(option)]
    s_rows: Option<usize>,

    /// width of the input images
    #[argh(option)]
    s_cols: Option<usize>,

    /// one-based column of the top-left corner of the region
    #[argh(option)]
    x: Option<usize>,

    /// one-based row of the top-left corner of the region
    #[argh(option)]
    y: Option<usize>,

    /// width of the region
    #[argh(option)]
    w: Option<usize>,

    /// height of the region
    #[argh(option)]
    h: Option<usize>,

    /// value written inside the region
    #[argh(option)]
    fill_color: Option<f64>,

    /// execution mode: local, serial or partitioned
    #[argh(option, default = "ModeArg::Local")]
    mode: ModeArg,

    /// number of partitions in partitioned mode
    #[argh(option, default = "4")]
    workers: usize,
}

#[derive(FromArgs)]
/// Resample every image through a forward affine map with nearest neighbor sampling
#[argh(subcommand, name = "transform")]
struct TransformArgs {
    /// path to the input CSV matrix
    #[argh(option)]
    in_file: PathBuf,

    /// path to the output CSV matrix
    #[argh(option)]
    out_file: PathBuf,

    /// JSON file with the kernel parameters, overridden by the options below
    #[argh(option)]
    params: Option<PathBuf>,

    /// height of the input images
    #[argh(option)]
    s_rows: Option<usize>,

    /// width of the input images
    #[argh(option)]
    s_cols: Option<usize>,

    /// forward coefficient a
    #[argh(option)]
    a: Option<f64>,

    /// forward coefficient b
    #[argh(option)]
    b: Option<f64>,

    /// forward coefficient c
    #[argh(option)]
    c: Option<f64>,

    /// forward coefficient d
    #[argh(option)]
    d: Option<f64>,

    /// forward coefficient e
    #[argh(option)]
    e: Option<f64>,

    /// forward coefficient f
    #[argh(option)]
    f: Option<f64>,

    /// width of the output images, truncated to an integer
    #[argh(option)]
    out_w: Option<f64>,

    /// height of the output images, truncated to an integer
    #[argh(option)]
    out_h: Option<f64>,

    /// value of output pixels without a source
    #[argh(option)]
    fill_value: Option<f64>,

    /// execution mode: local, serial or partitioned
    #[argh(option, default = "ModeArg::Local")]
    mode: ModeArg,

    /// number of partitions in partitioned mode
    #[argh(option, default = "4")]
    workers: usize,
}

fn run_cutout(args: CutoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params: CutoutParams = ParamsBuilder::from_file(args.params.as_deref())?
        .set("s_rows", args.s_rows)
        .set("s_cols", args.s_cols)
        .set("x", args.x)
        .set("y", args.y)
        .set("w", args.w)
        .set("h", args.h)
        .set("fill_color", args.fill_color)
        .build()?;

    let batch = F::read_batch_csv(&args.in_file, Some(params.image_size()))?;
    let ctx = args.mode.context(args.workers);

    let output = cutout_batch_with_params(&batch, &params, &ctx)?;
    F::write_batch_csv(&args.out_file, &output)?;

    log::info!(
        "cutout {} of {} images written to {}",
        params.region(),
        output.num_images(),
        args.out_file.display()
    );

    Ok(())
}

fn run_transform(args: TransformArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params: TransformParams = ParamsBuilder::from_file(args.params.as_deref())?
        .set("s_rows", args.s_rows)
        .set("s_cols", args.s_cols)
        .set("a", args.a)
        .set("b", args.b)
        .set("c", args.c)
        .set("d", args.d)
        .set("e", args.e)
        .set("f", args.f)
        .set("out_w", args.out_w)
        .set("out_h", args.out_h)
        .set("fill_value", args.fill_value)
        .build()?;

    let batch = F::read_batch_csv(&args.in_file, Some(params.image_size()))?;
    let ctx = args.mode.context(args.workers);

    let output = transform_batch_with_params(&batch, &params, &ctx)?;
    F::write_batch_csv(&args.out_file, &output)?;

    log::info!(
        "transformed {} images to {} written to {}",
        output.num_images(),
        output.image_size(),
        args.out_file.display()
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    match args.command {
        Command::Cutout(args) => run_cutout(args),
        Command::Transform(args) => run_transform(args),
    }
}
