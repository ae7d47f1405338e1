use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use spritestage::{
    EchoService, Editor, GenerationOutcome, MatteParams, Point, StageConfig, decode_image,
    encode_png, export_png, matte, unpremultiply_rgba8_in_place,
};

#[derive(Parser, Debug)]
#[command(name = "spritestage", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Matte a single image and print its content bounds.
    Matte(MatteArgs),
    /// Import images onto a stage and render one frame.
    Stage(StageArgs),
}

#[derive(Parser, Debug)]
struct MatteArgs {
    /// Input image (PNG, JPEG, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Background distance threshold; defaults to the configured value.
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Parser, Debug)]
struct StageArgs {
    /// Images to import, laid out left to right.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Output PNG path for the rendered frame.
    #[arg(long)]
    out: PathBuf,

    /// Stage configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also export every finished sprite into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Matte(args) => cmd_matte(args),
        Command::Stage(args) => cmd_stage(args),
    }
}

fn cmd_matte(args: MatteArgs) -> anyhow::Result<()> {
    let cfg = StageConfig::default().with_env_overrides();
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let src = decode_image(&bytes)?;
    let m = matte(
        &src,
        MatteParams::new(args.threshold.unwrap_or(cfg.matte_threshold)),
    );
    write_file(&args.out, &encode_png(&m.image)?)?;

    let b = m.content_bounds;
    println!("{} {} {} {}", b.x, b.y, b.width, b.height);
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_stage(args: StageArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => StageConfig::from_path(path)?,
        None => StageConfig::default(),
    }
    .with_env_overrides();

    let mut editor = Editor::new(cfg, EchoService)?;
    let canvas = editor.config().canvas;
    let slots = args.images.len() as f64 + 1.0;
    let mut jobs = Vec::with_capacity(args.images.len());
    for (i, path) in args.images.iter().enumerate() {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let at = Point::new(
            f64::from(canvas.width) * (i as f64 + 1.0) / slots,
            f64::from(canvas.height) / 2.0,
        );
        let job = editor
            .submit_image(&bytes, "", Some(at))
            .with_context(|| format!("import '{}'", path.display()))?;
        jobs.push(job);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    let local = tokio::task::LocalSet::new();
    let outcomes = local.block_on(&rt, async move {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| tokio::task::spawn_local(job.run()))
            .collect();
        let mut outcomes = Vec::with_capacity(handles.len());
        for h in handles {
            outcomes.push(h.await.context("generation task panicked")?);
        }
        anyhow::Ok(outcomes)
    })?;
    for outcome in &outcomes {
        if let GenerationOutcome::Removed(id, err) = outcome {
            eprintln!("sprite {} failed: {err}", id.0);
        }
    }

    let mut frame = editor.render_frame()?;
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut frame.data);
    }
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export dir '{}'", dir.display()))?;
        let reg = editor.registry();
        for sprite in reg.iter().filter(|s| !s.is_generating()) {
            let path = dir.join(format!("sprite-{}.png", sprite.id.0));
            write_file(&path, &export_png(sprite)?)?;
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
