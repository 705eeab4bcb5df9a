use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use firstlight::{
    Director, Narrative, SparkRenderer, StarRenderer, Surface, Viewport, composite, sparks,
    starfield,
};

#[derive(Parser, Debug)]
#[command(name = "firstlight", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the scene at one progress value as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence across progress 0..=1.
    Sweep(SweepArgs),
    /// Print the evaluated scene frame as JSON.
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Narrative JSON; the built-in night-to-dawn narrative if omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Scroll progress in 0..=1.
    #[arg(long)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Simulation frames to advance before the shot (60 per second).
    #[arg(long, default_value_t = 240)]
    warmup: u64,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Narrative JSON; the built-in night-to-dawn narrative if omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output directory for frame_NNNN.png files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of frames across the progress sweep.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Narrative JSON; the built-in night-to-dawn narrative if omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Scroll progress in 0..=1.
    #[arg(long)]
    progress: f64,
}

const DT_SECS: f64 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn read_narrative(path: Option<&Path>) -> anyhow::Result<Narrative> {
    let Some(path) = path else {
        return Ok(Narrative::night_to_dawn());
    };
    let f = File::open(path).with_context(|| format!("open narrative '{}'", path.display()))?;
    let r = BufReader::new(f);
    let narrative: Narrative =
        serde_json::from_reader(r).with_context(|| "parse narrative JSON")?;
    Ok(narrative)
}

/// The composited page at one progress value: background fill, stars over
/// it, sparks on top once the first-light trigger has fired.
struct Compositor {
    director: Director,
    background: Surface,
    stars: StarRenderer,
    sparks: Option<SparkRenderer>,
    viewport: Viewport,
    seed: u64,
}

impl Compositor {
    fn new(narrative: Narrative, viewport: Viewport, seed: u64) -> anyhow::Result<Self> {
        Ok(Self {
            director: Director::new(narrative)?,
            background: Surface::new(viewport)?,
            stars: StarRenderer::new(starfield::DEFAULT_STAR_COUNT, viewport, seed)?,
            sparks: None,
            viewport,
            seed,
        })
    }

    /// Advances the simulations one display frame and recomposites.
    fn frame(&mut self, progress: f64) -> anyhow::Result<()> {
        let scene = self.director.evaluate(progress)?;

        let star_opacity = scene.opacities.get("stars").copied().unwrap_or(1.0);
        self.stars.render_frame(star_opacity)?;

        // Sparks mount the first time the trigger fires and stay mounted.
        let first_light = scene.triggers.get("first-light").copied().unwrap_or(false);
        if first_light && self.sparks.is_none() {
            self.sparks = Some(SparkRenderer::new(
                sparks::DEFAULT_SPARK_COUNT,
                self.viewport,
                self.seed.wrapping_add(1),
            )?);
        }
        if let Some(sparks) = &mut self.sparks {
            sparks.tick(DT_SECS)?;
        }

        self.background.clear(scene.background);
        composite::over_in_place(self.background.data_mut(), self.stars.surface().data(), 1.0)?;
        if let Some(sparks) = &self.sparks {
            composite::over_in_place(self.background.data_mut(), sparks.surface().data(), 1.0)?;
        }
        Ok(())
    }

    fn save_png(&self, out: &Path) -> anyhow::Result<()> {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            out,
            self.background.data(),
            self.background.width(),
            self.background.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out.display()))?;
        Ok(())
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let narrative = read_narrative(args.in_path.as_deref())?;
    let viewport = Viewport::new(args.width, args.height);
    let mut compositor = Compositor::new(narrative, viewport, args.seed)?;

    for _ in 0..args.warmup {
        compositor.frame(args.progress)?;
    }
    compositor.frame(args.progress)?;
    compositor.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    if args.frames == 0 {
        anyhow::bail!("--frames must be > 0");
    }

    let narrative = read_narrative(args.in_path.as_deref())?;
    let viewport = Viewport::new(args.width, args.height);
    let mut compositor = Compositor::new(narrative, viewport, args.seed)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let denom = u64::from(args.frames.saturating_sub(1)).max(1);
    for i in 0..args.frames {
        let progress = u64::from(i) as f64 / denom as f64;
        compositor.frame(progress)?;
        let out = args.out_dir.join(format!("frame_{i:04}.png"));
        compositor.save_png(&out)?;
    }

    eprintln!("wrote {} frames to {}", args.frames, args.out_dir.display());
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let narrative = read_narrative(args.in_path.as_deref())?;
    let mut director = Director::new(narrative)?;
    let scene = director.evaluate(args.progress)?;
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}
