use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flexscene::{
    AnimationOptions, Dimension, Ease, Fps, FrameDriver, MonospaceMeasurer, NodeId,
    ParleyMeasurer, Stage, StyleAttr, StyleAttributeSet, TreeSpec,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flexscene", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out a JSON tree and print every node's box.
    Layout(LayoutArgs),
    /// Animate one node's width and print its box per frame.
    Animate(AnimateArgs),
}

#[derive(Args, Debug)]
struct TreeArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the stage's available width.
    #[arg(long)]
    width: Option<f32>,

    /// Override the stage's available height.
    #[arg(long)]
    height: Option<f32>,

    /// Measure text with this font instead of the monospace measurer.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Print JSON instead of the indented trace.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Label of the node to animate.
    #[arg(long)]
    node: String,

    /// Target width in pixels.
    #[arg(long)]
    width: f32,

    #[arg(long, default_value_t = 12)]
    frames: u64,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Tween duration in milliseconds; the stage default when omitted.
    #[arg(long)]
    duration: Option<f64>,

    /// Easing name, e.g. `linear` or `in-out-quad`.
    #[arg(long)]
    easing: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Animate(args) => cmd_animate(args),
    }
}

fn read_tree_json(path: &Path) -> anyhow::Result<TreeSpec> {
    let f = File::open(path).with_context(|| format!("open tree '{}'", path.display()))?;
    let r = BufReader::new(f);
    let tree: TreeSpec = serde_json::from_reader(r).with_context(|| "parse tree JSON")?;
    Ok(tree)
}

fn build_stage(args: &TreeArgs) -> anyhow::Result<(Stage, NodeId)> {
    let mut tree = read_tree_json(&args.in_path)?;
    if args.width.is_some() {
        tree.stage.available_width = args.width;
    }
    if args.height.is_some() {
        tree.stage.available_height = args.height;
    }

    let built = match &args.font {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
            tree.build(ParleyMeasurer::from_font_bytes(&bytes)?)?
        }
        None => tree.build(MonospaceMeasurer::default())?,
    };
    Ok(built)
}

fn node_name(stage: &Stage, id: NodeId) -> anyhow::Result<String> {
    Ok(stage
        .label(id)?
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{id:?}")))
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let (mut stage, root) = build_stage(&args.tree)?;
    let trace = stage.recalculate(root)?;

    if args.json {
        let mut nodes = Vec::new();
        for id in trace.nodes() {
            nodes.push(serde_json::json!({
                "label": node_name(&stage, id)?,
                "box": stage.computed_box(id)?,
            }));
        }
        let out = serde_json::json!({
            "layoutPasses": stage.layout_passes(),
            "nodes": nodes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{trace}");
    println!();
    for entry in &trace.entries {
        let b = stage.computed_box(entry.node)?;
        println!(
            "{:<16} left={} top={} width={} height={}",
            entry.label, b.left, b.top, b.width, b.height
        );
    }
    eprintln!("layout passes: {}", stage.layout_passes());
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let tree = TreeArgs {
        in_path: args.in_path,
        width: None,
        height: None,
        font: None,
    };
    let (mut stage, _root) = build_stage(&tree)?;
    let id = stage
        .find(&args.node)
        .with_context(|| format!("no node labelled '{}'", args.node))?;

    let easing = args
        .easing
        .map(|name| serde_json::from_value::<Ease>(serde_json::Value::String(name)))
        .transpose()
        .with_context(|| "parse easing")?;
    let animation = AnimationOptions {
        duration: args.duration,
        easing,
    };
    let patch = StyleAttributeSet::new().with(StyleAttr::Width(Dimension::Px(args.width)));
    stage.set_styles(id, &patch, Some(animation))?;

    let mut driver = FrameDriver::new(Fps::new(args.fps, 1)?);
    for _ in 0..args.frames {
        driver.step(&mut stage)?;
        let b = stage.computed_box(id)?;
        println!(
            "frame {:>3} t={:>7.1}ms width={} height={}",
            driver.frame(),
            driver.elapsed_ms(),
            b.width,
            b.height
        );
        if stage.tweens().is_empty() {
            break;
        }
    }
    Ok(())
}
