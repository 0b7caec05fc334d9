mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkspace_kernel::{NavScene, SceneConfig, SceneEvent};
use walkspace_physics::SimplePhysics;
use walkspace_render::{DebugTextRenderer, RenderView, Renderer};
use walkspace_tools::SceneInspector;

use script::Script;

#[derive(Parser)]
#[command(name = "walkspace-cli", about = "CLI tool for walkspace scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load a scene file and report problems
    Validate {
        /// Scene YAML; the built-in home scene when omitted
        #[arg(long)]
        scene: Option<PathBuf>,
    },
    /// Run a scene headless against a scripted input timeline
    Simulate {
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Input script YAML; walks forward for two seconds when omitted
        #[arg(long)]
        script: Option<PathBuf>,
        /// Print the full run log as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in home scene as YAML
    DumpConfig,
}

fn load_scene(path: Option<&PathBuf>) -> Result<SceneConfig> {
    match path {
        Some(p) => SceneConfig::load(p).with_context(|| format!("loading scene {}", p.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("walkspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", walkspace_common::crate_info());
            println!("input: {}", walkspace_input::crate_info());
            println!("physics: {}", walkspace_physics::crate_info());
            println!("kernel: {}", walkspace_kernel::crate_info());
            println!("render: {}", walkspace_render::crate_info());
            println!("tools: {}", walkspace_tools::crate_info());
        }
        Commands::Validate { scene } => {
            let config = load_scene(scene.as_ref())?;
            let nav = NavScene::new(config.clone())?;
            println!("{}", SceneInspector::summary(&nav));
            for info in SceneInspector::triggers_by_distance(&nav) {
                println!("  {info}");
            }
            for (a, b) in config.overlapping_triggers() {
                tracing::warn!(first = %a, second = %b, "triggers overlap; the first one wins");
            }
            println!("OK");
        }
        Commands::Simulate {
            scene,
            script,
            json,
        } => {
            let config = load_scene(scene.as_ref())?;
            let script = match &script {
                Some(p) => Script::load(p)?,
                None => Script::default(),
            };

            let mut physics = SimplePhysics::new();
            let mut nav = NavScene::new(config)?;
            nav.spawn_body(&mut physics);
            let log = script::run(&mut nav, &mut physics, &script)?;

            if json {
                let out = serde_json::json!({
                    "summary": SceneInspector::summary(&nav),
                    "events": log.events,
                    "final": log.reports.last(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            for (tick, event) in &log.events {
                match event {
                    SceneEvent::TriggerEntered { id, prompt } => {
                        println!("[{tick:>5}] enter {id}: {prompt}")
                    }
                    SceneEvent::TriggerExited { id } => println!("[{tick:>5}] exit {id}"),
                    other => println!("[{tick:>5}] {other:?}"),
                }
            }
            let view = RenderView::from_scene(&nav);
            print!("{}", DebugTextRenderer::new().render(&nav, &view));
            println!("{}", SceneInspector::summary(&nav));
        }
        Commands::DumpConfig => {
            print!("{}", SceneConfig::default().to_yaml()?);
        }
    }

    Ok(())
}
