//! pz3rig - Poser PZ3/CR2 inspector
//!
//! Prints the token stream, the object tree, the figures of a scene, or the bones of a
//! figure with the lengths and matrices a host would use to build its skeleton.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pz3rig::token::Tokenizer;
use pz3rig::{Document, Scene, decode_text};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pz3rig")]
#[command(about = "Poser PZ3/CR2 inspector")]
#[command(version)]
struct Cli {
    /// Debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the logical token stream
    Tokens {
        /// Input .pz3/.cr2 file
        input: PathBuf,
    },

    /// Print the parsed object tree
    Tree {
        /// Input .pz3/.cr2 file
        input: PathBuf,

        /// Print JSON instead of PZ3 text
        #[arg(long)]
        json: bool,
    },

    /// List the figures of a file
    Figures {
        /// Input .pz3/.cr2 file
        input: PathBuf,
    },

    /// Dump the bones of a figure as JSON
    Bones {
        /// Input .pz3/.cr2 file
        input: PathBuf,

        /// Figure name (default: first figure)
        #[arg(short, long)]
        figure: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Tokens { input } => {
            let text = read_text(&input)?;
            for token in Tokenizer::new(&text) {
                println!(
                    "{:>6}  {:<6}  {}",
                    token.line,
                    format!("{:?}", token.kind),
                    token.text
                );
            }
        }

        Commands::Tree { input, json } => {
            let doc = parse(&input)?;
            if json {
                println!("{}", doc.to_json_string()?);
            } else {
                for object in &doc.objects {
                    print!("{object}");
                }
            }
        }

        Commands::Figures { input } => {
            let doc = parse(&input)?;
            let scene = Scene::new(&doc)?;
            for name in scene.figure_names() {
                let armature = scene
                    .armature(name)
                    .with_context(|| format!("Failed to build figure {name:?}"))?;
                let root = armature.root().map(|b| b.id.as_str()).unwrap_or("-");
                println!("{name}\t{} bones\troot {root}", armature.len());
            }
        }

        Commands::Bones { input, figure } => {
            let doc = parse(&input)?;
            let scene = Scene::new(&doc)?;
            let name = match figure {
                Some(name) => name,
                None => scene
                    .figure_names()
                    .next()
                    .map(str::to_string)
                    .with_context(|| format!("No figure in {input:?}"))?,
            };
            let armature = scene
                .armature(&name)
                .with_context(|| format!("Failed to build figure {name:?}"))?;

            let bones: Vec<_> = armature
                .preorder()
                .into_iter()
                .map(|index| {
                    let bone = &armature.bones()[index];
                    json!({
                        "id": bone.id,
                        "ref": bone.ref_name,
                        "name": bone.display_name,
                        "parent": armature.parent(bone).map(|p| p.id.as_str()),
                        "order": bone.rotation_order.as_str(),
                        "origin": bone.origin.to_array(),
                        "orientation": bone.orientation.to_array(),
                        "length": armature.descendant_length(index),
                        "matrix": armature.bone_matrix(index).map(|m| m.to_cols_array()),
                    })
                })
                .collect();
            tracing::info!("{} bones in figure {:?}", bones.len(), name);

            let out = json!({ "figure": name, "bones": bones });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
    Ok(decode_text(&bytes).into_owned())
}

fn parse(path: &Path) -> Result<Document> {
    let text = read_text(path)?;
    let doc = Document::parse_with_progress(&text, |position| {
        tracing::debug!("parsed {:.0}%", position * 100.0);
    })
    .with_context(|| format!("Failed to parse {path:?}"))?;
    tracing::info!("{:?}: {} top-level object(s)", path, doc.objects.len());
    Ok(doc)
}
