use clap::Parser;
use serde::{Deserialize, Serialize};
use ssddecode::{
    BatchInput, BoxScales, DecodeConfig, Decoder, Detection, FrameSize, ModelSpec, OutputSpace,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "SSD tensor decoder (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for each decode stage.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ModelJson {
    anchor_count: usize,
    label_count: usize,
    input_width: u32,
    input_height: u32,
}

impl Default for ModelJson {
    fn default() -> Self {
        let spec = ModelSpec::default();
        Self {
            anchor_count: spec.anchor_count,
            label_count: spec.label_count,
            input_width: spec.input_width,
            input_height: spec.input_height,
        }
    }
}

impl From<ModelJson> for ModelSpec {
    fn from(value: ModelJson) -> Self {
        Self {
            anchor_count: value.anchor_count,
            label_count: value.label_count,
            input_width: value.input_width,
            input_height: value.input_height,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScalesJson {
    y: f32,
    x: f32,
    h: f32,
    w: f32,
}

impl Default for ScalesJson {
    fn default() -> Self {
        let scales = BoxScales::default();
        Self {
            y: scales.y,
            x: scales.x,
            h: scales.h,
            w: scales.w,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct FrameSizeJson {
    width: u32,
    height: u32,
}

impl From<FrameSizeJson> for FrameSize {
    fn from(value: FrameSizeJson) -> Self {
        FrameSize::new(value.width, value.height)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum OutputJson {
    #[default]
    Model,
    Frame {
        width: u32,
        height: u32,
    },
}

impl From<OutputJson> for OutputSpace {
    fn from(value: OutputJson) -> Self {
        match value {
            OutputJson::Model => OutputSpace::Model,
            OutputJson::Frame { width, height } => {
                OutputSpace::Frame(FrameSize::new(width, height))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeJson {
    model: ModelJson,
    scales: ScalesJson,
    score_threshold: f32,
    iou_threshold: f32,
    max_candidates: usize,
    output: OutputJson,
}

impl Default for DecodeJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            model: ModelJson::default(),
            scales: ScalesJson::default(),
            score_threshold: cfg.score_threshold,
            iou_threshold: cfg.iou_threshold,
            max_candidates: cfg.max_candidates,
            output: OutputJson::Model,
        }
    }
}

impl From<DecodeJson> for DecodeConfig {
    fn from(value: DecodeJson) -> Self {
        Self {
            model: value.model.into(),
            scales: BoxScales {
                y: value.scales.y,
                x: value.scales.x,
                h: value.scales.h,
                w: value.scales.w,
            },
            score_threshold: value.score_threshold,
            iou_threshold: value.iou_threshold,
            max_candidates: value.max_candidates,
            output: value.output.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    labels_path: String,
    box_priors_path: String,
    boxes_path: String,
    predictions_path: String,
    output_path: Option<String>,
    batch_size: usize,
    frame_sizes: Vec<FrameSizeJson>,
    verbose: bool,
    decode: DecodeJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels_path: String::new(),
            box_priors_path: String::new(),
            boxes_path: String::new(),
            predictions_path: String::new(),
            output_path: None,
            batch_size: 1,
            frame_sizes: Vec::new(),
            verbose: false,
            decode: DecodeJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    stream_id: usize,
    class_id: usize,
    label: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    score: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            stream_id: value.stream_id,
            class_id: value.class_id,
            label: value.label.to_string(),
            x: value.bbox.x,
            y: value.bbox.y,
            width: value.bbox.width,
            height: value.bbox.height,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    streams: Vec<Vec<DetectionRecord>>,
}

/// Reads a raw little-endian `f32` tensor dump.
fn read_f32_tensor(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "{}: {} bytes is not a whole number of f32 values",
            path.display(),
            bytes.len()
        )
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;

    if cli.trace || config.verbose {
        let level = if config.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(format!("ssddecode={level}").parse()?)
                    .add_directive(format!("ssddecode_cli={level}").parse()?),
            )
            .with_target(false)
            .init();
    }

    if config.labels_path.is_empty() || config.box_priors_path.is_empty() {
        return Err("labels_path and box_priors_path must be set in the config".into());
    }
    if config.boxes_path.is_empty() || config.predictions_path.is_empty() {
        return Err("boxes_path and predictions_path must be set in the config".into());
    }
    if config.batch_size == 0 {
        return Err("batch_size must be at least 1".into());
    }

    let decoder = Decoder::new(config.decode.into())?;
    decoder.load_labels(&config.labels_path)?;
    decoder.load_priors(&config.box_priors_path)?;
    if config.verbose {
        if let Some(labels) = decoder.labels() {
            for (idx, label) in labels.iter().enumerate() {
                tracing::debug!(idx, label, "label");
            }
        }
    }

    let boxes = read_f32_tensor(Path::new(&config.boxes_path))?;
    let predictions = read_f32_tensor(Path::new(&config.predictions_path))?;
    let frame_sizes: Vec<FrameSize> = config.frame_sizes.into_iter().map(Into::into).collect();

    let streams = decoder.decode_batch(&BatchInput {
        boxes: &boxes,
        predictions: &predictions,
        batch_size: config.batch_size,
        frame_sizes: &frame_sizes,
    })?;
    for (stream, detections) in streams.iter().enumerate() {
        tracing::debug!(stream, detections = detections.len(), "stream decoded");
    }

    let output = Output {
        streams: streams
            .into_iter()
            .map(|dets| dets.into_iter().map(DetectionRecord::from).collect())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
