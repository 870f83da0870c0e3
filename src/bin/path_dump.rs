//! Builds a path and prints it as JSON, one sample every `--step` units.
//!
//! usage: path_dump [config.toml] [--waypoints waypoints.json] [--step 5.0]
//!
//! Without `--waypoints` a small demo course is used. The waypoint file holds
//! a JSON list of `{ "position": [x, y], "radius": r, "speed": s, "marker": "..." }`.

use std::{fs::read_to_string, path::PathBuf};

use arc_path::{
    ConfigError, MotionState, Path, PathBuilder, PathConfig, PathError, SegmentGeometry, Waypoint,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_STEP: f64 = 5.0;

#[derive(Debug, Error)]
enum DumpError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read waypoints: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    waypoints: Option<PathBuf>,
    step: Option<f64>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, DumpError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--waypoints" => {
                    let file = args
                        .next()
                        .ok_or_else(|| DumpError::Usage("--waypoints needs a file".into()))?;
                    parsed.waypoints = Some(file.into());
                }
                "--step" => {
                    let step = args
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                        .filter(|s| *s > 0.)
                        .ok_or_else(|| DumpError::Usage("--step needs a positive number".into()))?;
                    parsed.step = Some(step);
                }
                other if !other.starts_with("--") && parsed.config.is_none() => {
                    parsed.config = Some(other.into());
                }
                other => return Err(DumpError::Usage(format!("unexpected argument {other}"))),
            }
        }
        Ok(parsed)
    }
}

#[derive(Serialize)]
struct SegmentDump<'a> {
    geometry: SegmentGeometry,
    length: f64,
    max_speed: f64,
    end_speed: f64,
    markers: &'a [String],
    start_state: MotionState,
    end_state: MotionState,
}

#[derive(Serialize)]
struct Sample {
    segment: usize,
    distance: f64,
    x: f64,
    y: f64,
    speed: f64,
}

#[derive(Serialize)]
struct Dump<'a> {
    length: f64,
    duration: f64,
    segments: Vec<SegmentDump<'a>>,
    samples: Vec<Sample>,
}

fn demo_course() -> Vec<Waypoint> {
    vec![
        Waypoint::new(0., 0., 0., 60.).with_marker("start"),
        Waypoint::new(100., 0., 25., 80.),
        Waypoint::new(100., 80., 15., 50.).with_marker("intake"),
        Waypoint::new(20., 120., 10., 60.),
        Waypoint::new(0., 60., 0., 40.).with_marker("score"),
    ]
}

fn dump(path: &Path, step: f64) -> Dump<'_> {
    let segments = path
        .segments()
        .iter()
        .map(|s| SegmentDump {
            geometry: *s.geometry(),
            length: s.length(),
            max_speed: s.max_speed(),
            end_speed: s.end_speed(),
            markers: s.markers(),
            start_state: s.start_state(),
            end_state: s.end_state(),
        })
        .collect();

    let mut samples = Vec::new();
    for (i, segment) in path.segments().iter().enumerate() {
        let length = segment.length();
        let n = (length / step).ceil().max(1.) as usize;
        for k in 0..=n {
            let distance = (k as f64 * step).min(length);
            let point = segment.point_by_distance(distance);
            samples.push(Sample {
                segment: i,
                distance,
                x: point.x,
                y: point.y,
                speed: segment.speed_by_distance(distance),
            });
        }
    }

    Dump {
        length: path.length(),
        duration: path.duration(),
        segments,
        samples,
    }
}

fn run() -> Result<(), DumpError> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(file) => {
            info!("loading configuration from {:?}", file);
            PathConfig::load(file)?
        }
        None => PathConfig::default(),
    };
    let waypoints: Vec<Waypoint> = match &args.waypoints {
        Some(file) => serde_json::from_str(&read_to_string(file)?)?,
        None => demo_course(),
    };
    for w in &waypoints {
        info!("{w}");
    }

    let path = PathBuilder::new(config).build(&waypoints)?;
    let out = dump(&path, args.step.unwrap_or(DEFAULT_STEP));
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("arc_path=info,path_dump=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
