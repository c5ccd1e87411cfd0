use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use itc_core::{Result, Stamp};

#[derive(serde::Serialize)]
struct Output {
    implementation: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_ops: u64,
    duration_ms: f64,
    ops_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
struct Extra {
    replicas: u64,
    rounds: u64,
    final_event: String,
}

/// Fork the seed into `replicas` lineages, advance each once per round, then fold them back.
fn run(replicas: u64, rounds: u64) -> Result<(u64, Stamp)> {
    let mut ops = 0;
    let mut lineages = vec![Stamp::seed()];
    while (lineages.len() as u64) < replicas {
        let stamp = lineages.remove(0);
        let (a, b) = stamp.fork();
        lineages.push(a);
        lineages.push(b);
        ops += 1;
    }

    for _ in 0..rounds {
        for stamp in lineages.iter_mut() {
            *stamp = stamp.advance()?;
            ops += 1;
        }
    }

    let mut merged = lineages.remove(0);
    for stamp in &lineages {
        merged = merged.join(stamp)?;
        ops += 1;
    }
    Ok((ops, merged))
}

fn main() {
    let mut replicas: u64 = 16;
    let mut rounds: u64 = 200;
    let mut out_file: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--replicas=") {
            replicas = val.parse().unwrap_or(replicas);
        } else if let Some(val) = arg.strip_prefix("--rounds=") {
            rounds = val.parse().unwrap_or(rounds);
        } else if let Some(val) = arg.strip_prefix("--out=") {
            out_file = Some(PathBuf::from(val));
        }
    }

    let start = Instant::now();
    let (total_ops, merged) = run(replicas.max(1), rounds).expect("fork/advance/join workload");
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    let workload = format!("fork-advance-join-{}x{}", replicas, rounds);
    let output = Output {
        implementation: "itc-core",
        workload: workload.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        name: workload,
        total_ops,
        duration_ms,
        ops_per_sec: if duration_ms > 0.0 {
            total_ops as f64 / duration_ms * 1000.0
        } else {
            f64::INFINITY
        },
        extra: Extra {
            replicas,
            rounds,
            final_event: merged.event().to_string(),
        },
        source_file: out_file.as_ref().map(|p| p.display().to_string()),
    };

    let json = serde_json::to_string_pretty(&output).expect("serialize");
    if let Some(path) = out_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdirs");
        }
        fs::write(&path, &json).expect("write output");
    }
    println!("{}", json);
}
