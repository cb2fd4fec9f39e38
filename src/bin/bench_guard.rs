//! Fails CI when a criterion median exceeds its budget.
//!
//! `bench_guard [criterion-dir] [--budget <bench>=<ns>]...`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Absolute thresholds (ns). Set high to absorb CI variance while still
// catching an accidental quadratic blow-up in the pairwise pass.
const DEFAULT_BUDGETS: &[(&str, u64)] = &[
    ("resolve/fifty_mentions", 5_000_000),      // 5ms
    ("resolve/two_hundred_mentions", 60_000_000), // 60ms
    ("similarity/ratio_full_names", 20_000),    // 20µs
];

struct Args {
    criterion_dir: String,
    budgets: Vec<(String, u64)>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut criterion_dir = None;
    let mut overrides: Vec<(String, u64)> = Vec::new();

    let mut i = 1;
    while i < raw.len() {
        if raw[i] == "--budget" {
            let spec = raw
                .get(i + 1)
                .ok_or_else(|| "--budget requires <bench>=<ns>".to_string())?;
            let (name, ns) = spec
                .split_once('=')
                .ok_or_else(|| format!("malformed budget: {spec}"))?;
            let ns: u64 = ns
                .parse()
                .map_err(|_| format!("budget for {name} is not a number: {ns}"))?;
            overrides.push((name.to_string(), ns));
            i += 2;
        } else if criterion_dir.is_none() {
            criterion_dir = Some(raw[i].clone());
            i += 1;
        } else {
            return Err(format!("unexpected argument: {}", raw[i]));
        }
    }

    let mut budgets: Vec<(String, u64)> = DEFAULT_BUDGETS
        .iter()
        .map(|(name, ns)| ((*name).to_string(), *ns))
        .collect();
    for (name, ns) in overrides {
        match budgets.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = ns,
            None => budgets.push((name, ns)),
        }
    }

    Ok(Args {
        criterion_dir: criterion_dir.unwrap_or_else(|| "target/criterion".to_string()),
        budgets,
    })
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("bench_guard: {err}");
            return ExitCode::from(2);
        }
    };

    let Some(root) = resolve_criterion_root(&args.criterion_dir) else {
        eprintln!(
            "bench_guard: criterion dir not found: {} (also checked parent target dirs)",
            args.criterion_dir
        );
        return ExitCode::from(2);
    };

    let mut failures = Vec::new();
    for (bench_name, max_median_ns) in &args.budgets {
        match read_median_ns(&root, bench_name) {
            Ok(median_ns) if median_ns > *max_median_ns => failures.push(format!(
                "{bench_name}: median {median_ns}ns > budget {max_median_ns}ns"
            )),
            Ok(median_ns) => {
                println!("{bench_name}: median {median_ns}ns (budget {max_median_ns}ns)");
            }
            Err(err) => failures.push(format!("{bench_name}: failed to read median: {err}")),
        }
    }

    if failures.is_empty() {
        return ExitCode::SUCCESS;
    }

    eprintln!("bench_guard failed:");
    for f in failures {
        eprintln!("- {f}");
    }
    ExitCode::FAILURE
}

fn resolve_criterion_root(requested: &str) -> Option<PathBuf> {
    let requested_path = Path::new(requested);
    if requested_path.exists() {
        return Some(requested_path.to_path_buf());
    }
    if requested_path.is_absolute() {
        return None;
    }

    // `target/` may live in a parent directory (workspaces, CI caches).
    let mut dir = env::current_dir().ok()?;
    for _ in 0..6 {
        let candidate = dir.join(requested_path);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn read_median_ns(root: &Path, bench_name: &str) -> Result<u64, String> {
    let estimates = find_estimates_json(root, bench_name)
        .ok_or_else(|| format!("could not locate estimates.json for {bench_name}"))?;

    let bytes = fs::read(&estimates).map_err(|e| format!("read {}: {e}", estimates.display()))?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| format!("parse {}: {e}", estimates.display()))?;

    let median = json
        .get("median")
        .and_then(|v| v.get("point_estimate"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| format!("missing median.point_estimate in {}", estimates.display()))?;

    if !median.is_finite() || median < 0.0 {
        return Err(format!("invalid median value {median} in {}", estimates.display()));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(median.round() as u64)
}

/// Criterion lays results out as `<group>/<bench>/new/estimates.json`.
fn find_estimates_json(root: &Path, bench_name: &str) -> Option<PathBuf> {
    let tokens: Vec<&str> = bench_name.split('/').filter(|t| !t.is_empty()).collect();

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) != Some("estimates.json") {
                continue;
            }

            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let rel_s = rel.to_string_lossy().replace('\\', "/");
            if rel_s.ends_with("/new/estimates.json") && tokens.iter().all(|t| rel_s.contains(t)) {
                return Some(path);
            }
        }
    }
    None
}
