use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;

use dev_test_runner::Fixture;

fn fixture_paths() -> anyhow::Result<Vec<PathBuf>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let patterns = if args.is_empty() {
        vec![concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/*.json").to_owned()]
    } else {
        args
    };
    let mut out = Vec::new();
    for pattern in &patterns {
        for entry in glob::glob(pattern).with_context(|| format!("bad pattern {pattern}"))? {
            out.push(entry?);
        }
    }
    out.sort();
    Ok(out)
}

fn run() -> anyhow::Result<bool> {
    let mut all_passed = true;
    for path in fixture_paths()? {
        let fixture = Fixture::load(&path)?;
        let report = fixture.run(&path)?;
        let label = report.label();
        if report.passed() {
            eprintln!("{} {label} ({} samples)", "✅".green(), report.checked);
            continue;
        }
        all_passed = false;
        eprintln!("{} {label}: {}", "❌".red(), fixture.description);
        eprintln!("   expression: {}", report.expression);
        for mismatch in &report.mismatches {
            eprintln!(
                "   {} expected {} got {:?}",
                mismatch.value, mismatch.expected, mismatch.outcome
            );
        }
    }
    Ok(all_passed)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
