pub mod calculator;
pub mod params;
pub mod simulation;
pub mod wheel;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    calculator::{pick_outcome_angle, sector_from_outcome, sector_from_point},
    params::DEFAULT_PARAMS,
    simulation::Simulation,
    wheel::Wheel,
};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Roulette wheel outcome calculator and spin simulator.")]
pub struct Args {
    /// Comma-separated sector labels (overrides --sectors)
    #[arg(short, long)]
    pub labels: Option<String>,

    /// Number of sectors, labeled 1..N
    #[arg(short, long, default_value_t = 4)]
    pub sectors: usize,

    /// Force the spin to land on this sector index (negative = free spin)
    #[arg(short, long, default_value_t = -1, allow_hyphen_values = true)]
    pub forced: i32,

    /// Pick the forced sector from a tap coordinate "X,Y" instead
    #[arg(long)]
    pub tap: Option<String>,

    /// Tap surface size "WxH"
    #[arg(long, default_value = "1000x1000")]
    pub surface: String,

    /// Number of spins; 1 reports a single winner, more runs the
    /// statistical harness
    #[arg(short, long, default_value_t = 1)]
    pub trials: usize,

    /// RNG seed (drawn from entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for simulation runs
    #[arg(long)]
    pub threads: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    log::set_max_level(log::LevelFilter::Trace);
    env_logger::builder()
        .filter(None, log::LevelFilter::Info)
        .init();

    let wheel = match &args.labels {
        Some(csv) => Wheel::new(csv.split(',').map(|s| s.trim().to_string()).collect())?,
        None => Wheel::with_sectors(args.sectors)?,
    };
    log::info!("{}", wheel);

    let mut params = *DEFAULT_PARAMS;
    params.trials = args.trials;
    if let Some(threads) = args.threads {
        params.n_threads = threads;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);

    // A tap coordinate picks the forced sector the way the operator's
    // double-tap gesture does in a touch UI
    let forced = match &args.tap {
        Some(tap) => {
            let point = parse_pair(tap, ',').context("bad --tap, expected X,Y")?;
            let surface =
                parse_pair(&args.surface, 'x').context("bad --surface, expected WxH")?;
            let idx = sector_from_point(point, surface, wheel.span());
            log::info!(
                "Tap at ({}, {}) on {}x{} surface selects sector {}",
                point.0,
                point.1,
                surface.0,
                surface.1,
                idx
            );
            idx
        }
        None => args.forced,
    };

    if forced >= wheel.n_sectors() as i32 {
        log::warn!(
            "Forced index {} is outside the wheel's {} sectors; spins will decode out of range",
            forced,
            wheel.n_sectors()
        );
    }

    if args.trials <= 1 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = pick_outcome_angle(&mut rng, forced, wheel.span());
        let landed = sector_from_outcome(outcome, wheel.span());
        let winner = wheel.label(landed).unwrap_or("<out of range>");

        log::info!(
            "Spin stopped after {:.2} degrees of total rotation on sector {}",
            outcome,
            landed
        );
        println!(
            r#"{{"Sectors": {}, "Forced": {}, "Outcome": {:.2}, "Landed": {}, "Winner": "{}"}}"#,
            wheel.n_sectors(),
            forced,
            outcome,
            landed,
            winner,
        );
        return Ok(());
    }

    log::info!("{}", params);
    let report = Simulation::new(wheel.clone(), forced, seed, params).run();

    let mut landed: Vec<_> = report.counts.keys().copied().collect();
    landed.sort_unstable();
    for idx in landed {
        log::info!(
            "Sector {} ({}): {} hits",
            idx,
            wheel.label(idx).unwrap_or("<out of range>"),
            report.counts[&idx]
        );
    }

    match report.chi_square {
        Some(stat) => {
            log::info!(
                "Chi-square {:.3}; worst sector {}",
                stat,
                report.worst_sector.unwrap_or(-1)
            );
            println!(
                r#"{{"Sectors": {}, "Trials": {}, "Seed": {}, "ChiSquare": {:.3}, "Uniform": {}}}"#,
                wheel.n_sectors(),
                report.trials,
                seed,
                stat,
                report.uniform.unwrap_or(false),
            );
        }
        None => {
            println!(
                r#"{{"Sectors": {}, "Trials": {}, "Seed": {}, "Forced": {}, "ForcedHit": {}}}"#,
                wheel.n_sectors(),
                report.trials,
                seed,
                forced,
                report.forced_hit.unwrap_or(false),
            );
        }
    }

    Ok(())
}

/// Parses a "A<sep>B" pair of numbers (tap coordinates, surface sizes).
fn parse_pair(s: &str, sep: char) -> Result<(f64, f64)> {
    let mut parts = s.split(sep);
    let a = parts
        .next()
        .context("missing first value")?
        .trim()
        .parse::<f64>()?;
    let b = parts
        .next()
        .context("missing second value")?
        .trim()
        .parse::<f64>()?;
    if parts.next().is_some() {
        bail!("too many values in '{}'", s);
    }
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_reads_taps_and_surfaces() {
        assert_eq!(parse_pair("50,0", ',').unwrap(), (50.0, 0.0));
        assert_eq!(parse_pair("1000x800", 'x').unwrap(), (1000.0, 800.0));
        assert!(parse_pair("1,2,3", ',').is_err());
        assert!(parse_pair("abc,2", ',').is_err());
    }
}
