use std::fmt::Display;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref DEFAULT_PARAMS: Params = Params {
        // Trials for a statistical run (enough for the chi-square check to
        // have real power at 8 sectors)
        trials: 10_000,

        // How often workers log progress (in trials). 0 is never.
        print_progress: 0,

        // Default to system physical cores (to prevent interference from hyperthreading)
        n_threads: num_cpus::get_physical(),
    };
}

/// Simulation harness parameters.
#[derive(Copy, Clone, Debug)]
pub struct Params {
    /// Number of spins in a simulation run
    pub trials: usize,

    /// How often to log progress. 0 is never.
    pub print_progress: usize,

    /// Number of worker threads
    pub n_threads: usize,
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Simulation Parameters =====")?;
        writeln!(f, "\t - trials (spins per run): {}", self.trials)?;
        writeln!(
            f,
            "\t - print_progress (trials between progress logs): {}",
            self.print_progress
        )?;
        writeln!(f, "\t - n_threads (worker threads): {}", self.n_threads)
    }
}
