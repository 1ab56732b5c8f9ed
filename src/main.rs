use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rocket_sim::config::{InitialConditions, SimulationConfig};
use rocket_sim::io::{csv, json::{self, FlightSummary}};
use rocket_sim::sim::{self, FlightLog};

#[derive(Parser, Debug)]
#[command(name = "rocket-sim")]
#[command(about = "Planar rocket flight with sensor fusion and pitch control")]
#[command(version)]
struct Args {
    /// Integration step, s
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// Run duration, s
    #[arg(long, default_value_t = 30.0)]
    t_end: f64,

    /// Engine cutoff, s
    #[arg(long, default_value_t = 10.0)]
    t_burn: f64,

    /// Sensor noise seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Engine thrust, N
    #[arg(long)]
    thrust: Option<f64>,

    #[arg(long)]
    kp: Option<f64>,

    #[arg(long)]
    ki: Option<f64>,

    #[arg(long)]
    kd: Option<f64>,

    /// Initial pitch disturbance, deg
    #[arg(long, default_value_t = 0.0)]
    theta0_deg: f64,

    /// Write every flight record as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the flight summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        let mut cfg = SimulationConfig {
            dt: self.dt,
            t_end: self.t_end,
            t_burn: self.t_burn,
            seed: self.seed,
            initial: InitialConditions {
                theta: self.theta0_deg.to_radians(),
                ..InitialConditions::default()
            },
            ..SimulationConfig::default()
        };
        if let Some(thrust) = self.thrust {
            cfg.rocket.max_thrust = thrust;
        }
        if let Some(kp) = self.kp {
            cfg.controller.kp = kp;
        }
        if let Some(ki) = self.ki {
            cfg.controller.ki = ki;
        }
        if let Some(kd) = self.kd {
            cfg.controller.kd = kd;
        }
        cfg
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = args.config();

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let log = sim::simulate(&config).context("invalid simulation configuration")?;
    let summary = FlightSummary::from_log(&log);

    print_report(&config, &log, &summary);

    if let Some(path) = &args.csv {
        csv::write_records_file(path, log.records())
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Records written to {}", path.display());
    }
    if let Some(path) = &args.json {
        json::write_summary_file(path, &config, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Summary written to {}", path.display());
    }

    Ok(())
}

fn print_report(config: &SimulationConfig, log: &FlightLog, summary: &FlightSummary) {
    let rocket = &config.rocket;
    let g = config.environment.gravity;

    println!();
    println!("====================================================================");
    println!("  ROCKET FLIGHT SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Rocket Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Dry mass:      {:>8.1} kg    Fuel:         {:>8.1} kg",
        rocket.dry_mass, rocket.fuel_mass
    );
    println!(
        "  Total mass:    {:>8.1} kg    TWR:          {:>8.2}",
        rocket.total_mass(),
        rocket.twr(g)
    );
    println!(
        "  Thrust:        {:>8.0} N     Isp:          {:>8.0} s",
        rocket.max_thrust, rocket.isp
    );
    println!(
        "  Burn time:     {:>8.1} s     Delta-v:      {:>8.0} m/s",
        config.t_burn,
        rocket.delta_v()
    );
    println!(
        "  Max gimbal:    {:>8.1} deg   Steps:        {:>8}",
        rocket.max_gimbal_angle.to_degrees(),
        config.n_steps()
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in log.events() {
        println!(
            "  {:<16} t={:>6.2}s   alt={:>8.1}m   vel={:>7.1}m/s",
            e.kind.to_string().to_uppercase(),
            e.time,
            e.record.state.y,
            e.record.state.speed()
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Max altitude:  {:>8.1} m   at t={:.2} s",
        summary.apogee_m, summary.apogee_time
    );
    println!("  Max speed:     {:>8.1} m/s", summary.max_speed);
    println!("  Max |pitch|:   {:>8.2} deg", summary.max_abs_theta.to_degrees());
    println!("  Alt error RMS: {:>8.3} m", summary.rms_altitude_error);
    println!(
        "  Pitch err RMS: {:>8.4} deg",
        summary.rms_pitch_error.to_degrees()
    );
    println!("  Degraded:      {:>8} steps", summary.degraded_steps);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>9}  {:>8}  {:>8}  {:>6}",
        "t (s)", "alt (m)", "est (m)", "vel (m/s)", "θ (deg)", "δ (deg)", "phase"
    );
    println!("  {}", "─".repeat(66));

    let records = log.records();
    let sample_interval = (records.len() / 30).max(1);
    for (i, r) in records.iter().enumerate() {
        if i % sample_interval != 0 && i + 1 != records.len() {
            continue;
        }
        let phase = if r.thrust > 0.0 {
            "BURN"
        } else if r.state.vy > 0.0 {
            "COAST"
        } else {
            "DESC"
        };
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>9.1}  {:>8.3}  {:>8.3}  {:>6}",
            r.time,
            r.state.y,
            r.estimate.y,
            r.state.speed(),
            r.state.theta.to_degrees(),
            r.gimbal.to_degrees(),
            phase
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s, seed={}", log.len(), config.dt, config.seed);
    println!("====================================================================");
    println!();
}
