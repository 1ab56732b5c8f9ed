use std::io::{self, Write};
use std::path::Path;

use crate::config::SimulationConfig;
use crate::sim::{EventKind, FlightLog, FlightRecord};

/// Summary statistics computed from a flight log.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub steps: usize,
    pub flight_time: f64,
    pub apogee_m: f64,
    pub apogee_time: f64,
    pub max_speed: f64,
    pub max_abs_theta: f64,
    pub burnout_time: Option<f64>,
    pub burnout_altitude: Option<f64>,
    pub burnout_speed: Option<f64>,
    pub rms_altitude_error: f64,
    pub rms_pitch_error: f64,
    pub degraded_steps: usize,
}

fn rms(records: &[FlightRecord], f: impl Fn(&FlightRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    (records.iter().map(|r| f(r).powi(2)).sum::<f64>() / records.len() as f64).sqrt()
}

impl FlightSummary {
    /// Compute summary from a flight log. An empty log yields all zeros.
    pub fn from_log(log: &FlightLog) -> Self {
        let records = log.records();

        let (apogee_m, apogee_time) = records
            .iter()
            .max_by(|a, b| a.state.y.total_cmp(&b.state.y))
            .map_or((0.0, 0.0), |r| (r.state.y, r.time));

        let max_speed = records
            .iter()
            .map(|r| r.state.speed())
            .fold(0.0_f64, f64::max);

        let max_abs_theta = records
            .iter()
            .map(|r| r.state.theta.abs())
            .fold(0.0_f64, f64::max);

        let burnout = log
            .events()
            .iter()
            .find(|e| e.kind == EventKind::Burnout)
            .map(|e| e.record);

        FlightSummary {
            steps: records.len(),
            flight_time: log.last().map_or(0.0, |r| r.time),
            apogee_m,
            apogee_time,
            max_speed,
            max_abs_theta,
            burnout_time: burnout.map(|r| r.time),
            burnout_altitude: burnout.map(|r| r.state.y),
            burnout_speed: burnout.map(|r| r.state.speed()),
            rms_altitude_error: rms(records, FlightRecord::altitude_error),
            rms_pitch_error: rms(records, FlightRecord::pitch_error),
            degraded_steps: log.degraded_steps(),
        }
    }
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "null".to_string(), |x| format!("{x:.3}"))
}

/// Write flight summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    config: &SimulationConfig,
    summary: &FlightSummary,
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"config\": {{")?;
    writeln!(writer, "    \"dt_s\": {},", config.dt)?;
    writeln!(writer, "    \"t_end_s\": {},", config.t_end)?;
    writeln!(writer, "    \"t_burn_s\": {},", config.t_burn)?;
    writeln!(writer, "    \"seed\": {},", config.seed)?;
    writeln!(writer, "    \"total_mass_kg\": {:.3},", config.rocket.total_mass())?;
    writeln!(writer, "    \"max_thrust_n\": {:.1},", config.rocket.max_thrust)?;
    writeln!(writer, "    \"twr\": {:.3}", config.rocket.twr(config.environment.gravity))?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"performance\": {{")?;
    writeln!(writer, "    \"steps\": {},", summary.steps)?;
    writeln!(writer, "    \"flight_time_s\": {:.2},", summary.flight_time)?;
    writeln!(writer, "    \"apogee_m\": {:.2},", summary.apogee_m)?;
    writeln!(writer, "    \"apogee_time_s\": {:.2},", summary.apogee_time)?;
    writeln!(writer, "    \"max_speed_ms\": {:.2},", summary.max_speed)?;
    writeln!(writer, "    \"max_abs_theta_rad\": {:.5},", summary.max_abs_theta)?;
    writeln!(writer, "    \"burnout_time_s\": {},", opt(summary.burnout_time))?;
    writeln!(writer, "    \"burnout_altitude_m\": {},", opt(summary.burnout_altitude))?;
    writeln!(writer, "    \"burnout_speed_ms\": {}", opt(summary.burnout_speed))?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"estimation\": {{")?;
    writeln!(writer, "    \"rms_altitude_error_m\": {:.4},", summary.rms_altitude_error)?;
    writeln!(writer, "    \"rms_pitch_error_rad\": {:.6},", summary.rms_pitch_error)?;
    writeln!(writer, "    \"degraded_steps\": {}", summary.degraded_steps)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    config: &SimulationConfig,
    summary: &FlightSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, config, summary)
}
