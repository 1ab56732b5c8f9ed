use std::io::{self, Write};
use std::path::Path;

use crate::sim::FlightRecord;

/// Write flight records to CSV format.
///
/// Columns: time, x, y, vx, vy, theta, omega, mass, thrust, gimbal,
///          accel, gyro, altimeter, gps_x, gps_y, gps_vx, gps_vy,
///          est_x, est_y, est_vx, est_vy, est_theta, est_omega, degraded
pub fn write_records<W: Write>(writer: &mut W, records: &[FlightRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "time,x,y,vx,vy,theta,omega,mass,thrust,gimbal,\
         accel,gyro,altimeter,gps_x,gps_y,gps_vx,gps_vy,\
         est_x,est_y,est_vx,est_vy,est_theta,est_omega,degraded"
    )?;

    for r in records {
        let s = &r.state;
        let e = &r.estimate;
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.6},{:.6},{:.4},{:.2},{:.6},\
             {:.4},{:.6},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.4},{:.4},{:.4},{:.4},{:.6},{:.6},{}",
            r.time,
            s.x, s.y, s.vx, s.vy, s.theta, s.omega, s.mass,
            r.thrust, r.gimbal,
            r.accel, r.gyro, r.altimeter,
            r.gps_x, r.gps_y, r.gps_vx, r.gps_vy,
            e.x, e.y, e.vx, e.vy, e.theta, e.omega,
            u8::from(r.degraded),
        )?;
    }

    Ok(())
}

/// Write flight records to a CSV file at the given path.
pub fn write_records_file(path: impl AsRef<Path>, records: &[FlightRecord]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_records(&mut file, records)?;
    file.flush()
}
