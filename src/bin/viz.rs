use eframe::egui;
use egui_plot::{Legend, Line, Plot};

use rocket_sim::config::{InitialConditions, SimulationConfig};
use rocket_sim::sim::{self, FlightRecord};

fn main() -> eframe::Result {
    let config = SimulationConfig {
        initial: InitialConditions { theta: 0.1, ..InitialConditions::default() },
        ..SimulationConfig::default()
    };
    let log = match sim::simulate(&config) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let app = SimViz { records: log.records().to_vec(), config };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Rocket Flight Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    records: Vec<FlightRecord>,
    config: SimulationConfig,
}

fn series(records: &[&FlightRecord], f: impl Fn(&FlightRecord) -> [f64; 2]) -> Vec<[f64; 2]> {
    records.iter().map(|r| f(r)).collect()
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.records.len() / 2000).max(1);
        let sampled: Vec<&FlightRecord> = self.records.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Closed-loop flight: truth vs. estimate");
            let apogee = self.records.iter().map(|r| r.state.y).fold(0.0_f64, f64::max);
            let max_v = self.records.iter().map(|r| r.state.speed()).fold(0.0_f64, f64::max);
            ui.label(format!(
                "Apogee: {:.1} m  |  Max speed: {:.1} m/s  |  TWR: {:.2}  |  Burn: {:.0} s  |  Flight: {:.0} s",
                apogee,
                max_v,
                self.config.rocket.twr(self.config.environment.gravity),
                self.config.t_burn,
                self.records.last().map_or(0.0, |r| r.time),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Altitude vs Time
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    let truth = series(&sampled, |r| [r.time, r.state.y]);
                    let est = series(&sampled, |r| [r.time, r.estimate.y]);
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("True", truth));
                            plot_ui.line(Line::new("EKF", est));
                        });
                });

                // Pitch vs Time
                ui.vertical(|ui| {
                    ui.label("Pitch Angle (deg)");
                    let truth = series(&sampled, |r| [r.time, r.state.theta.to_degrees()]);
                    let est = series(&sampled, |r| [r.time, r.estimate.theta.to_degrees()]);
                    Plot::new("pitch")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("True", truth));
                            plot_ui.line(Line::new("EKF", est));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Gimbal vs Time
                ui.vertical(|ui| {
                    ui.label("Gimbal Angle (deg)");
                    let points = series(&sampled, |r| [r.time, r.gimbal.to_degrees()]);
                    Plot::new("gimbal")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Gimbal", points));
                        });
                });

                // Altitude vs Downrange
                ui.vertical(|ui| {
                    ui.label("Trajectory Profile (m)");
                    let points = series(&sampled, |r| [r.state.x, r.state.y]);
                    Plot::new("profile")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Downrange (m)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Trajectory", points));
                        });
                });
            });
        });
    }
}
