// ---------------------------------------------------------------------------
// PID Controller (single axis)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_limit: f64,
    pub output_min: f64,
    pub output_max: f64,
    integral: f64,
    prev_error: f64,
}

impl Pid {
    /// Unbounded output, integral clamped to `±integral_limit`.
    pub fn new(kp: f64, ki: f64, kd: f64, integral_limit: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        self.integral += error * dt;
        // Anti-windup: clamp integral to prevent saturation
        self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
        let derivative = if dt > 0.0 { (error - self.prev_error) / dt } else { 0.0 };
        self.prev_error = error;
        let out = self.kp * error + self.ki * self.integral + self.kd * derivative;
        out.clamp(self.output_min, self.output_max)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_proportional() {
        let mut pid = Pid::new(1.0, 0.0, 0.0, 1.0);
        let out = pid.update(0.5, 0.01);
        assert!((out - 0.5).abs() < 1e-10, "Pure P should output Kp * error");
    }

    #[test]
    fn pid_integral_accumulates() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, 1.0);
        pid.update(1.0, 0.1);
        let out = pid.update(1.0, 0.1);
        assert!((out - 0.2).abs() < 1e-10, "Integral should accumulate");
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut pid = Pid::new(0.0, 0.0, 2.0, 1.0);
        let first = pid.update(0.1, 0.01);
        assert!((first - 20.0).abs() < 1e-9, "Previous error starts at zero");
        let second = pid.update(0.1, 0.01);
        assert_eq!(second, 0.0);
    }

    #[test]
    fn zero_dt_has_no_derivative_kick() {
        let mut pid = Pid::new(0.0, 0.0, 5.0, 1.0);
        assert_eq!(pid.update(1.0, 0.0), 0.0);
    }

    #[test]
    fn integral_is_bounded() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, 0.3);
        for _ in 0..1000 {
            pid.update(10.0, 0.01);
        }
        assert_eq!(pid.integral(), 0.3);
        for _ in 0..1000 {
            pid.update(-10.0, 0.01);
        }
        assert_eq!(pid.integral(), -0.3);
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = Pid::new(100.0, 0.0, 0.0, 1.0).with_output_limits(-0.5, 0.25);
        assert_eq!(pid.update(1.0, 0.01), 0.25);
        assert_eq!(pid.update(-1.0, 0.01), -0.5);
    }

    #[test]
    fn reset_clears_memory() {
        let mut pid = Pid::new(0.0, 1.0, 1.0, 10.0);
        pid.update(1.0, 0.1);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        // No derivative kick from the stale error
        let out = pid.update(0.0, 0.1);
        assert_eq!(out, 0.0);
    }
}
