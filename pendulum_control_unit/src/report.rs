//! Human-readable console output: startup banner, in-place progress line,
//! limit warning and the end-of-run summary block.
//!
//! Diagnostics go through `tracing` (stderr); this is the operator view on
//! stdout.

use pendulum_common::config::PendulumConfig;
use pendulum_common::motion::Direction;
use std::io::{self, Write};

use crate::physics::PendulumLoad;
use crate::profile::TrapezoidalProfile;
use crate::telemetry::RunSummary;

const RULE_WIDTH: usize = 60;

/// Console writer.
pub struct Console {
    out: Box<dyn Write>,
    progress: bool,
    /// Last 0.1 s bucket a progress line was printed for.
    last_bucket: Option<u64>,
    /// A progress line is on screen without a trailing newline.
    line_open: bool,
}

impl Console {
    /// Console on stdout.
    pub fn stdout(progress: bool) -> Self {
        Self::new(Box::new(io::stdout()), progress)
    }

    /// Console discarding everything.
    pub fn silent() -> Self {
        Self::new(Box::new(io::sink()), false)
    }

    /// Console on an arbitrary writer.
    pub fn new(out: Box<dyn Write>, progress: bool) -> Self {
        Self {
            out,
            progress,
            last_bucket: None,
            line_open: false,
        }
    }

    /// System parameters, profile shape and run instructions.
    pub fn banner(&mut self, config: &PendulumConfig) -> io::Result<()> {
        let p = &config.pendulum;
        let m = &config.motion;
        let peak = PendulumLoad::from_params(p).peak_torque();
        let phases = TrapezoidalProfile::from_params(m).phases(m.segment_duration);
        writeln!(self.out, "Pendulum Controller Initialized")?;
        writeln!(self.out, "System Parameters:")?;
        writeln!(self.out, "  Mass: {} kg", p.mass)?;
        writeln!(self.out, "  Length: {} m", p.length)?;
        writeln!(self.out, "  Motor Torque: {} N⋅m", p.motor_torque)?;
        writeln!(self.out, "  Gearbox Ratio: {}:1", p.gearbox_ratio)?;
        writeln!(self.out, "  Range: {}° to {}°", m.min_angle, m.max_angle)?;
        writeln!(self.out, "  Peak Load Torque: {peak:.3} N⋅m")?;
        if phases.is_triangular() {
            writeln!(
                self.out,
                "  Profile: triangular ({:.2} s accel / {:.2} s decel, no cruise)\n",
                phases.accel_time, phases.decel_time
            )?;
        } else {
            writeln!(
                self.out,
                "  Profile: trapezoidal ({:.2} s accel / {:.2} s cruise / {:.2} s decel)\n",
                phases.accel_time, phases.const_time, phases.decel_time
            )?;
        }
        writeln!(self.out, "Starting continuous cycling test (no stops)...")?;
        writeln!(
            self.out,
            "Continuous {}° ↔ {}° motion, {} s per segment",
            m.min_angle, m.max_angle, m.segment_duration
        )?;
        writeln!(self.out, "Press Ctrl+C to stop safely\n")?;
        self.out.flush()
    }

    /// Overwrite the progress line if `elapsed_s` entered a new 0.1 s bucket.
    pub fn progress(
        &mut self,
        elapsed_s: f64,
        cycle: u32,
        position: f64,
        direction: Direction,
        torque: f64,
    ) -> io::Result<()> {
        if !self.progress {
            return Ok(());
        }
        let bucket = (elapsed_s * 10.0) as u64;
        if self.last_bucket == Some(bucket) {
            return Ok(());
        }
        self.last_bucket = Some(bucket);

        let arrow = match direction {
            Direction::Up => "↑ Up  ",
            Direction::Down => "↓ Down",
        };
        write!(
            self.out,
            "\rCycle {} | Position: {:.1}° | {} | Torque: {:.2} N⋅m",
            cycle + 1,
            position,
            arrow,
            torque
        )?;
        self.line_open = true;
        self.out.flush()
    }

    /// Terminate the progress line so the next output starts on a fresh line.
    pub fn end_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    /// Limit advisory at a direction reversal.
    pub fn limit_warning(&mut self, position: f64) -> io::Result<()> {
        self.end_line()?;
        writeln!(self.out, "Warning: Position limit reached! ({position:.3}°)")?;
        self.out.flush()
    }

    /// Announce the final move to the safe position.
    pub fn shutting_down(&mut self, safe_angle: f64) -> io::Result<()> {
        self.end_line()?;
        writeln!(
            self.out,
            "\nTest completed. Moving to safe position ({safe_angle}°)..."
        )?;
        self.out.flush()
    }

    /// Framed end-of-run summary.
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        self.end_line()?;
        writeln!(self.out, "\n{rule}")?;
        writeln!(self.out, "TEST SUMMARY")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "Total Cycles Completed: {}", summary.cycles_completed)?;
        writeln!(self.out, "Total Data Points: {}", summary.data_points)?;
        writeln!(self.out, "Final Position: {:.3}°", summary.final_position)?;
        if let Some(total) = summary.total_time {
            writeln!(self.out, "Total Test Time: {total:.1} seconds")?;
            writeln!(
                self.out,
                "Maximum Load Torque: {:.3} N⋅m",
                summary.max_load_torque
            )?;
            writeln!(
                self.out,
                "Average Load Torque: {:.3} N⋅m",
                summary.avg_load_torque
            )?;
        }
        if let Some(path) = &summary.log_path {
            writeln!(self.out, "Log file saved to: {}", path.display())?;
        }
        writeln!(self.out, "{rule}")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer that keeps its bytes reachable after being boxed.
    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_progress_once_per_bucket() {
        let cap = Capture::default();
        let mut console = Console::new(Box::new(cap.clone()), true);

        console.progress(0.00, 0, 0.0, Direction::Up, 0.0).unwrap();
        console.progress(0.05, 0, 0.1, Direction::Up, 0.0).unwrap();
        console.progress(0.10, 0, 0.3, Direction::Up, 0.0).unwrap();

        let out = cap.text();
        assert_eq!(out.matches('\r').count(), 2);
        assert!(out.contains("Cycle 1 | Position: 0.3° | ↑ Up"));
    }

    #[test]
    fn test_progress_disabled() {
        let cap = Capture::default();
        let mut console = Console::new(Box::new(cap.clone()), false);
        console.progress(1.0, 3, 45.0, Direction::Down, 4.1).unwrap();
        console.end_line().unwrap();
        assert!(cap.text().is_empty());
    }

    #[test]
    fn test_banner_reports_load_and_profile() {
        let cap = Capture::default();
        let mut console = Console::new(Box::new(cap.clone()), false);
        console.banner(&PendulumConfig::default()).unwrap();

        let out = cap.text();
        assert!(out.contains("Mass: 2 kg"));
        assert!(out.contains("Peak Load Torque: 5.886 N⋅m"));
        assert!(out.contains("Profile: trapezoidal (0.50 s accel / 2.00 s cruise / 0.50 s decel)"));

        let cap = Capture::default();
        let mut console = Console::new(Box::new(cap.clone()), false);
        let mut config = PendulumConfig::default();
        config.motion.segment_duration = 0.8;
        console.banner(&config).unwrap();
        assert!(cap.text().contains("Profile: triangular (0.40 s accel / 0.40 s decel, no cruise)"));
    }

    #[test]
    fn test_summary_block() {
        let cap = Capture::default();
        let mut console = Console::new(Box::new(cap.clone()), false);
        console
            .summary(&RunSummary {
                cycles_completed: 2,
                data_points: 1205,
                final_position: 0.3,
                total_time: Some(12.04),
                max_load_torque: 5.886,
                avg_load_torque: 3.5,
                log_path: Some("run.csv".into()),
            })
            .unwrap();

        let out = cap.text();
        assert!(out.contains("TEST SUMMARY"));
        assert!(out.contains("Total Cycles Completed: 2"));
        assert!(out.contains("Total Data Points: 1205"));
        assert!(out.contains("Total Test Time: 12.0 seconds"));
        assert!(out.contains("Maximum Load Torque: 5.886 N⋅m"));
        assert!(out.contains("Log file saved to: run.csv"));
        assert_eq!(out.matches(&"=".repeat(RULE_WIDTH)).count(), 3);
    }
}
