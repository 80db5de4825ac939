//! Text rendering of session state for the console.

use std::fmt::Write as _;

use snakebot_core::telemetry::speed_percent;
use snakebot_core::{RobotStatus, ThermalGrid};
use snakebot_logging::LogBuffer;
use snakebot_session::{ConnectionState, SessionSnapshot};

const RESET: &str = "\x1b[0m";

/// Connection badge: `Connected (host)` when connected, the state label
/// otherwise.
pub fn badge(snapshot: &SessionSnapshot) -> String {
    match (snapshot.state, &snapshot.target) {
        (ConnectionState::Connected, Some(target)) => format!("Connected ({})", target.host),
        (state, _) => state.label().to_string(),
    }
}

/// Presence indicator with the thermal summary underneath.
pub fn presence_panel(status: &RobotStatus) -> String {
    let headline = if status.presence {
        "PRESENCE DETECTED"
    } else {
        "No Presence"
    };
    format!(
        "{headline}\n  Hot pixels: {:.0}\n  Max: {:.1}°C  Ambient: {:.1}°C",
        status.hot_pixels, status.max_temp, status.ambient_temp
    )
}

/// Full `status` report.
pub fn status_report(snapshot: &SessionSnapshot, speed: u8) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", badge(snapshot));
    if let Some(target) = &snapshot.target {
        let _ = writeln!(out, "Target: {}", target.url());
    }
    let _ = writeln!(out, "Speed:  {speed} ({}%)", speed_percent(speed));
    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "Error:  {error}");
    }
    match &snapshot.last_status {
        Some(status) => {
            let _ = writeln!(
                out,
                "Motors: A={:.0} B={:.0}",
                status.motor_a, status.motor_b
            );
            out.push_str(&presence_panel(status));
        }
        None => out.push_str("No telemetry"),
    }
    out
}

/// Heat map of the latest thermal frame, or `No sensor data`.
pub fn heat_map(status: Option<&RobotStatus>) -> String {
    status
        .and_then(RobotStatus::thermal_grid)
        .map_or_else(|| "No sensor data".to_string(), |grid| render_grid(&grid))
}

fn render_grid(grid: &ThermalGrid) -> String {
    let colors = grid.colors();
    let cells = grid.pixels().iter().zip(&colors);
    let mut out = String::new();
    for (i, (temp, rgb)) in cells.enumerate() {
        let _ = write!(
            out,
            "\x1b[48;2;{};{};{}m\x1b[30m{temp:>3.0} {RESET}",
            rgb.0, rgb.1, rgb.2
        );
        if (i + 1) % snakebot_core::constants::GRID_SIZE == 0 {
            out.push('\n');
        }
    }
    let _ = write!(out, "{:.1}°C .. {:.1}°C", grid.min(), grid.max());
    out
}

/// The debug log, oldest first.
pub fn log_report(logs: &LogBuffer) -> String {
    if logs.is_empty() {
        return "No log entries".to_string();
    }
    logs.lines().join("\n")
}

/// Lines worth announcing when the session moves from `prev` to `next`.
pub fn transitions(prev: &SessionSnapshot, next: &SessionSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    if prev.state != next.state {
        lines.push(format!("* {}", badge(next)));
    }
    match &next.last_error {
        Some(error) if prev.last_error.as_ref() != Some(error) => {
            lines.push(format!("! {error}"));
        }
        _ => {}
    }
    lines
}

/// Command summary.
pub const HELP: &str = "\
Commands:
  connect [host] [port]   open a channel (defaults from settings)
  disconnect              close the channel
  w a s d                 drive forward / left / backward / right
  forward backward left right
  x | stop                stop the motors
  speed <n>               set speed (50-255, steps of 5)
  + | -                   speed up / slow down one step
  status                  connection and telemetry
  heat                    thermal heat map
  logs | clear            show / clear the debug log
  help | quit";

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use snakebot_session::Target;

    fn status(presence: bool, pixels: Option<Vec<f64>>) -> RobotStatus {
        RobotStatus {
            connected: true,
            motor_a: 150.0,
            motor_b: -150.0,
            presence,
            hot_pixels: 3.0,
            max_temp: 33.5,
            ambient_temp: 21.0,
            pixels,
        }
    }

    fn snapshot(state: ConnectionState) -> SessionSnapshot {
        SessionSnapshot {
            state,
            target: Some(Target::new("192.168.4.1", 81)),
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn badge_text() {
        assert_eq!(badge(&snapshot(ConnectionState::Connected)), "Connected (192.168.4.1)");
        assert_eq!(badge(&snapshot(ConnectionState::Connecting)), "Connecting...");
        assert_eq!(badge(&snapshot(ConnectionState::Error)), "Error");
        assert_eq!(badge(&SessionSnapshot::default()), "Disconnected");
    }

    #[test]
    fn presence_headline() {
        assert!(presence_panel(&status(true, None)).starts_with("PRESENCE DETECTED"));
        let panel = presence_panel(&status(false, None));
        assert!(panel.starts_with("No Presence"));
        assert!(panel.contains("Hot pixels: 3"));
        assert!(panel.contains("Max: 33.5°C"));
        assert!(panel.contains("Ambient: 21.0°C"));
    }

    #[test]
    fn heat_map_without_grid() {
        assert_eq!(heat_map(None), "No sensor data");
        assert_eq!(heat_map(Some(&status(false, None))), "No sensor data");
        assert_eq!(heat_map(Some(&status(false, Some(vec![20.0; 63])))), "No sensor data");
    }

    #[test]
    fn heat_map_draws_eight_rows() {
        let pixels: Vec<f64> = (0..64).map(f64::from).collect();
        let map = heat_map(Some(&status(false, Some(pixels))));
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0].matches(RESET).count(), 8);
        assert!(lines[0].starts_with("\x1b[48;2;0;0;255m\x1b[30m  0 "));
        assert!(lines[0].contains("  7 "));
        assert!(lines[1].contains("  8 "));
        assert!(lines[7].contains(" 63 "));
        assert_eq!(lines[8], "0.0°C .. 63.0°C");
    }

    #[test]
    fn heat_map_rounds_cell_temperatures() {
        let mut pixels = vec![21.4; 64];
        pixels[0] = 36.6;
        let map = heat_map(Some(&status(true, Some(pixels))));
        let first = map.lines().next().unwrap();
        assert!(first.contains(" 37 "));
        assert!(first.contains(" 21 "));
        assert!(!first.contains("36.6"));
    }

    #[test]
    fn status_report_without_telemetry() {
        let report = status_report(&snapshot(ConnectionState::Connecting), 200);
        assert!(report.contains("Status: Connecting..."));
        assert!(report.contains("Target: ws://192.168.4.1:81"));
        assert!(report.contains("Speed:  200 (78%)"));
        assert!(report.ends_with("No telemetry"));
    }

    #[test]
    fn status_report_with_telemetry() {
        let mut snap = snapshot(ConnectionState::Connected);
        snap.last_status = Some(status(true, None));
        snap.last_error = Some("Motor stalled".into());
        let report = status_report(&snap, 255);
        assert!(report.contains("Motors: A=150 B=-150"));
        assert!(report.contains("Error:  Motor stalled"));
        assert!(report.contains("PRESENCE DETECTED"));
    }

    #[test]
    fn transitions_report_state_and_new_errors() {
        let prev = snapshot(ConnectionState::Connecting);
        let mut next = snapshot(ConnectionState::Error);
        next.last_error = Some("Connection timeout".into());
        assert_eq!(
            transitions(&prev, &next),
            vec!["* Error".to_string(), "! Connection timeout".to_string()]
        );
        assert!(transitions(&next, &next).is_empty());

        let cleared = snapshot(ConnectionState::Error);
        assert!(transitions(&next, &cleared).is_empty());
    }

    #[test]
    fn empty_log_report() {
        assert_eq!(log_report(&LogBuffer::default()), "No log entries");
    }
}
