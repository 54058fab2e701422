//! Trace replay and reporting

use chrono::Local;
use colored::Colorize;
use hdmi_tx_link::{ConnectionDepth, LinkState};
use log::debug;

use super::file::Trace;
use crate::supervisor::{StepRecord, Supervisor};

/// Replay output options
#[derive(Debug, Clone, Copy)]
pub struct ReplayConfig {
    /// Prefix every step line with wall-clock time
    pub show_timestamps: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
        }
    }
}

/// Outcome of replaying one trace
#[derive(Debug)]
pub struct ReplayReport {
    pub name: String,
    pub records: Vec<StepRecord>,
    pub final_state: LinkState,
    pub ignored_events: u32,
    /// Connection depth still remembered for a later resume
    pub standby_depth: Option<ConnectionDepth>,
    /// Expectation mismatches, in the order they were found
    pub failures: Vec<String>,
}

impl ReplayReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Print the step log and verdict
    pub fn print(&self, config: &ReplayConfig) {
        println!("{}", "=".repeat(70));
        println!("{}", format!("Trace: {}", self.name).cyan().bold());
        println!("{}", "=".repeat(70));

        for record in &self.records {
            let mut line = String::new();
            if config.show_timestamps {
                let timestamp = Local::now().format("%H:%M:%S%.3f");
                line.push_str(&format!("{} ", timestamp.to_string().dimmed()));
            }
            line.push_str(&format_record(record));
            println!("{}", line);
        }

        println!("\n{}", "Result:".white().bold());
        println!("  Final state:    {}", self.final_state.to_string().cyan());
        println!("  Ignored events: {}", self.ignored_events);
        let unresolved = self.records.iter().filter(|r| r.is_unresolved()).count();
        if unresolved > 0 {
            println!("  Unresolved resumes: {}", unresolved);
        }
        if let Some(depth) = self.standby_depth {
            println!("  Resumes to:     {:?}", depth);
        }

        if self.passed() {
            println!("\n{}", "[OK] All expectations met".green().bold());
        } else {
            println!();
            for failure in &self.failures {
                println!("  {} {}", "[FAIL]".red().bold(), failure);
            }
        }
        println!("{}", "=".repeat(70));
    }
}

fn format_record(record: &StepRecord) -> String {
    let index = format!("#{:<3}", record.index + 1);
    match record.delivered {
        None => format!(
            "{} {:<20} {}",
            index,
            record.stimulus.to_string().yellow(),
            "unresolved (no standby depth)".yellow()
        ),
        Some(event) => {
            let shown = if record.stimulus.to_string() == event.to_string() {
                event.to_string()
            } else {
                format!("{} ({})", record.stimulus, event)
            };
            if record.accepted {
                format!(
                    "{} {:<20} {} -> {}",
                    index,
                    shown.white(),
                    record.from,
                    record.to.to_string().green()
                )
            } else {
                format!(
                    "{} {:<20} {} {}",
                    index,
                    shown.yellow(),
                    record.from,
                    format!("[ignored #{}]", record.ignored_events).yellow()
                )
            }
        }
    }
}

/// Run a trace through a fresh supervisor and check its expectations
pub fn replay(trace: &Trace) -> ReplayReport {
    let mut supervisor = Supervisor::new();
    let records = supervisor.run(trace.stimuli());
    let mut failures = Vec::new();

    for (record, step) in records.iter().zip(&trace.steps) {
        if let Some(expected) = step.expect {
            if record.to != expected {
                failures.push(format!(
                    "step {} ({}): expected {}, got {}",
                    record.index + 1,
                    step.stimulus,
                    expected,
                    record.to
                ));
            }
        }
    }
    debug!("{}: {} steps delivered", trace.name, supervisor.steps());

    let final_state = supervisor.state();
    let ignored_events = supervisor.context().ignored_events();

    if let Some(expected) = trace.expect.state {
        if final_state != expected {
            failures.push(format!(
                "final state: expected {}, got {}",
                expected, final_state
            ));
        }
    }
    if let Some(expected) = trace.expect.ignored {
        if ignored_events != expected {
            failures.push(format!(
                "ignored events: expected {}, got {}",
                expected, ignored_events
            ));
        }
    }

    ReplayReport {
        name: trace.name.clone(),
        records,
        final_state,
        ignored_events,
        standby_depth: supervisor.memory().depth(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_meets_expectations() {
        let trace = Trace::parse(
            r#"
name = "early-sink-on"
[[steps]]
event = "PluggedIn"
expect = "AwaitEdid"
[[steps]]
event = "SinkOn"
expect = "AwaitEdid"
[expect]
state = "AwaitEdid"
ignored = 1
"#,
        )
        .unwrap();

        let report = replay(&trace);
        assert!(report.passed(), "{:?}", report.failures);
        assert_eq!(report.records.len(), 2);
        assert!(!report.records[1].accepted);
        assert_eq!(report.ignored_events, 1);
    }

    #[test]
    fn test_replay_reports_mismatches() {
        let trace = Trace::parse(
            r#"
name = "wrong"
[[steps]]
event = "PluggedIn"
expect = "AwaitRxSense"
[[steps]]
event = "HdcpRun"
[expect]
state = "HdcpWaitRx"
ignored = 0
"#,
        )
        .unwrap();

        let report = replay(&trace);
        assert!(!report.passed());
        assert_eq!(report.failures.len(), 3);
        assert_eq!(
            report.failures[0],
            "step 1 (PluggedIn): expected AwaitRxSense, got AwaitEdid"
        );
        assert_eq!(report.final_state, LinkState::AwaitEdid);
    }

    #[test]
    fn test_replay_resolves_resume() {
        let trace = Trace::parse(
            r#"
name = "standby"
[[steps]]
event = "PluggedIn"
[[steps]]
event = "Standby"
[[steps]]
event = "Resume"
expect = "AwaitEdid"
"#,
        )
        .unwrap();

        let report = replay(&trace);
        assert!(report.passed());
        assert_eq!(
            report.records[2].delivered,
            Some(hdmi_tx_link::LinkEvent::ResumeToAwaitEdid)
        );
        assert!(format_record(&report.records[2]).contains("ResumeToAwaitEdid"));
        assert_eq!(report.standby_depth, None);
    }
}
