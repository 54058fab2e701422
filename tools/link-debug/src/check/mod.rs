//! Transition table validation
//!
//! Walks the whole (state, event) cross product and checks the properties
//! the surrounding driver depends on.

use std::collections::{HashSet, VecDeque};

use colored::Colorize;
use hdmi_tx_link::{transition, DeviceContext, LinkEvent, LinkState, EVENT_COUNT, STATE_COUNT};

/// Table validation result
#[derive(Debug)]
pub struct ValidationResult {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
    pub critical_failures: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationResult {
    /// Sort finished checks into failures, warnings and informational notes
    pub fn from_checks(checks: Vec<ValidationCheck>) -> Self {
        let failed = |severity: CheckSeverity| -> Vec<String> {
            checks
                .iter()
                .filter(|c| !c.passed && c.severity == severity)
                .map(|c| c.message.clone())
                .collect()
        };
        let critical_failures = failed(CheckSeverity::Critical);
        let warnings = failed(CheckSeverity::Warning);

        let info: Vec<String> = checks
            .iter()
            .filter(|c| c.severity == CheckSeverity::Info)
            .map(|c| c.message.clone())
            .collect();

        Self {
            passed: critical_failures.is_empty(),
            checks,
            critical_failures,
            warnings,
            info,
        }
    }
}

/// Individual validation check
#[derive(Debug)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub severity: CheckSeverity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckSeverity {
    Critical,
    Warning,
    Info,
}

/// Validator for the link transition table
#[derive(Default)]
pub struct TableValidator {
    checks: Vec<ValidationCheck>,
}

impl TableValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all validation checks
    pub fn validate(&mut self) -> ValidationResult {
        self.check_totality();
        self.check_ignored_counting();
        self.check_deinit();
        self.check_active_escapes();
        self.check_standby_amnesia();
        self.check_hdcp_retry();
        self.check_reachability();
        self.check_no_terminal_state();
        self.summarize();

        ValidationResult::from_checks(std::mem::take(&mut self.checks))
    }

    fn push(&mut self, name: &str, failures: Vec<String>, ok_message: &str) {
        self.push_with(name, failures, ok_message, CheckSeverity::Critical);
    }

    fn push_with(
        &mut self,
        name: &str,
        failures: Vec<String>,
        ok_message: &str,
        severity: CheckSeverity,
    ) {
        let passed = failures.is_empty();
        self.checks.push(ValidationCheck {
            name: name.to_string(),
            passed,
            message: if passed {
                ok_message.to_string()
            } else {
                format!("{}: {}", name, failures.join("; "))
            },
            severity,
        });
    }

    /// Every pair yields a transition whose bookkeeping is consistent
    fn check_totality(&mut self) {
        let mut failures = Vec::new();
        for state in LinkState::ALL {
            for event in LinkEvent::ALL {
                let t = transition(state, event);
                if t.from != state || t.event != event {
                    failures.push(format!("{} x {} reports the wrong pair", state, event));
                }
                if !t.accepted && t.to != state {
                    failures.push(format!("{} x {} ignored but moved to {}", state, event, t.to));
                }
            }
        }
        self.push(
            "Totality",
            failures,
            &format!(
                "All {} (state, event) pairs have a defined outcome",
                STATE_COUNT * EVENT_COUNT
            ),
        );
    }

    /// An ignored event bumps the counter by exactly one and nothing else
    fn check_ignored_counting(&mut self) {
        let mut failures = Vec::new();
        let mut ctx = DeviceContext::new();
        for state in LinkState::ALL {
            for event in LinkEvent::ALL {
                if transition(state, event).accepted {
                    continue;
                }
                // Drive a fresh context into `state` first
                ctx.reset();
                if !drive_to(&mut ctx, state) {
                    failures.push(format!("cannot reach {}", state));
                    continue;
                }
                let before = ctx.ignored_events();
                ctx.apply(event);
                if ctx.state() != state || ctx.ignored_events() != before + 1 {
                    failures.push(format!("{} x {} not counted exactly once", state, event));
                }
            }
        }
        self.push(
            "Ignored-event counting",
            failures,
            "Undefined pairs leave the state alone and count once",
        );
    }

    fn check_deinit(&mut self) {
        let failures = LinkState::ALL
            .into_iter()
            .filter(|s| *s != LinkState::Uninitialized)
            .filter(|s| {
                let t = transition(*s, LinkEvent::Deinit);
                !t.accepted || t.to != LinkState::Uninitialized
            })
            .map(|s| format!("Deinit does not reset {}", s))
            .collect();
        self.push(
            "Deinit escape",
            failures,
            "Deinit returns every initialized state to Uninitialized",
        );
    }

    fn check_active_escapes(&mut self) {
        let mut failures = Vec::new();
        for state in LinkState::ALL.into_iter().filter(|s| s.is_active()) {
            let standby = transition(state, LinkEvent::Standby);
            if !standby.accepted || standby.to != LinkState::Standby {
                failures.push(format!("Standby not reachable from {}", state));
            }
            let unplug = transition(state, LinkEvent::Unplugged);
            if unplug.to != LinkState::Disconnected {
                failures.push(format!("Unplugged does not disconnect {}", state));
            }
        }
        self.push(
            "Unplug/standby escape",
            failures,
            "Unplugged and Standby are valid from every active state",
        );
    }

    fn check_standby_amnesia(&mut self) {
        let failures = LinkEvent::ALL
            .into_iter()
            .filter(|e| !e.is_resume() && *e != LinkEvent::Deinit)
            .filter(|e| transition(LinkState::Standby, *e).is_state_change())
            .map(|e| format!("{} leaves Standby", e))
            .collect();
        self.push(
            "Standby amnesia",
            failures,
            "Only Deinit and the resume events leave Standby",
        );
    }

    fn check_hdcp_retry(&mut self) {
        let mut failures = Vec::new();
        for event in [LinkEvent::HdcpBksvInsecure, LinkEvent::HdcpTimeout0] {
            let t = transition(LinkState::HdcpWaitRx, event);
            if !t.accepted || t.to != LinkState::HdcpWaitRx {
                failures.push(format!("{} does not loop in HdcpWaitRx", event));
            }
        }
        self.push(
            "HDCP retry",
            failures,
            "Insecure BKSV and T0 timeout retry from HdcpWaitRx",
        );
    }

    fn check_reachability(&mut self) {
        let reached = reachable_from(LinkState::Uninitialized);
        let failures = LinkState::ALL
            .into_iter()
            .filter(|s| !reached.contains(s))
            .map(|s| format!("{} unreachable", s))
            .collect();
        self.push(
            "Reachability",
            failures,
            "Every state is reachable from Uninitialized",
        );
    }

    fn check_no_terminal_state(&mut self) {
        let failures = LinkState::ALL
            .into_iter()
            .filter(|s| {
                !LinkEvent::ALL
                    .into_iter()
                    .any(|e| transition(*s, e).is_state_change())
            })
            .map(|s| format!("{} has no way out", s))
            .collect();
        // A dead end strands the link but breaks no table property
        self.push_with(
            "No terminal state",
            failures,
            "Every state has at least one outgoing transition",
            CheckSeverity::Warning,
        );
    }

    fn summarize(&mut self) {
        let accepted = LinkState::ALL
            .into_iter()
            .flat_map(|s| LinkEvent::ALL.into_iter().map(move |e| transition(s, e)))
            .filter(|t| t.accepted)
            .count();
        self.checks.push(ValidationCheck {
            name: "Table size".to_string(),
            passed: true,
            message: format!(
                "{} defined transitions over {} states and {} events",
                accepted, STATE_COUNT, EVENT_COUNT
            ),
            severity: CheckSeverity::Info,
        });
    }

    /// Print validation report
    pub fn print_report(result: &ValidationResult) {
        println!("{}", "=".repeat(70));
        println!("{}", "Transition Table Validation".cyan().bold());
        println!("{}", "=".repeat(70));

        for check in &result.checks {
            let status = if check.passed {
                "[PASS]".green()
            } else {
                match check.severity {
                    CheckSeverity::Critical => "[FAIL]".red(),
                    CheckSeverity::Warning => "[WARN]".yellow(),
                    CheckSeverity::Info => "[INFO]".blue(),
                }
            };
            println!("  {} {}", status, check.name.white().bold());
            println!("      {}", check.message.dimmed());
        }

        if !result.critical_failures.is_empty() {
            println!("\n{}", "Critical Failures:".red().bold());
            for failure in &result.critical_failures {
                println!("  {} {}", "x".red(), failure);
            }
        }

        if !result.warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for warning in &result.warnings {
                println!("  {} {}", "!".yellow(), warning);
            }
        }

        if !result.info.is_empty() {
            println!("\n{}", "Notes:".white().bold());
            for note in &result.info {
                println!("  {}", note);
            }
        }

        println!();
        if result.passed {
            println!("{}", "[OK] Transition table is sound".green().bold());
        } else {
            println!(
                "{} {} critical failure(s)",
                "[ERROR]".red().bold(),
                result.critical_failures.len()
            );
        }
        println!("{}", "=".repeat(70));
    }
}

/// States reachable from `start` through accepted transitions
pub fn reachable_from(start: LinkState) -> HashSet<LinkState> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(state) = queue.pop_front() {
        for event in LinkEvent::ALL {
            let t = transition(state, event);
            if t.accepted && seen.insert(t.to) {
                queue.push_back(t.to);
            }
        }
    }
    seen
}

/// Shortest event path from `from` to `to`, if any
pub fn path_between(from: LinkState, to: LinkState) -> Option<Vec<LinkEvent>> {
    let mut prev: Vec<Option<(LinkState, LinkEvent)>> = vec![None; STATE_COUNT];
    let mut seen = [false; STATE_COUNT];
    let mut queue = VecDeque::new();
    seen[from.code() as usize] = true;
    queue.push_back(from);

    while let Some(state) = queue.pop_front() {
        if state == to {
            let mut path = Vec::new();
            let mut cursor = to;
            while let Some((p, e)) = prev[cursor.code() as usize] {
                path.push(e);
                cursor = p;
            }
            path.reverse();
            return Some(path);
        }
        for event in LinkEvent::ALL {
            let t = transition(state, event);
            let idx = t.to.code() as usize;
            if t.accepted && !seen[idx] {
                seen[idx] = true;
                prev[idx] = Some((state, event));
                queue.push_back(t.to);
            }
        }
    }
    None
}

/// Drive a context from its current state to `target` along the shortest path
fn drive_to(ctx: &mut DeviceContext, target: LinkState) -> bool {
    match path_between(ctx.state(), target) {
        Some(path) => {
            for event in path {
                ctx.apply(event);
            }
            ctx.state() == target
        }
        None => false,
    }
}
