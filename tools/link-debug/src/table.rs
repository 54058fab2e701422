//! Transition table rendering

use colored::Colorize;
use hdmi_tx_link::{transition, LinkEvent, LinkState, Transition};

/// Defined transitions leaving `state`, in event declaration order
pub fn row(state: LinkState) -> Vec<Transition> {
    LinkEvent::ALL
        .into_iter()
        .map(|event| transition(state, event))
        .filter(|t| t.accepted)
        .collect()
}

fn print_row(state: LinkState) {
    println!(
        "\n  {} {}",
        state.to_string().white().bold(),
        format!("({:?})", state.phase()).dimmed()
    );
    for t in row(state) {
        let target = if t.is_state_change() {
            t.to.to_string().green()
        } else {
            format!("{} (retry)", t.to).yellow()
        };
        println!("    {:<22} -> {}", t.event.to_string(), target);
    }
}

/// Print the whole table, or one state's row
pub fn print_table(state: Option<LinkState>) {
    println!("{}", "=".repeat(60));
    println!("{}", "Link/HDCP Transition Table".cyan().bold());
    println!("{}", "=".repeat(60));

    match state {
        Some(state) => print_row(state),
        None => {
            for state in LinkState::ALL {
                print_row(state);
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Any other event is ignored and counted.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_order_and_content() {
        let events: Vec<LinkEvent> = row(LinkState::VideoNoHdcp)
            .into_iter()
            .map(|t| t.event)
            .collect();
        assert_eq!(
            events,
            vec![
                LinkEvent::Unplugged,
                LinkEvent::Deinit,
                LinkEvent::SinkOff,
                LinkEvent::OutDisable,
                LinkEvent::HdcpRun,
                LinkEvent::Standby,
            ]
        );
    }

    #[test]
    fn test_rows_sum_to_table() {
        let total: usize = LinkState::ALL.into_iter().map(|s| row(s).len()).sum();
        assert_eq!(total, 57);
    }
}
