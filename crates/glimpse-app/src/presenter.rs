use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use glimpse_types::{HostEvent, NotifyStyle, SessionOutcome, SessionReport};

/// Renders session results on the terminal.
///
/// This is the reference host surface. A GUI host would consume the same
/// event stream and draw toasts or panels itself.
pub async fn presenter_loop(
    events: AsyncReceiver<HostEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                info!("presenter stopping");
                return Ok(());
            }
            event = events.recv() => event?,
        };

        match event {
            HostEvent::SessionStarted { id, source } => {
                debug!(id = %id, source = ?source, "session started");
            }
            HostEvent::PhaseChanged { id, phase } => {
                debug!(id = %id, phase = ?phase, "session phase changed");
            }
            HostEvent::SessionFinished(report) => present(&report),
        }
    }
}

fn present(report: &SessionReport) {
    match report.notify {
        NotifyStyle::Silent => {
            debug!(
                id = %report.id,
                template = %report.template,
                elapsed_ms = report.elapsed_ms,
                "session finished"
            );
        }
        NotifyStyle::Toast => match &report.outcome {
            SessionOutcome::Completed { answer, .. } => {
                println!("[{}] {}", report.template, first_line(answer));
            }
            SessionOutcome::Failed { error } => {
                println!("[{}] failed: {}", report.template, error);
            }
        },
        NotifyStyle::Panel => {
            println!("=== {} ({} ms) ===", report.template, report.elapsed_ms);
            match &report.outcome {
                SessionOutcome::Completed { answer, reasoning } => {
                    if let Some(reasoning) = reasoning {
                        println!("--- reasoning ---");
                        println!("{}", reasoning);
                        println!("--- answer ---");
                    }
                    println!("{}", answer);
                }
                SessionOutcome::Failed { error } => {
                    println!("failed: {}", error);
                }
            }
            println!();
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_trims_to_one_line() {
        assert_eq!(first_line("answer\nwith detail"), "answer");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
    }
}
