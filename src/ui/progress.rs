use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

/// Progress bars for the pipeline phases, driven over a channel.
///
/// Bars are hidden when stdout is not a terminal or output is quiet.
pub struct ProgressManager {
    mp: MultiProgress,
    _handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let mp = MultiProgress::new();
        let visible = console::Term::stdout().is_term() && !crate::output::is_quiet();

        let parsing = if visible {
            mp.add(ProgressBar::new(0).with_message("Parsing files"))
        } else {
            ProgressBar::hidden()
        };
        let cycles = if visible {
            mp.add(ProgressBar::new_spinner().with_message("Detecting cycles"))
        } else {
            ProgressBar::hidden()
        };
        let export = if visible {
            mp.add(ProgressBar::new_spinner().with_message("Rendering diagrams"))
        } else {
            ProgressBar::hidden()
        };

        let handle = thread::spawn(move || {
            let bar = |phase: ProgressPhase| match phase {
                ProgressPhase::Parsing => &parsing,
                ProgressPhase::Cycles => &cycles,
                ProgressPhase::Export => &export,
            };

            for msg in rx {
                match msg {
                    ProgressMessage::Started {
                        phase: ProgressPhase::Parsing,
                        total,
                    } => {
                        parsing.set_length(total as u64);
                    }
                    ProgressMessage::Started { phase, .. } => {
                        bar(phase).enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Progress { phase, current, file } => {
                        let pb = bar(phase);
                        pb.set_position(current as u64);
                        if let Some(f) = file {
                            pb.set_message(format!("Parsing: {}", f));
                        }
                    }
                    ProgressMessage::Finished { phase } => {
                        bar(phase).finish_with_message("Done");
                    }
                    ProgressMessage::Error(e) => {
                        parsing.println(format!("{} {}", Icons::CROSS, e));
                    }
                }
            }
        });

        (Self { mp, _handle: handle }, tx)
    }

    pub fn clear(&self) {
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&self, duration: Duration, files: usize, scopes: usize, edges: usize) {
        self.clear();
        if crate::output::is_quiet() {
            return;
        }
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}  {} {}",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::PACKAGE.style(theme().info.clone()),
            scopes,
            Icons::LINK.style(theme().info.clone()),
            edges
        );
    }
}
