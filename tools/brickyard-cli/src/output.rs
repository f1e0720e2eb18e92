//! Terminal output for the CLI.
//!
//! In JSON mode human-oriented lines are suppressed; commands print one JSON
//! document on stdout and errors go to stderr as `{"error": ...}`.

use brickyard_checkout::collaborators::{Notice, NoticeLevel};
use brickyard_commerce::Money;
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

const LABEL_WIDTH: usize = 18;
const AMOUNT_WIDTH: usize = 12;

#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn status(&self, badge: StyledObject<&str>, msg: &str) {
        if !self.json {
            println!("{} {}", badge, msg);
        }
    }

    pub fn info(&self, msg: &str) {
        self.status(style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.status(style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {}", style("⚠").yellow(), msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose && !self.json {
            eprintln!("{} {}", style("→").dim(), style(msg).dim());
        }
    }

    /// Render a checkout notice.
    pub fn notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info => self.info(&notice.message),
            NoticeLevel::Success => self.success(&notice.message),
            NoticeLevel::Error => self.error(&notice.message),
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.json {
            println!("\n{}", style(msg).bold().underlined());
        }
    }

    /// `[n/total] title` marker for a wizard step.
    pub fn step(&self, num: u8, total: usize, title: &str) {
        if !self.json {
            println!("{} {}", style(format!("[{}/{}]", num, total)).dim(), style(title).bold());
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    /// One row of a price table.
    pub fn amount(&self, label: &str, money: Money) {
        self.figure(label, &money.display());
    }

    /// A price-table row with a non-numeric value, e.g. "FREE".
    pub fn figure(&self, label: &str, value: &str) {
        self.kv(
            &format!("{:<width$}", label, width = LABEL_WIDTH),
            &format!("{:>width$}", value, width = AMOUNT_WIDTH),
        );
    }

    pub fn list_item(&self, item: &str) {
        if !self.json {
            println!("  {} {}", style("•").dim(), item);
        }
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Spinner shown while a remote call is in flight.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
