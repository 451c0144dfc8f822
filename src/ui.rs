//! Terminal presentation: spinner and colored decision output.
//!
//! Uses `indicatif` for the progress spinner and `console` for color
//! styling. [`DecisionProgress`] visually tracks a single decision run.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::directory::FieldProfile;
use crate::workflow::{Decision, DecisionRecord};

/// Visual progress indicator for one decision run in the terminal.
pub struct DecisionProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl DecisionProgress {
    /// Start the spinner for the given field and return the progress handle.
    pub fn start(field_id: u32) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Deciding for field #{field_id}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finish the spinner and print the terminal decision.
    pub fn complete(&self, record: &DecisionRecord) {
        self.pb.finish_and_clear();
        match record.decision {
            Decision::Irrigate => {
                println!(
                    "  {} IRRIGATE: {}",
                    self.green.apply_to("✓"),
                    record.reason
                );
            }
            Decision::DoNotIrrigate => {
                println!(
                    "  {} DO_NOT_IRRIGATE: {}",
                    self.green.apply_to("✓"),
                    record.reason
                );
            }
            Decision::MaintenanceRequired => {
                println!(
                    "  {} MAINTENANCE_REQUIRED: {}",
                    self.red.apply_to("✗"),
                    record.reason
                );
            }
        }
        let note = format!(
            "confidence {} after {} sensor attempt(s)",
            record.confidence, record.sensor_attempts
        );
        if record.sensor_attempts > 1 {
            println!("    {}", self.yellow.apply_to(note));
        } else {
            println!("    {note}");
        }
    }

    /// Print the full decision record as styled pretty JSON.
    pub fn print_record(&self, record: &DecisionRecord) {
        let header_style = match record.decision {
            Decision::MaintenanceRequired => &self.red,
            _ => &self.green,
        };
        println!();
        println!("{}", header_style.apply_to("--- Decision Record ---"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }

    /// Print one directory entry for the `fields` listing.
    pub fn print_profile(profile: &FieldProfile) {
        println!(
            "  #{:<4} {:<8} {:<12} min {:>5.1}%  optimal {:>5.1}%  max {:>5.1}%",
            profile.field_id,
            profile.crop_type.to_string(),
            profile.soil_type,
            profile.min_moisture,
            profile.optimal_moisture,
            profile.max_moisture
        );
    }
}
