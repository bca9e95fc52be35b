//! Shared progress bar setup for row-count based progress.

use indicatif::{ProgressBar, ProgressStyle};

const ROW_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {human_pos}/{human_len} rows ({percent}%, {per_sec})";

/// A progress bar counting rows towards `total`
pub fn row_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(ROW_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}
