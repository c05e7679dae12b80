pub mod formatter;

pub use formatter::{
    format_age, format_analytics, format_bar, format_collaboration, format_count, format_overview,
    format_repo_table, format_repo_tsv, format_report, should_use_colors, truncate_title,
};
