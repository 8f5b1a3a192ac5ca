//! Terminal and SVG presentation of aggregated battery events.

pub mod bucket;
pub mod chart;
pub mod format;
pub mod sparkline;
pub mod tables;

pub use bucket::{bucket_span_seconds, bucket_start, group_by_bucket};
pub use chart::{default_graph_path, render_chart};
pub use format::{format_power, format_runtime};
pub use sparkline::{bar_graph, sparkline};
pub use tables::{
    battery_summary_table, bucket_stats_table, database_stats_table, latest_event_table,
    recent_events_table, DatabaseStats,
};
