pub mod types;
pub mod renderer;
pub mod formatters;

pub use types::{
    ChartSlice, CompositionEntry, GroupSummary, OrdinationSummary, OverallSummary, ReportContext,
    RichnessRow, SurveySummary,
};

pub use renderer::{render, stress_label, RenderInput, RenderOptions};
pub use formatters::{format_report, HtmlFormatter, JsonFormatter, MarkdownFormatter};
