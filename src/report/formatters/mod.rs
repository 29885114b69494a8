pub mod markdown;
pub mod json;
pub mod html;

pub use markdown::MarkdownFormatter;
pub use json::JsonFormatter;
pub use html::HtmlFormatter;

use crate::config::ReportFormat;
use crate::report::types::ReportContext;

/// Serialize a report in the requested format
pub fn format_report(report: &ReportContext, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Html => Ok(HtmlFormatter::format(report)),
        ReportFormat::Markdown => Ok(MarkdownFormatter::format(report)),
        ReportFormat::Json => JsonFormatter::format(report),
    }
}
