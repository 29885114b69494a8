use crate::report::types::{ChartSlice, OrdinationSummary, ReportContext, SurveySummary};

/// HTML formatter for survey reports
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Format report as standalone HTML with embedded CSS
    pub fn format(report: &ReportContext) -> String {
        let mut html = String::with_capacity(8192);

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "<title>Species Analysis: {}</title>\n",
            escape(&report.title)
        ));
        html.push_str("<style>\n");
        html.push_str("body { font-family: system-ui, sans-serif; max-width: 900px; margin: 40px auto; padding: 20px; line-height: 1.6; }\n");
        html.push_str("h1 { color: #2c3e50; margin-bottom: 10px; }\n");
        html.push_str("h2 { color: #34495e; border-bottom: 2px solid #ecf0f1; padding-bottom: 5px; margin-top: 30px; }\n");
        html.push_str("h3 { color: #34495e; margin-top: 20px; }\n");
        html.push_str(".summary { background: #f8f9fa; border-left: 4px solid #59a14f; padding: 15px; border-radius: 4px; }\n");
        html.push_str(".warning { background: #fff3cd; border-left: 4px solid #ffc107; padding: 10px 15px; margin: 10px 0; border-radius: 4px; }\n");
        html.push_str(".swatch { display: inline-block; width: 12px; height: 12px; margin-right: 6px; border-radius: 2px; }\n");
        html.push_str("table { width: 100%; border-collapse: collapse; margin: 16px 0; }\n");
        html.push_str("th { background: #34495e; color: white; text-align: left; padding: 8px 12px; font-weight: 600; }\n");
        html.push_str("td { padding: 8px 12px; border-bottom: 1px solid #ecf0f1; }\n");
        html.push_str("td.num { text-align: right; font-variant-numeric: tabular-nums; }\n");
        html.push_str("tr:hover { background: #f8f9fa; }\n");
        html.push_str("img.plot { max-width: 100%; }\n");
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&format!("<h1>Species Analysis: {}</h1>\n", escape(&report.title)));

        let overall = &report.overall;
        html.push_str("<div class=\"summary\">\n<ul>\n");
        html.push_str(&format!(
            "<li>Surveys (RELEVE_ID): <strong>{}</strong></li>\n",
            overall.unique_survey_count
        ));
        html.push_str(&format!(
            "<li>Unique species: <strong>{}</strong></li>\n",
            overall.unique_species_count
        ));
        html.push_str(&format!("<li>Records: <strong>{}</strong></li>\n", overall.record_count));
        html.push_str(&format!(
            "<li>Total DOMIN score: <strong>{:.1}</strong></li>\n",
            overall.total_domin_score
        ));
        html.push_str(&format!(
            "<li>Average DOMIN per species: <strong>{:.2}</strong></li>\n",
            overall.avg_domin_per_species
        ));
        html.push_str(&format!(
            "<li>Highest combined DOMIN score: <strong>{}</strong> ({:.1})</li>\n",
            escape(&overall.top_species.species),
            overall.top_species.score
        ));
        html.push_str("</ul>\n</div>\n");

        for warning in &report.warnings {
            html.push_str(&format!("<div class=\"warning\">⚠️ {}</div>\n", escape(warning)));
        }

        if let Some(ordination) = &report.ordination {
            Self::format_ordination(&mut html, ordination);
        }

        Self::format_chart(&mut html, &report.dominance_chart);

        html.push_str(&format!(
            "<h2>Top {} Species by DOMIN Score</h2>\n",
            report.ranked_species.len()
        ));
        html.push_str("<table>\n<tr><th>Rank</th><th>Species Name</th><th>DOMIN Score</th></tr>\n");
        for (rank, species) in report.ranked_species.iter().enumerate() {
            html.push_str(&format!(
                "<tr><td class=\"num\">{}</td><td>{}</td><td class=\"num\">{:.1}</td></tr>\n",
                rank + 1,
                escape(&species.species),
                species.score
            ));
        }
        html.push_str("</table>\n");

        html.push_str("<h2>Management Groups</h2>\n");
        html.push_str("<table>\n<tr><th>Group</th><th>Surveys</th><th>Species</th><th>Total DOMIN</th><th>Leading Species</th></tr>\n");
        for group in &report.groups {
            let leading: Vec<String> = group
                .leading_species
                .iter()
                .map(|s| format!("{} ({:.1})", escape(&s.species), s.score))
                .collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{:.1}</td><td>{}</td></tr>\n",
                escape(&group.name),
                group.survey_ids.len(),
                group.unique_species_count,
                group.total_domin,
                leading.join(", ")
            ));
        }
        html.push_str("</table>\n");

        html.push_str("<h2>Species Richness per Survey</h2>\n");
        html.push_str("<table>\n<tr><th>RELEVE_ID</th><th>Number of Species</th></tr>\n");
        for row in &report.richness {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
                row.releve_id, row.species_count
            ));
        }
        html.push_str("</table>\n");

        html.push_str("<h2>Species Composition per Survey</h2>\n");
        for survey in &report.surveys {
            Self::format_survey(&mut html, survey);
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn format_chart(html: &mut String, slices: &[ChartSlice]) {
        html.push_str(&format!("<h2>Dominant Species (Top {})</h2>\n", slices.len()));
        html.push_str("<table>\n<tr><th>Species</th><th>DOMIN</th><th>Share</th></tr>\n");
        for slice in slices {
            html.push_str(&format!(
                "<tr><td><span class=\"swatch\" style=\"background: {}\"></span>{}</td><td class=\"num\">{:.1}</td><td class=\"num\">{:.1}%</td></tr>\n",
                slice.color,
                escape(&slice.species),
                slice.score,
                slice.share_pct
            ));
        }
        html.push_str("</table>\n");
    }

    fn format_survey(html: &mut String, survey: &SurveySummary) {
        html.push_str(&format!(
            "<h3>RELEVE_ID {} ({} species)</h3>\n",
            survey.releve_id, survey.species_count
        ));
        html.push_str(&format!(
            "<p><em>{}</em> · total DOMIN {:.1} · dominant: <strong>{}</strong> ({:.1})</p>\n",
            escape(&survey.group),
            survey.total_domin,
            escape(&survey.max_species),
            survey.max_score
        ));
        html.push_str("<table>\n<tr><th>Species</th><th>DOMIN</th><th>Share</th></tr>\n");
        for entry in &survey.composition {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{:.1}</td><td class=\"num\">{:.1}%</td></tr>\n",
                escape(&entry.species),
                entry.score,
                entry.share_pct
            ));
        }
        html.push_str("</table>\n");
    }

    fn format_ordination(html: &mut String, ordination: &OrdinationSummary) {
        html.push_str("<h2>NMDS Ordination</h2>\n");
        html.push_str(&format!(
            "<p>Stress: <strong>{:.4}</strong> ({})</p>\n",
            ordination.stress_value, ordination.stress_label
        ));
        html.push_str(&format!(
            "<img class=\"plot\" src=\"{}\" alt=\"NMDS plot\">\n",
            escape(&ordination.plot_path)
        ));

        let extra: Vec<_> = ordination.extra_metrics().collect();
        if !extra.is_empty() {
            html.push_str("<table>\n<tr><th>Metric</th><th>Value</th></tr>\n");
            for (key, value) in extra {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    escape(key),
                    escape(&value.to_string())
                ));
            }
            html.push_str("</table>\n");
        }
    }
}

/// Escape text for HTML element and attribute content
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
