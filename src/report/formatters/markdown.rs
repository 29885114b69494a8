use crate::report::types::{OrdinationSummary, ReportContext, SurveySummary};

/// Markdown formatter for survey reports
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format report as markdown
    pub fn format(report: &ReportContext) -> String {
        let mut md = String::with_capacity(4096);

        md.push_str(&format!("# Species Analysis: {}\n\n", report.title));

        // Overall
        let overall = &report.overall;
        md.push_str("## Overall Species Analysis\n\n");
        md.push_str(&format!("- **Surveys (RELEVE_ID):** {}\n", overall.unique_survey_count));
        md.push_str(&format!("- **Unique species:** {}\n", overall.unique_species_count));
        md.push_str(&format!("- **Records:** {}\n", overall.record_count));
        md.push_str(&format!("- **Total DOMIN score:** {:.1}\n", overall.total_domin_score));
        md.push_str(&format!(
            "- **Average DOMIN per species:** {:.2}\n",
            overall.avg_domin_per_species
        ));
        md.push_str(&format!(
            "- **Highest combined DOMIN score:** {} ({:.1})\n\n",
            overall.top_species.species, overall.top_species.score
        ));

        if !report.warnings.is_empty() {
            md.push_str("## Warnings\n\n");
            for warning in &report.warnings {
                md.push_str(&format!("- ⚠️ {}\n", warning));
            }
            md.push('\n');
        }

        if let Some(ordination) = &report.ordination {
            Self::format_ordination(&mut md, ordination);
        }

        // Dominance chart data
        md.push_str(&format!("## Dominant Species (Top {})\n\n", report.dominance_chart.len()));
        md.push_str("| Species | DOMIN | Share |\n");
        md.push_str("|---------|-------|-------|\n");
        for slice in &report.dominance_chart {
            md.push_str(&format!(
                "| {} | {:.1} | {:.1}% |\n",
                cell(&slice.species),
                slice.score,
                slice.share_pct
            ));
        }
        md.push('\n');

        md.push_str(&format!(
            "## Top {} Species by DOMIN Score\n\n",
            report.ranked_species.len()
        ));
        md.push_str("| Rank | Species Name | DOMIN Score |\n");
        md.push_str("|-----:|--------------|------------:|\n");
        for (rank, species) in report.ranked_species.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {:.1} |\n",
                rank + 1,
                cell(&species.species),
                species.score
            ));
        }
        md.push('\n');

        // Management groups
        md.push_str("## Management Groups\n\n");
        md.push_str("| Group | Surveys | Species | Total DOMIN | Leading Species |\n");
        md.push_str("|-------|---------|---------|-------------|-----------------|\n");
        for group in &report.groups {
            let leading: Vec<String> = group
                .leading_species
                .iter()
                .map(|s| format!("{} ({:.1})", cell(&s.species), s.score))
                .collect();
            md.push_str(&format!(
                "| {} | {} | {} | {:.1} | {} |\n",
                cell(&group.name),
                group.survey_ids.len(),
                group.unique_species_count,
                group.total_domin,
                leading.join(", ")
            ));
        }
        md.push('\n');

        md.push_str("## Species Richness per Survey\n\n");
        md.push_str("| RELEVE_ID | Number of Species |\n");
        md.push_str("|-----------|------------------:|\n");
        for row in &report.richness {
            md.push_str(&format!("| {} | {} |\n", row.releve_id, row.species_count));
        }
        md.push('\n');

        md.push_str("## Species Composition per Survey\n\n");
        for survey in &report.surveys {
            Self::format_survey(&mut md, survey);
        }

        md
    }

    fn format_survey(md: &mut String, survey: &SurveySummary) {
        md.push_str(&format!(
            "### RELEVE_ID {} ({} species)\n\n",
            survey.releve_id, survey.species_count
        ));
        md.push_str(&format!(
            "*{}* · total DOMIN {:.1} · dominant: **{}** ({:.1})\n\n",
            survey.group, survey.total_domin, survey.max_species, survey.max_score
        ));
        md.push_str("| Species | DOMIN | Share |\n");
        md.push_str("|---------|-------|-------|\n");
        for entry in &survey.composition {
            md.push_str(&format!(
                "| {} | {:.1} | {:.1}% |\n",
                cell(&entry.species),
                entry.score,
                entry.share_pct
            ));
        }
        md.push('\n');
    }

    fn format_ordination(md: &mut String, ordination: &OrdinationSummary) {
        md.push_str("## NMDS Ordination\n\n");
        md.push_str(&format!(
            "**Stress:** {:.4} ({})\n\n",
            ordination.stress_value, ordination.stress_label
        ));
        md.push_str(&format!("![NMDS plot]({})\n\n", ordination.plot_path));

        let extra: Vec<_> = ordination.extra_metrics().collect();
        if !extra.is_empty() {
            md.push_str("| Metric | Value |\n");
            md.push_str("|--------|-------|\n");
            for (key, value) in extra {
                md.push_str(&format!("| {} | {} |\n", cell(key), cell(&value.to_string())));
            }
            md.push('\n');
        }
    }
}

/// Escape text for a table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
