//! Pipeline Integration Tests
//!
//! Drives the full load → ingest → aggregate → classify → render → write
//! path on small CSVs in scratch directories.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use releve_report::classify::{GRAZING_FERTILISER, MOWING_FERTILISER, ORGANIC};
use releve_report::ordination::OrdinationResult;
use releve_report::{
    aggregate, classify, ClassificationScheme, OrdinationRunner, ReportConfig, ReportFormat,
    SurveyBatch, SurveyError, SurveyRecord, SurveyReporter,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "RELEVE_ID,SPECIES_NAME,DOMIN\n";

fn write_csv(dir: &Path, name: &str, rows: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{}{}", HEADER, rows)).unwrap();
    path
}

fn offline_config(dir: &Path, format: ReportFormat) -> ReportConfig {
    let mut config = ReportConfig {
        output_dir: Some(dir.join("out")),
        format,
        ..ReportConfig::default()
    };
    config.ordination.enabled = false;
    config
}

struct ExitFailure;

impl OrdinationRunner for ExitFailure {
    fn run(&self, _: &Path, _: &Path) -> Result<OrdinationResult, SurveyError> {
        Err(SurveyError::Ordination {
            message: "'Rscript' failed with exit status 1".to_string(),
            diagnostics: "Error: stress did not converge".to_string(),
        })
    }
}

#[test]
fn single_survey_composition() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "plot.csv", "1,A,5.0\n1,B,3.0\n");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Json)).unwrap();
    let summary = reporter.run(&input).unwrap();

    let survey = &summary.report.surveys[0];
    assert_eq!(survey.releve_id, 1);
    let composition: Vec<(&str, f64)> = survey
        .composition
        .iter()
        .map(|c| (c.species.as_str(), c.score))
        .collect();
    assert_eq!(composition, vec![("A", 5.0), ("B", 3.0)]);
    assert_eq!(survey.max_species, "A");
    assert_eq!(survey.max_score, 5.0);
    assert_relative_eq!(survey.total_domin, 8.0);

    assert_eq!(summary.report_path, dir.path().join("out/plot_report.json"));
    let written = fs::read_to_string(&summary.report_path).unwrap();
    assert!(written.contains("\"max_species\": \"A\""));
}

#[test]
fn empty_input_fails_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "empty.csv", "");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown)).unwrap();
    let err = reporter.run(&input).unwrap_err();

    assert!(matches!(err, SurveyError::EmptyData));
    assert!(!dir.path().join("out/empty_report.md").exists());
}

#[test]
fn unparseable_score_fails_with_row() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "bad.csv", "1,A,5\n2,B,n/a\n3,C,1\n");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown)).unwrap();
    match reporter.run(&input) {
        Err(SurveyError::Parse { row, value, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(value, "n/a");
        }
        other => panic!("expected parse error, got {:?}", other.map(|s| s.report_path)),
    }
    assert!(!dir.path().join("out").join("bad_report.md").exists());
}

#[test]
fn lenient_mode_skips_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "bad.csv", "1,A,5\n2,B,n/a\n3,C,1\n");

    let mut config = offline_config(dir.path(), ReportFormat::Markdown);
    config.strict = false;
    let summary = SurveyReporter::new(config).unwrap().run(&input).unwrap();

    assert_eq!(summary.report.overall.record_count, 2);
    assert!(summary
        .report
        .warnings
        .iter()
        .any(|w| w.contains("skipped row 1")));
}

#[test]
fn zero_byte_input_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blank.csv");
    fs::write(&input, "").unwrap();

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown)).unwrap();
    let err = reporter.run(&input).unwrap_err();
    assert!(matches!(err, SurveyError::Schema { ref missing } if missing.len() == 3));
    assert_eq!(err.stage(), "ingest");
}

#[test]
fn missing_column_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("schema.csv");
    fs::write(&input, "RELEVE_ID,SPECIES,DOMIN\n1,A,1\n").unwrap();

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown)).unwrap();
    let err = reporter.run(&input).unwrap_err();
    assert!(matches!(err, SurveyError::Schema { ref missing } if missing == &["SPECIES_NAME"]));
}

#[test]
fn two_groups_and_an_empty_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "groups.csv", "5,A,4.0\n30,B,4.0\n");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Html)).unwrap();
    let summary = reporter.run(&input).unwrap();

    let groups: Vec<(&str, f64)> = summary
        .report
        .groups
        .iter()
        .map(|g| (g.name.as_str(), g.total_domin))
        .collect();
    assert_eq!(groups, vec![(GRAZING_FERTILISER, 4.0), (MOWING_FERTILISER, 4.0)]);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].group, ORGANIC);
}

#[test]
fn ordination_failure_is_fatal_unless_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "nmds.csv", "1,A,2\n40,B,3\n");

    let mut enabled = offline_config(dir.path(), ReportFormat::Markdown);
    enabled.ordination.enabled = true;
    let err = SurveyReporter::new(enabled)
        .unwrap()
        .with_runner(Box::new(ExitFailure))
        .run(&input)
        .unwrap_err();
    assert!(matches!(err, SurveyError::Ordination { .. }));
    assert!(!dir.path().join("out/nmds_report.md").exists());

    let summary = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown))
        .unwrap()
        .with_runner(Box::new(ExitFailure))
        .run(&input)
        .unwrap();
    assert!(summary.report.ordination.is_none());
    let written = fs::read_to_string(summary.report_path).unwrap();
    assert!(!written.contains("NMDS"));
}

#[test]
fn rerun_produces_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "repeat.csv",
        "9,Holcus lanatus,4\n10,Lolium perenne,6\n9,Lolium perenne,1\n31,Poa annua,2\n",
    );

    for format in [ReportFormat::Html, ReportFormat::Markdown, ReportFormat::Json] {
        let reporter = SurveyReporter::new(offline_config(dir.path(), format)).unwrap();
        let first = fs::read(reporter.run(&input).unwrap().report_path).unwrap();
        let second = fs::read(reporter.run(&input).unwrap().report_path).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn numeric_survey_order_in_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "order.csv", "10,A,1\n9,A,1\n100,B,1\n2,C,1\n");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Markdown)).unwrap();
    let summary = reporter.run(&input).unwrap();
    let ids: Vec<i64> = summary.report.surveys.iter().map(|s| s.releve_id).collect();
    assert_eq!(ids, vec![2, 9, 10, 100]);

    let md = fs::read_to_string(summary.report_path).unwrap();
    let pos_9 = md.find("### RELEVE_ID 9 ").unwrap();
    let pos_10 = md.find("### RELEVE_ID 10 ").unwrap();
    assert!(pos_9 < pos_10);
}

#[test]
fn run_many_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_csv(dir.path(), "good.csv", "1,A,1\n");
    let empty = write_csv(dir.path(), "empty.csv", "");
    let other = write_csv(dir.path(), "other.csv", "50,B,2\n");

    let reporter = SurveyReporter::new(offline_config(dir.path(), ReportFormat::Json)).unwrap();
    let results = reporter.run_many(&[good, empty, other]);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().report.title, "good");
    assert!(matches!(results[1], Err(SurveyError::EmptyData)));
    assert_eq!(results[2].as_ref().unwrap().report.title, "other");
}

fn synthetic_records() -> Vec<SurveyRecord> {
    // Distinct per-relevé maxima so no shuffle can change a tie winner
    let species = ["A", "B", "C", "D", "E", "F"];
    let mut records = Vec::new();
    for releve_id in 1..=45_i64 {
        for (i, name) in species.iter().enumerate().take((releve_id as usize % 5) + 1) {
            let score = (releve_id as f64 % 7.0) + i as f64 * 0.5 + 0.25;
            records.push(SurveyRecord::try_new(releve_id, *name, score).unwrap());
        }
    }
    records
}

#[test]
fn aggregation_is_order_independent() {
    let records = synthetic_records();
    let baseline_batch = SurveyBatch::from_records(records.clone());
    let baseline = aggregate(&baseline_batch).unwrap();
    let baseline_groups = classify(&baseline_batch, &ClassificationScheme::default());

    let mut rng = StdRng::seed_from_u64(68);
    for _ in 0..10 {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        let batch = SurveyBatch::from_records(shuffled);
        let agg = aggregate(&batch).unwrap();

        for (species, score) in baseline.species.iter() {
            assert_relative_eq!(agg.species.get(species).unwrap(), score, epsilon = 1e-9);
        }
        assert_eq!(agg.unique_species_count(), baseline.unique_species_count());
        assert_eq!(agg.unique_survey_count(), baseline.unique_survey_count());
        assert_relative_eq!(
            agg.avg_domin_per_species(),
            baseline.avg_domin_per_species(),
            epsilon = 1e-9
        );
        for survey in baseline.surveys() {
            let other = agg.survey(survey.releve_id).unwrap();
            assert_eq!(other.max_record, survey.max_record);
            assert_relative_eq!(other.total, survey.total, epsilon = 1e-9);
        }

        let groups = classify(&batch, &ClassificationScheme::default());
        for group in &baseline_groups.groups {
            assert_eq!(groups.group(&group.name).unwrap().survey_ids, group.survey_ids);
        }
    }
}

#[test]
fn management_groups_partition_surveys() {
    let batch = SurveyBatch::from_records(synthetic_records());
    let agg = aggregate(&batch).unwrap();
    let classification = classify(&batch, &ClassificationScheme::default());

    let mut seen: BTreeSet<i64> = BTreeSet::new();
    let mut member_count = 0;
    for group in &classification.groups {
        member_count += group.survey_ids.len();
        seen.extend(group.survey_ids.iter().copied());
    }
    let all: BTreeSet<i64> = agg.survey_ids().collect();

    // Pairwise disjoint and covering every relevé
    assert_eq!(member_count, seen.len());
    assert_eq!(seen, all);
    assert!(classification.warnings.is_empty());

    let totals: BTreeMap<&str, usize> = classification
        .groups
        .iter()
        .map(|g| (g.name.as_str(), g.survey_ids.len()))
        .collect();
    assert_eq!(totals[GRAZING_FERTILISER], 10);
    assert_eq!(totals[MOWING_FERTILISER], 11);
    assert_eq!(totals[ORGANIC], 24);
}
