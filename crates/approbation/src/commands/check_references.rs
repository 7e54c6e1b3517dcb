//! `approbation check-references`
//!
//! Cross-references spec criteria with test artifacts and reports coverage
//! overall, per spec file, per feature and milestone, and per category.
//! Optionally writes CSV tables and a one-line CI summary to the output
//! directory.

use crate::branches::{project_branches, render_branches};
use crate::commands::check_features::{render_feature_issues, render_rejected};
use crate::files::{ignore_list, matching_files};
use crate::output::{OutputFormat, Table, colored_percent, count_or_dash, percent_cell};
use crate::{CommandOutput, Status};
use approbation_core::{
    CategoriesConfig, CategoryRegistry, Counter, FeatureRegistry, PathSources, Percent,
    ReferenceReport, Registries, SpecFiles, Tally, TestReferences, TOTAL,
};
use eyre::{Result, WrapErr};
use facet::Facet;
use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Category CSV file name
pub const CATEGORIES_CSV: &str = "approbation-categories.csv";

/// Spec file CSV file name
pub const FILES_CSV: &str = "approbation-files.csv";

/// CI summary file name
pub const JENKINS_SUMMARY: &str = "jenkins.txt";

/// Largest edit distance for a "did you mean" suggestion
const SUGGESTION_DISTANCE: usize = 2;

const FILE_HEADERS: [&str; 9] = [
    "File",
    "Priority",
    "Category",
    "Criteria",
    "Covered",
    "by/FeatTest",
    "by/SysTest",
    "Uncovered",
    "Coverage",
];

const MILESTONE_HEADERS: [&str; 8] = [
    "Feature",
    "Milestone",
    "ACs",
    "Covered",
    "by/FeatTest",
    "by/SysTest",
    "Uncovered",
    "Coverage",
];

const CATEGORY_HEADERS: [&str; 9] = [
    "Category",
    "Specs",
    "Acceptable",
    "Criteria",
    "Covered",
    "by/FeatTest",
    "by/SysTest",
    "Uncovered",
    "Coverage",
];

/// Columns of the category table left out of the CI summary
const SUMMARY_SKIPPED: [&str; 3] = ["Category", "Specs", "Acceptable"];

#[derive(Debug, Clone)]
pub struct ReferenceOptions {
    pub specs: String,
    pub tests: String,
    pub ignore: Option<String>,
    pub categories: Option<PathBuf>,
    pub features: Option<PathBuf>,
    /// List codes referenced by tests but declared by no spec
    pub mystery: bool,
    pub verbose: bool,
    pub category_stats: bool,
    pub show_files: bool,
    pub file_stats: bool,
    pub csv: bool,
    pub jenkins: bool,
    pub current_milestone: Option<String>,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub show_branches: bool,
    pub fail_on_mystery: bool,
}

impl ReferenceOptions {
    /// Options with every optional flag off.
    pub fn new(specs: impl Into<String>, tests: impl Into<String>) -> Self {
        Self {
            specs: specs.into(),
            tests: tests.into(),
            ignore: None,
            categories: None,
            features: None,
            mystery: false,
            verbose: false,
            category_stats: false,
            show_files: false,
            file_stats: false,
            csv: false,
            jenkins: false,
            current_milestone: None,
            output: PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Text,
            show_branches: false,
            fail_on_mystery: false,
        }
    }
}

/// Per-milestone total row of the milestone table
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneTotal {
    pub milestone: String,
    pub acs: usize,
    pub covered: usize,
    pub feature_covered: usize,
    pub system_test_covered: usize,
    pub uncovered: usize,
}

impl MilestoneTotal {
    pub fn coverage(&self) -> Percent {
        Percent::of(self.covered, self.acs)
    }
}

/// Everything one run computed, ready to render.
pub struct ReferenceRun {
    pub report: ReferenceReport,
    pub specs: SpecFiles,
    pub registries: Registries,
}

impl ReferenceRun {
    /// Expand the globs, load the registries and aggregate.
    pub fn compute(options: &ReferenceOptions) -> Result<Self> {
        let ignored = ignore_list(options.ignore.as_deref())?;
        let spec_files = matching_files("--specs", &options.specs, &ignored, "spec")?;
        let test_files = matching_files("--tests", &options.tests, &ignored, "test")?;

        let categories = match &options.categories {
            Some(path) => CategoryRegistry::load(path)?,
            None => CategoryRegistry::from_config(CategoriesConfig::new()),
        };
        let features = match &options.features {
            Some(path) => FeatureRegistry::load(path)?,
            None => FeatureRegistry::new(),
        };
        let mut registries = Registries::new(categories, features);

        let mut specs = SpecFiles::collect(PathSources::new(spec_files), &registries.categories)?;
        let tests = TestReferences::collect(PathSources::new(test_files))?;
        let report = ReferenceReport::compute(&mut specs, tests, &mut registries)?;

        Ok(Self {
            report,
            specs,
            registries,
        })
    }

    /// One row per spec file, by priority then coverage.
    pub fn file_table(&self) -> Table {
        let mut specs: Vec<_> = self.specs.iter().collect();
        specs.sort_by(|a, b| {
            let coverage_a = Percent::of(a.referenced, a.count).or_zero();
            let coverage_b = Percent::of(b.referenced, b.count).or_zero();
            a.priority
                .cmp(&b.priority)
                .then(coverage_a.total_cmp(&coverage_b))
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        let mut table = Table::new(&FILE_HEADERS);
        for spec in specs {
            table.add_row(vec![
                spec.file_name.clone(),
                spec.priority.to_string(),
                spec.categories.join(" "),
                spec.count.to_string(),
                spec.referenced.to_string(),
                spec.referenced_by_feature.to_string(),
                spec.referenced_by_system_test.to_string(),
                spec.uncovered.to_string(),
                percent_cell(Percent::of(spec.referenced, spec.count)),
            ]);
        }
        table
    }

    /// Totals per milestone, milestones in order of first appearance.
    pub fn milestone_totals(&self) -> Vec<MilestoneTotal> {
        self.registries
            .features
            .by_milestone()
            .into_iter()
            .map(|(milestone, features)| {
                let sum = |counter: Counter| -> usize {
                    features.iter().map(|f| f.tally.get(counter)).sum()
                };
                MilestoneTotal {
                    milestone,
                    acs: features.iter().map(|f| f.acs.len()).sum(),
                    covered: sum(Counter::Covered),
                    feature_covered: sum(Counter::FeatureCovered),
                    system_test_covered: sum(Counter::SystemTestCovered),
                    uncovered: sum(Counter::Uncovered),
                }
            })
            .collect()
    }

    /// Feature rows grouped by milestone, then a separator and one total row
    /// per milestone.
    pub fn milestone_table(&self) -> Table {
        let mut table = Table::new(&MILESTONE_HEADERS);
        for (_, features) in self.registries.features.by_milestone() {
            for feature in features {
                let covered = feature.tally.get(Counter::Covered);
                table.add_row(vec![
                    feature.name.clone(),
                    feature.milestone.clone(),
                    feature.acs.len().to_string(),
                    covered.to_string(),
                    feature.tally.get(Counter::FeatureCovered).to_string(),
                    feature.tally.get(Counter::SystemTestCovered).to_string(),
                    feature.tally.get(Counter::Uncovered).to_string(),
                    percent_cell(Percent::of(covered, feature.acs.len())),
                ]);
            }
        }

        table.add_separator();
        for total in self.milestone_totals() {
            table.add_row(vec![
                TOTAL.to_string(),
                total.milestone.clone(),
                total.acs.to_string(),
                total.covered.to_string(),
                count_or_dash(total.feature_covered),
                count_or_dash(total.system_test_covered),
                count_or_dash(total.uncovered),
                percent_cell(total.coverage()),
            ]);
        }
        table
    }

    /// One row per category, then the synthetic Total row.
    pub fn category_table(&self) -> Table {
        let mut table = Table::new(&CATEGORY_HEADERS);
        for category in self.registries.categories.iter() {
            table.add_row(category_row(&category.name, &category.tally));
        }
        table.add_row(category_row(TOTAL, &self.report.total));
        table
    }

    /// `All ACs: *Criteria*: 12  *Covered*: 6 ...` plus the current
    /// milestone's coverage when features are configured. An unknown
    /// `current_milestone` falls back to the last milestone.
    pub fn jenkins_summary(&self, current_milestone: Option<&str>) -> String {
        let total_row = category_row(TOTAL, &self.report.total);
        let fields: Vec<String> = CATEGORY_HEADERS
            .iter()
            .zip(&total_row)
            .filter(|(header, _)| !SUMMARY_SKIPPED.contains(*header))
            .map(|(header, value)| format!("*{}*: {}", header, value))
            .collect();
        let mut summary = format!("All ACs: {}", fields.join("  "));

        let totals = self.milestone_totals();
        let current = current_milestone
            .and_then(|name| totals.iter().find(|t| t.milestone == name))
            .or_else(|| totals.last());
        if let Some(milestone) = current {
            summary.push_str(&format!(
                "\r\nCurrent milestone ACs: *{}*: {}",
                milestone.milestone,
                percent_cell(milestone.coverage())
            ));
        }
        summary
    }

    /// Mystery codes with the files mentioning them and the closest
    /// declared code, if any is close enough.
    pub fn mysteries(&self) -> Vec<Mystery> {
        let declared = &self.report.all_criteria_in_specs;
        self.report
            .unknown_criteria_in_tests
            .iter()
            .map(|(code, files)| Mystery {
                code: code.to_string(),
                files: files.iter().map(|f| f.display().to_string()).collect(),
                suggestion: suggest(code, declared).map(str::to_string),
            })
            .collect()
    }
}

/// A code referenced by tests but declared by no spec
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Mystery {
    pub code: String,
    pub files: Vec<String>,
    pub suggestion: Option<String>,
}

/// The declared code closest to `code` by edit distance, within
/// [`SUGGESTION_DISTANCE`].
pub fn suggest<'a>(code: &str, declared: &'a [String]) -> Option<&'a str> {
    declared
        .iter()
        .map(|candidate| (strsim::levenshtein(code, candidate), candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.as_str())
}

fn category_row(name: &str, tally: &Tally) -> Vec<String> {
    let codes = tally.get(Counter::Codes);
    let coverage = Percent::of(tally.get(Counter::Covered), codes);
    vec![
        name.to_string(),
        count_or_dash(tally.get(Counter::SpecCount)),
        count_or_dash(tally.get(Counter::AcceptableSpecCount)),
        count_or_dash(codes),
        count_or_dash(tally.get(Counter::Covered)),
        count_or_dash(tally.get(Counter::FeatureCovered)),
        count_or_dash(tally.get(Counter::SystemTestCovered)),
        count_or_dash(tally.get(Counter::Uncovered)),
        match coverage.value() {
            Some(_) => percent_cell(coverage),
            None => "-".to_string(),
        },
    ]
}

pub fn run(options: &ReferenceOptions) -> Result<CommandOutput> {
    let mut text = String::new();
    if options.show_branches {
        text.push_str(&render_branches(&project_branches(Path::new("."))?));
    }

    let run = ReferenceRun::compute(options)?;

    match options.format {
        OutputFormat::Text => text.push_str(&render_text(&run, options)),
        OutputFormat::Json => {
            text.push_str(&render_json(&run)?);
            text.push('\n');
        }
    }

    if options.csv || options.jenkins {
        write_outputs(&run, options)?;
    }

    let failed = options.fail_on_mystery && run.report.mystery_count() > 0;
    Ok(CommandOutput::new(Status::from_ok(!failed), text))
}

/// Write the CSV tables and CI summary requested by `options`.
pub fn write_outputs(run: &ReferenceRun, options: &ReferenceOptions) -> Result<()> {
    let dir = &options.output;
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create output directory {}", dir.display()))?;

    if options.csv {
        write_file(&dir.join(CATEGORIES_CSV), &run.category_table().to_csv())?;
        write_file(&dir.join(FILES_CSV), &run.file_table().to_csv())?;
    }
    if options.jenkins {
        let summary = run.jenkins_summary(options.current_milestone.as_deref());
        write_file(&dir.join(JENKINS_SUMMARY), &summary)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn render_files(run: &ReferenceRun, verbose: bool) -> String {
    let mut output = String::new();
    for spec in run.specs.iter() {
        let count = if spec.is_acceptable() {
            spec.count.green().to_string()
        } else {
            spec.count.red().to_string()
        };
        let referenced = if spec.referenced > 1 {
            spec.referenced.green().to_string()
        } else {
            spec.referenced.red().to_string()
        };
        let categories: Vec<String> = spec
            .categories
            .iter()
            .map(|c| format!("#{c}").black().on_yellow().to_string())
            .collect();
        output.push_str(&format!(
            "{} has {} ACs of which {} are tested {}\n",
            spec.file_name.bold(),
            count,
            referenced,
            categories.join(", ")
        ));

        if verbose {
            output.push_str(&format!("  File: {}\n", spec.path.display()));
            output.push_str(&format!(
                "  Unreferenced ACs: {}\n",
                spec.unreferenced_criteria.join(", ")
            ));
            if !spec.test_references.is_empty() {
                output.push_str(&format!("  {}\n", "Test references".green().bold()));
                for (code, files) in &spec.test_references {
                    let files: Vec<String> =
                        files.iter().map(|f| f.display().to_string()).collect();
                    output.push_str(&format!(
                        "    {}: {} ({})\n",
                        code.green(),
                        files.len(),
                        files.join(", ")
                    ));
                }
            }
        }
    }
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

fn render_mysteries(mysteries: &[Mystery]) -> String {
    let mut output = format!(
        "{} referenced in tests, not found in specs:\n",
        "Mystery criteria".red().bold()
    );
    for mystery in mysteries {
        output.push_str(&format!("  {}: {}", mystery.code.bold(), mystery.files.join(", ")));
        if let Some(suggestion) = &mystery.suggestion {
            output.push_str(&format!(" (did you mean {}?)", suggestion.green()));
        }
        output.push('\n');
    }
    output.push('\n');
    output
}

pub fn render_text(run: &ReferenceRun, options: &ReferenceOptions) -> String {
    let report = &run.report;
    let mut output = String::new();

    if options.show_files {
        output.push_str(&render_files(run, options.verbose));
    }

    let mysteries = run.mysteries();
    if options.mystery && !mysteries.is_empty() {
        output.push_str(&render_mysteries(&mysteries));
    }

    if !options.category_stats {
        output.push_str(&format!(
            "{}:       {}\n",
            "Total criteria".bold(),
            report.criteria_total
        ));
        output.push_str(&format!(
            "{}:      {} ({})\n",
            "With references".green().bold(),
            report.criteria_referenced_total,
            colored_percent(report.referenced_percent())
        ));
        output.push_str(&format!(
            "{}:   {} ({})\n",
            "Without references".red().bold(),
            report.criteria_unreferenced_total,
            percent_cell(report.unreferenced_percent())
        ));
    }
    if options.mystery {
        output.push_str(&format!(
            "{}:     {}\n",
            "Mystery criteria".red().bold(),
            report.mystery_count()
        ));
    }

    if options.file_stats {
        output.push('\n');
        output.push_str(&run.file_table().render());
    }

    let features = &run.registries.features;
    if features.is_set() {
        output.push('\n');
        output.push_str(&render_rejected(features.rejected()));
        let declared: HashSet<&str> = report
            .all_criteria_in_specs
            .iter()
            .map(String::as_str)
            .collect();
        output.push_str(&render_feature_issues(&features.audit(&declared)));
        output.push_str(&run.milestone_table().render());
    }

    if options.category_stats {
        output.push('\n');
        output.push_str(&run.category_table().render());
    }

    output
}

#[derive(Facet)]
struct JsonReport {
    criteria_total: usize,
    criteria_referenced_total: usize,
    criteria_unreferenced_total: usize,
    criteria_referenced_percent: Option<f64>,
    criteria_unreferenced_percent: Option<f64>,
    mystery: Vec<Mystery>,
    files: Vec<JsonSpec>,
    categories: Vec<JsonTally>,
    features: Vec<JsonFeature>,
}

#[derive(Facet)]
struct JsonSpec {
    file: String,
    code: String,
    priority: u8,
    categories: Vec<String>,
    criteria: usize,
    covered: usize,
    feature_covered: usize,
    system_test_covered: usize,
    uncovered: usize,
    unreferenced: Vec<String>,
}

#[derive(Facet)]
struct JsonTally {
    name: String,
    spec_count: usize,
    acceptable_spec_count: usize,
    codes: usize,
    covered: usize,
    uncovered: usize,
    feature_covered: usize,
    system_test_covered: usize,
}

#[derive(Facet)]
struct JsonFeature {
    name: String,
    milestone: String,
    acs: Vec<String>,
    covered: usize,
    feature_covered: usize,
    system_test_covered: usize,
    uncovered: usize,
    uncovered_acs: Vec<String>,
}

fn json_tally(name: &str, tally: &Tally) -> JsonTally {
    JsonTally {
        name: name.to_string(),
        spec_count: tally.get(Counter::SpecCount),
        acceptable_spec_count: tally.get(Counter::AcceptableSpecCount),
        codes: tally.get(Counter::Codes),
        covered: tally.get(Counter::Covered),
        uncovered: tally.get(Counter::Uncovered),
        feature_covered: tally.get(Counter::FeatureCovered),
        system_test_covered: tally.get(Counter::SystemTestCovered),
    }
}

/// Rounded the same way the text report displays it
fn one_decimal(percent: Percent) -> Option<f64> {
    percent.value().map(|v| (v * 10.0).round() / 10.0)
}

pub fn render_json(run: &ReferenceRun) -> Result<String> {
    let report = &run.report;
    let mut categories: Vec<JsonTally> = run
        .registries
        .categories
        .iter()
        .map(|c| json_tally(&c.name, &c.tally))
        .collect();
    categories.push(json_tally(TOTAL, &report.total));

    let json_report = JsonReport {
        criteria_total: report.criteria_total,
        criteria_referenced_total: report.criteria_referenced_total,
        criteria_unreferenced_total: report.criteria_unreferenced_total,
        criteria_referenced_percent: one_decimal(report.referenced_percent()),
        criteria_unreferenced_percent: one_decimal(report.unreferenced_percent()),
        mystery: run.mysteries(),
        files: run
            .specs
            .iter()
            .map(|spec| JsonSpec {
                file: spec.file_name.clone(),
                code: spec.code.clone(),
                priority: spec.priority,
                categories: spec.categories.clone(),
                criteria: spec.count,
                covered: spec.referenced,
                feature_covered: spec.referenced_by_feature,
                system_test_covered: spec.referenced_by_system_test,
                uncovered: spec.uncovered,
                unreferenced: spec.unreferenced_criteria.clone(),
            })
            .collect(),
        categories,
        features: run
            .registries
            .features
            .iter()
            .map(|f| JsonFeature {
                name: f.name.clone(),
                milestone: f.milestone.clone(),
                acs: f.acs.clone(),
                covered: f.tally.get(Counter::Covered),
                feature_covered: f.tally.get(Counter::FeatureCovered),
                system_test_covered: f.tally.get(Counter::SystemTestCovered),
                uncovered: f.tally.get(Counter::Uncovered),
                uncovered_acs: f.uncovered_acs.iter().cloned().collect(),
            })
            .collect(),
    };

    facet_json::to_string_pretty(&json_report)
        .map_err(|e| eyre::eyre!("JSON serialization failed: {e:?}"))
}
