//! Integration tests for the OEX CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an oex command
fn oex() -> Command {
    Command::cargo_bin("oex").unwrap()
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    oex().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a quiet create command and return the printed ID
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = oex()
        .current_dir(tmp.path())
        .arg("-q")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = oex().current_dir(tmp.path()).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Two elements, three processes and a handful of measures
fn setup_framework() -> TempDir {
    let tmp = setup_test_project();
    create(&tmp, &["element", "new", "1", "Leadership"]);
    create(&tmp, &["element", "new", "2", "Operations"]);
    create(&tmp, &["proc", "new", "OE-1.10", "Annual Planning"]);
    create(&tmp, &["proc", "new", "OE-1.2", "Management Review"]);
    create(&tmp, &["proc", "new", "OE-2.1", "Shift Handover"]);
    create(
        &tmp,
        &["kpi", "new", "OE-1.2", "Budget variance", "-c", "financial"],
    );
    create(
        &tmp,
        &["kpi", "new", "OE-1.2", "Cost per review", "-c", "financial"],
    );
    create(
        &tmp,
        &["kpi", "new", "OE-2.1", "Handover defects", "-c", "internal_process"],
    );
    create(&tmp, &["kpi", "new", "OE-2.1", "Morale pulse"]);
    tmp
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    oex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operational Excellence"));
}

#[test]
fn test_version_displays() {
    oex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oex"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    oex()
        .current_dir(tmp.path())
        .args(["element", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();
    oex()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized OEX project"));

    assert!(tmp.path().join(".oex").is_dir());
    assert!(tmp.path().join(".oex/config.yaml").exists());
}

#[test]
fn test_init_twice_is_not_an_error() {
    let tmp = setup_test_project();
    oex()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Element Tests
// ============================================================================

#[test]
fn test_element_new_and_list() {
    let tmp = setup_test_project();
    let id = create(&tmp, &["element", "new", "1", "Leadership"]);
    assert!(id.starts_with("ELEM-"));

    oex()
        .current_dir(tmp.path())
        .args(["element", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Leadership"))
        .stdout(predicate::str::contains("1 element(s) found."));
}

#[test]
fn test_element_list_empty() {
    let tmp = setup_test_project();
    oex()
        .current_dir(tmp.path())
        .args(["element", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No elements found."));
}

#[test]
fn test_duplicate_element_number_rejected() {
    let tmp = setup_test_project();
    create(&tmp, &["element", "new", "1", "Leadership"]);
    oex()
        .current_dir(tmp.path())
        .args(["element", "new", "1", "Another"])
        .assert()
        .failure();
}

#[test]
fn test_element_list_sorted_by_number() {
    let tmp = setup_test_project();
    create(&tmp, &["element", "new", "10", "Emergency Management"]);
    create(&tmp, &["element", "new", "2", "Operations"]);
    create(&tmp, &["element", "new", "1", "Leadership"]);

    let csv = stdout_of(&tmp, &["element", "list", "-f", "csv"]);
    let numbers: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').next())
        .collect();
    assert_eq!(numbers, vec!["1", "2", "10"]);
}

#[test]
fn test_inactive_elements_hidden_unless_all() {
    let tmp = setup_test_project();
    create(&tmp, &["element", "new", "1", "Leadership"]);
    create(&tmp, &["element", "new", "2", "Retired"]);
    oex()
        .current_dir(tmp.path())
        .args(["element", "update", "2", "--active", "false"])
        .assert()
        .success();

    let active = stdout_of(&tmp, &["element", "list", "-f", "csv"]);
    assert!(!active.contains("Retired"));

    let all = stdout_of(&tmp, &["element", "list", "--all", "-f", "csv"]);
    assert!(all.contains("Retired"));
}

// ============================================================================
// Process Tests
// ============================================================================

#[test]
fn test_proc_element_inferred_from_number() {
    let tmp = setup_test_project();
    create(&tmp, &["element", "new", "3", "Risk Management"]);
    create(&tmp, &["proc", "new", "OE-3.1", "Hazard Review"]);

    let csv = stdout_of(&tmp, &["proc", "list", "-f", "csv"]);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with("OE-3.1,Hazard Review,3,"));
}

#[test]
fn test_proc_without_matching_element_fails() {
    let tmp = setup_test_project();
    oex()
        .current_dir(tmp.path())
        .args(["proc", "new", "OE-9.1", "Orphan"])
        .assert()
        .failure();
}

#[test]
fn test_proc_list_natural_order() {
    let tmp = setup_framework();
    let csv = stdout_of(&tmp, &["proc", "list", "-f", "csv"]);
    let numbers: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').next())
        .collect();
    assert_eq!(numbers, vec!["OE-1.2", "OE-1.10", "OE-2.1"]);
}

#[test]
fn test_proc_list_filter_by_element() {
    let tmp = setup_framework();
    let csv = stdout_of(&tmp, &["proc", "list", "-e", "2", "-f", "csv"]);
    assert!(csv.contains("OE-2.1"));
    assert!(!csv.contains("OE-1.2"));
}

#[test]
fn test_proc_update_risk_shows_level() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args([
            "proc",
            "update",
            "OE-1.2",
            "--risk-frequency",
            "high",
            "--risk-impact",
            "high",
        ])
        .assert()
        .success();

    oex()
        .current_dir(tmp.path())
        .args(["proc", "show", "OE-1.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("high"));
}

// ============================================================================
// Step Tests
// ============================================================================

#[test]
fn test_steps_and_decision_links() {
    let tmp = setup_framework();
    create(&tmp, &["step", "add", "OE-1.2", "1", "Collect results"]);
    create(
        &tmp,
        &["step", "add", "OE-1.2", "2", "Targets met?", "-t", "decision"],
    );
    create(&tmp, &["step", "add", "OE-1.2", "3", "Close review"]);
    let outcome = create(&tmp, &["step", "link", "OE-1.2#2", "3", "Yes", "-p", "1"]);
    assert!(outcome.starts_with("OUT-"));
    create(&tmp, &["step", "link", "OE-1.2#2", "1", "No"]);

    let csv = stdout_of(&tmp, &["step", "list", "OE-1.2", "-f", "csv"]);
    let decision = csv.lines().find(|l| l.starts_with("2,")).unwrap();
    assert!(decision.contains("Targets met?"));
    assert!(decision.contains("Yes→3"));
    assert!(decision.contains("No→1"));
}

#[test]
fn test_link_from_task_step_rejected() {
    let tmp = setup_framework();
    create(&tmp, &["step", "add", "OE-1.2", "1", "Collect results"]);
    oex()
        .current_dir(tmp.path())
        .args(["step", "link", "OE-1.2#1", "2", "Next"])
        .assert()
        .failure();
}

// ============================================================================
// Scorecard Tests
// ============================================================================

#[test]
fn test_scorecard_counts_distinct_processes() {
    let tmp = setup_framework();
    let json = stdout_of(&tmp, &["scorecard", "-f", "json"]);
    let card: serde_json::Value = serde_json::from_str(&json).unwrap();

    let categories = card["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0]["category"], "Financial");
    // Two financial measures on the same process count once
    assert_eq!(categories[0]["count"], 1);
    assert_eq!(categories[1]["count"], 0);
    assert_eq!(categories[2]["category"], "Internal Process");
    assert_eq!(categories[2]["count"], 1);
    assert_eq!(card["uncategorized"].as_array().unwrap().len(), 1);
}

#[test]
fn test_scorecard_table_mentions_hidden_measures() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .arg("scorecard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Learning & Growth"))
        .stdout(predicate::str::contains("--show-other"));
}

#[test]
fn test_scorecard_by_element_csv_and_markdown() {
    let tmp = setup_framework();

    let csv = stdout_of(&tmp, &["scorecard", "--by-element", "-f", "csv"]);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("element_number,element,category,processes,measures")
    );
    assert!(csv.contains("1,Leadership,Financial,1,2\n"));
    assert!(csv.contains("2,Operations,Internal Process,1,1\n"));
    assert!(csv.contains("2,Operations,Uncategorized,,1\n"));

    let md = stdout_of(&tmp, &["scorecard", "--by-element", "-f", "md"]);
    assert!(md.contains("## 1. Leadership"));
    assert!(md.contains("## 2. Operations"));
    assert!(md.contains("| Financial | 1 | 2 |"));
    assert!(!md.contains("CATEGORY"));
}

#[test]
fn test_scorecard_empty_project() {
    let tmp = setup_test_project();
    oex()
        .current_dir(tmp.path())
        .args(["scorecard", "--by-element"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No performance measures recorded."));
}

// ============================================================================
// Map Tests
// ============================================================================

#[test]
fn test_map_elements_tree() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args(["map", "elements"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Operational Excellence"))
        .stdout(predicate::str::contains("1. Leadership"))
        .stdout(predicate::str::contains("OE-1.2 Management Review"));
}

#[test]
fn test_map_json_has_edges_for_every_node() {
    let tmp = setup_framework();
    let json = stdout_of(&tmp, &["map", "elements", "-f", "json"]);
    let map: serde_json::Value = serde_json::from_str(&json).unwrap();
    let nodes = map["nodes"].as_array().unwrap().len();
    let edges = map["edges"].as_array().unwrap().len();
    // root + 2 elements + 3 processes
    assert_eq!(nodes, 6);
    assert_eq!(edges, nodes - 1);
}

#[test]
fn test_map_goals_lists_linked_process() {
    let tmp = setup_framework();
    let goal = create(
        &tmp,
        &["goal", "new", "1", "Reduce overspend", "-c", "financial"],
    );
    create(&tmp, &["kpi", "new", "OE-1.10", "Plan accuracy", "-g", &goal]);

    oex()
        .current_dir(tmp.path())
        .args(["map", "goals"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Strategic Goals"))
        .stdout(predicate::str::contains("Reduce overspend"))
        .stdout(predicate::str::contains("OE-1.10"));
}

// ============================================================================
// Export Tests
// ============================================================================

#[test]
fn test_export_text_has_page_footer() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args(["export", "elements"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operational Excellence Framework"))
        .stdout(predicate::str::contains("[page 1 of"));
}

#[test]
fn test_export_blocks_json() {
    let tmp = setup_framework();
    let json = stdout_of(&tmp, &["export", "elements", "--as", "blocks"]);
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(doc["pages"].as_u64().unwrap() >= 1);
    let blocks = doc["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["type"], "heading");
}

#[test]
fn test_export_csv_to_file() {
    let tmp = setup_framework();
    let out = tmp.path().join("processes.csv");
    oex()
        .current_dir(tmp.path())
        .args(["export", "elements", "--as", "csv", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    let first_numbers: Vec<_> = ["OE-1.2", "OE-1.10", "OE-2.1"]
        .iter()
        .map(|n| content.find(n).unwrap())
        .collect();
    assert!(first_numbers.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_elements_markdown() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args(["report", "elements"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## 1. Leadership"))
        .stdout(predicate::str::contains("| OE-1.2"))
        .stdout(predicate::str::contains("**Processes:** 3"));
}

#[test]
fn test_report_risk_without_scores() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args(["report", "risk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_No scored risks._"))
        .stdout(predicate::str::contains("**Not assessed:** 3"));
}

// ============================================================================
// Delete Cascade Tests
// ============================================================================

#[test]
fn test_element_delete_cascades() {
    let tmp = setup_framework();
    create(&tmp, &["step", "add", "OE-2.1", "1", "Brief next shift"]);

    oex()
        .current_dir(tmp.path())
        .args(["element", "delete", "2", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    let csv = stdout_of(&tmp, &["proc", "list", "-f", "csv"]);
    assert!(!csv.contains("OE-2.1"));

    let kpis = stdout_of(&tmp, &["kpi", "list", "-f", "csv"]);
    assert!(!kpis.contains("Handover defects"));
    assert!(kpis.contains("Budget variance"));
}

#[test]
fn test_goal_delete_clears_measure_links() {
    let tmp = setup_framework();
    let goal = create(
        &tmp,
        &["goal", "new", "1", "Reduce overspend", "-c", "financial"],
    );
    create(&tmp, &["kpi", "new", "OE-1.10", "Plan accuracy", "-g", &goal]);

    oex()
        .current_dir(tmp.path())
        .args(["goal", "delete", &goal, "--yes"])
        .assert()
        .success();

    let kpis = stdout_of(&tmp, &["kpi", "list", "-f", "csv"]);
    assert!(kpis.contains("Plan accuracy"));
    assert!(!kpis.contains(&goal));
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_template_prints_headers() {
    let tmp = setup_test_project();
    oex()
        .current_dir(tmp.path())
        .args(["import", "elements", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("number,title"));
}

#[test]
fn test_import_elements_and_processes() {
    let tmp = setup_test_project();
    let elements = tmp.path().join("elements.csv");
    fs::write(&elements, "number,title\n1,Leadership\n2,Operations\n").unwrap();
    let processes = tmp.path().join("processes.csv");
    fs::write(
        &processes,
        "number,name,status\nOE-1.1,Planning,active\nOE-2.4,Handover,draft\n",
    )
    .unwrap();

    oex()
        .current_dir(tmp.path())
        .args(["import", "elements"])
        .arg(&elements)
        .assert()
        .success()
        .stdout(predicate::str::contains("Import Summary"));
    oex()
        .current_dir(tmp.path())
        .args(["import", "processes"])
        .arg(&processes)
        .assert()
        .success();

    let csv = stdout_of(&tmp, &["proc", "list", "-f", "csv"]);
    assert!(csv.contains("OE-1.1,Planning,1,active"));
    assert!(csv.contains("OE-2.4,Handover,2,draft"));
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let tmp = setup_test_project();
    let elements = tmp.path().join("elements.csv");
    fs::write(&elements, "number,title\n1,Leadership\n").unwrap();

    oex()
        .current_dir(tmp.path())
        .args(["import", "elements", "--dry-run"])
        .arg(&elements)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would create"));

    oex()
        .current_dir(tmp.path())
        .args(["element", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No elements found."));
}

#[test]
fn test_import_stops_on_bad_row() {
    let tmp = setup_test_project();
    let elements = tmp.path().join("elements.csv");
    fs::write(&elements, "number,title\nx,Broken\n").unwrap();

    oex()
        .current_dir(tmp.path())
        .args(["import", "elements"])
        .arg(&elements)
        .assert()
        .failure();
}

#[test]
fn test_import_skip_errors_counts_skipped_rows() {
    let tmp = setup_test_project();
    let elements = tmp.path().join("elements.csv");
    fs::write(&elements, "number,title\nx,Broken\n2,Planning\n").unwrap();

    oex()
        .current_dir(tmp.path())
        .args(["import", "elements", "--skip-errors"])
        .arg(&elements)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped:"))
        .stdout(predicate::str::contains("Records created:  1"));

    let list = stdout_of(&tmp, &["element", "list", "-f", "id"]);
    assert_eq!(list.lines().count(), 1);
}

// ============================================================================
// Status, Validate and Log Tests
// ============================================================================

#[test]
fn test_status_json() {
    let tmp = setup_framework();
    let json = stdout_of(&tmp, &["status", "-f", "json"]);
    let status: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(status["framework"]["elements"], 2);
    assert_eq!(status["framework"]["processes"], 3);
    assert_eq!(status["measures"]["measures"], 4);
}

#[test]
fn test_validate_clean_project() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All records valid"));
}

#[test]
fn test_validate_reports_broken_record() {
    let tmp = setup_framework();
    let id = create(&tmp, &["element", "new", "5", "Contractors"]);
    let broken = tmp.path().join("elements").join(format!("{}.oex.yaml", id));
    assert!(broken.exists());
    fs::write(&broken, "id: [unclosed\n").unwrap();

    oex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure();
}

#[test]
fn test_log_records_creates() {
    let tmp = setup_framework();
    oex()
        .current_dir(tmp.path())
        .args(["log", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    oex()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oex"));
}
