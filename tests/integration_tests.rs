//! Integration tests for the QMT CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a qmt command with a stable author and no inherited acting user
fn qmt() -> Command {
    let mut cmd = Command::cargo_bin("qmt").unwrap();
    cmd.env("QMT_AUTHOR", "test");
    cmd.env_remove("QMT_USER");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    qmt().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to add a directory user
fn create_user(tmp: &TempDir, email: &str, name: &str, account_type: &str) {
    qmt()
        .current_dir(tmp.path())
        .args([
            "user",
            "new",
            email,
            "--name",
            name,
            "--account-type",
            account_type,
        ])
        .assert()
        .success();
}

/// Extract a record ID with the given prefix from command output
fn extract_id(stdout: &str, prefix: &str) -> String {
    let want = format!("{}-", prefix);
    stdout
        .split_whitespace()
        .find(|w| w.starts_with(&want))
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Helper to create an organisation and return its ID
fn create_org(tmp: &TempDir, name: &str) -> String {
    let output = qmt()
        .current_dir(tmp.path())
        .args(["org", "new", "--name", name])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_id(&String::from_utf8_lossy(&output.stdout), "ORG")
}

/// Helper to create a risk and return its ID
fn create_risk(tmp: &TempDir, title: &str, likelihood: &str, impact: &str) -> String {
    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "risk",
            "new",
            "--title",
            title,
            "--identified-by",
            "qa@acme.test",
            "--likelihood",
            likelihood,
            "--impact",
            impact,
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_id(&String::from_utf8_lossy(&output.stdout), "RISK")
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    qmt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quality Management Toolkit"));
}

#[test]
fn test_init_creates_structure() {
    let tmp = TempDir::new().unwrap();
    qmt().current_dir(tmp.path()).arg("init").assert().success();

    assert!(tmp.path().join(".qmt/config.yaml").exists());
    assert!(tmp.path().join("organisation/organisations").is_dir());
    assert!(tmp.path().join("planning/risks").is_dir());
    assert!(tmp.path().join("support/document_registers").is_dir());
}

#[test]
fn test_init_twice_fails() {
    let tmp = setup_test_project();
    qmt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a QMT project"));
}

// ============================================================================
// User Directory Tests
// ============================================================================

#[test]
fn test_user_new_and_list() {
    let tmp = setup_test_project();
    create_user(&tmp, "qa@acme.test", "Quinn Adler", "customer");

    qmt()
        .current_dir(tmp.path())
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qa@acme.test"))
        .stdout(predicate::str::contains("Quinn Adler"));
}

#[test]
fn test_duplicate_user_email_rejected() {
    let tmp = setup_test_project();
    create_user(&tmp, "qa@acme.test", "Quinn Adler", "customer");

    qmt()
        .current_dir(tmp.path())
        .args(["user", "new", "qa@acme.test", "--name", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_duplicate_user_phone_rejected() {
    let tmp = setup_test_project();
    qmt()
        .current_dir(tmp.path())
        .args([
            "user", "new", "a@acme.test", "--name", "A", "--phone", "+1555000001",
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args([
            "user", "new", "b@acme.test", "--name", "B", "--phone", "+1555000001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Organisation Tests
// ============================================================================

#[test]
fn test_org_unique_name() {
    let tmp = setup_test_project();
    create_org(&tmp, "Acme Ltd");

    qmt()
        .current_dir(tmp.path())
        .args(["org", "new", "--name", "Acme Ltd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_org_representative_must_exist() {
    let tmp = setup_test_project();
    qmt()
        .current_dir(tmp.path())
        .args([
            "org",
            "new",
            "--name",
            "Acme Ltd",
            "--representative",
            "nobody@acme.test",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the user directory"));
}

// ============================================================================
// Score Computation Tests (Risk / Opportunity)
// ============================================================================

#[test]
fn test_risk_score_computed_on_create() {
    let tmp = setup_test_project();
    let id = create_risk(&tmp, "Supplier delivery failure", "4", "3");
    assert!(id.starts_with("RISK-"));

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("score: 12"));
}

#[test]
fn test_risk_score_idempotent_across_saves() {
    let tmp = setup_test_project();
    let id = create_risk(&tmp, "Supplier delivery failure", "4", "3");

    // A status write goes through the same save path; the score must not move
    qmt()
        .current_dir(tmp.path())
        .args(["transition", id.as_str(), "mitigated"])
        .assert()
        .success();
    qmt()
        .current_dir(tmp.path())
        .args(["transition", id.as_str(), "open"])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("score: 12"))
        .stdout(predicate::str::contains("status: open"));
}

#[test]
fn test_risk_score_unset_with_single_factor() {
    let tmp = setup_test_project();
    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "risk",
            "new",
            "--title",
            "Partial assessment",
            "--identified-by",
            "qa@acme.test",
            "--likelihood",
            "4",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "RISK");

    let show = qmt()
        .current_dir(tmp.path())
        .args(["risk", "show", id.as_str()])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert!(stdout.contains("likelihood: 4"));
    assert!(!stdout.contains("score:"));
}

#[test]
fn test_opportunity_score_computed() {
    let tmp = setup_test_project();
    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "opp",
            "new",
            "--title",
            "Automate inspection reports",
            "--identified-by",
            "qa@acme.test",
            "--benefit",
            "5",
            "--feasibility",
            "4",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "OPP");

    qmt()
        .current_dir(tmp.path())
        .args(["opp", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("score: 20"));
}

#[test]
fn test_bulk_import_computes_scores() {
    let tmp = setup_test_project();

    let csv_path = tmp.path().join("risks.csv");
    fs::write(
        &csv_path,
        "title,likelihood,impact,identified_by\n\
         Supplier failure,4,3,qa@acme.test\n\
         Data loss,5,5,qa@acme.test\n",
    )
    .unwrap();

    qmt()
        .current_dir(tmp.path())
        .args(["import", "risks", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 record(s)"));

    let list = qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "json"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("\"score\": 12"));
    assert!(stdout.contains("\"score\": 25"));
}

#[test]
fn test_validate_detects_stale_score() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier delivery failure", "4", "3");

    // Hand-edit the file behind the save hook's back
    let risks_dir = tmp.path().join("planning/risks");
    let file = fs::read_dir(&risks_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let content = fs::read_to_string(&file).unwrap();
    fs::write(&file, content.replace("score: 12", "score: 5")).unwrap();

    qmt()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("disagrees"));
}

// ============================================================================
// User Deletion Policy Tests
// ============================================================================

#[test]
fn test_delete_user_with_protected_reference_rejected() {
    let tmp = setup_test_project();
    create_user(&tmp, "qa@acme.test", "Quinn Adler", "customer");
    create_risk(&tmp, "Supplier delivery failure", "2", "2");

    qmt()
        .current_dir(tmp.path())
        .args(["user", "delete", "qa@acme.test", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("protected"));

    // The user survives
    qmt()
        .current_dir(tmp.path())
        .args(["user", "show", "qa@acme.test"])
        .assert()
        .success();
}

#[test]
fn test_delete_user_with_set_null_reference_succeeds() {
    let tmp = setup_test_project();
    create_user(&tmp, "coord@acme.test", "Cory Diaz", "customer");
    let org_id = create_org(&tmp, "Acme Ltd");

    qmt()
        .current_dir(tmp.path())
        .args([
            "org",
            "dept-add",
            org_id.as_str(),
            "Operations",
            "--coordinator",
            "coord@acme.test",
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["user", "delete", "coord@acme.test", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("attribution(s) cleared"));

    // The department survives with the coordinator nulled
    let show = qmt()
        .current_dir(tmp.path())
        .args(["org", "show", org_id.as_str()])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert!(stdout.contains("Operations"));
    assert!(!stdout.contains("coord@acme.test"));
}

#[test]
fn test_delete_commitment_leader_rejected() {
    let tmp = setup_test_project();
    create_user(&tmp, "ceo@acme.test", "Casey Osei", "customer");

    qmt()
        .current_dir(tmp.path())
        .args([
            "commitment",
            "new",
            "--title",
            "Provide resources for the QMS",
            "--leader",
            "ceo@acme.test",
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["user", "delete", "ceo@acme.test", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("protected"));
}

// ============================================================================
// Accountability Uniqueness Tests
// ============================================================================

#[test]
fn test_duplicate_accountability_rejected() {
    let tmp = setup_test_project();

    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "commitment",
            "new",
            "--title",
            "Quality culture",
            "--leader",
            "ceo@acme.test",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "LEAD");

    qmt()
        .current_dir(tmp.path())
        .args([
            "commitment",
            "assign",
            id.as_str(),
            "qa@acme.test",
            "--role",
            "QMS Sponsor",
        ])
        .assert()
        .success();

    // Same (user, role) pair is rejected
    qmt()
        .current_dir(tmp.path())
        .args([
            "commitment",
            "assign",
            id.as_str(),
            "qa@acme.test",
            "--role",
            "QMS Sponsor",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // A different role for the same user is fine
    qmt()
        .current_dir(tmp.path())
        .args([
            "commitment",
            "assign",
            id.as_str(),
            "qa@acme.test",
            "--role",
            "Process Owner",
        ])
        .assert()
        .success();
}

// ============================================================================
// Scoped Listing Tests
// ============================================================================

#[test]
fn test_org_list_scoping() {
    let tmp = setup_test_project();
    create_user(&tmp, "admin@acme.test", "Admin", "administrator");
    create_user(&tmp, "rep@acme.test", "Rhea Patel", "customer");
    create_user(&tmp, "staff@acme.test", "Sam Staff", "customer");

    qmt()
        .current_dir(tmp.path())
        .args([
            "org",
            "new",
            "--name",
            "Acme Ltd",
            "--representative",
            "rep@acme.test",
        ])
        .assert()
        .success();
    let globex_id = create_org(&tmp, "Globex");

    // Superuser sees all
    let all = qmt()
        .current_dir(tmp.path())
        .args(["org", "list", "--as", "admin@acme.test", "-f", "id"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&all.stdout).lines().count(), 2);

    // Representative sees only their organisation
    let mine = qmt()
        .current_dir(tmp.path())
        .args(["org", "list", "--as", "rep@acme.test", "-f", "id"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&mine.stdout);
    assert_eq!(stdout.lines().count(), 1);

    // A member of Globex (representative of nothing) sees Globex alone
    qmt()
        .current_dir(tmp.path())
        .args(["org", "member", "add", globex_id.as_str(), "staff@acme.test"])
        .assert()
        .success();
    let member = qmt()
        .current_dir(tmp.path())
        .args(["org", "list", "--as", "staff@acme.test", "-f", "id"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&member.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains(&globex_id));
}

#[test]
fn test_duplicate_membership_rejected() {
    let tmp = setup_test_project();
    create_user(&tmp, "staff@acme.test", "Sam Staff", "customer");
    let org_id = create_org(&tmp, "Acme Ltd");

    qmt()
        .current_dir(tmp.path())
        .args(["org", "member", "add", org_id.as_str(), "staff@acme.test"])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["org", "member", "add", org_id.as_str(), "staff@acme.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a member"));
}

// ============================================================================
// Transition Guard Tests
// ============================================================================

#[test]
fn test_permissive_transitions_allow_reopening() {
    let tmp = setup_test_project();

    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "ncr",
            "new",
            "--title",
            "Late delivery",
            "--description",
            "Order 4411 shipped late",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "NCR");

    qmt()
        .current_dir(tmp.path())
        .args(["transition", id.as_str(), "closed"])
        .assert()
        .success();

    // Permissive policy: closed can go back to open
    qmt()
        .current_dir(tmp.path())
        .args(["transition", id.as_str(), "open"])
        .assert()
        .success();
}

#[test]
fn test_unknown_status_rejected() {
    let tmp = setup_test_project();

    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "ncr",
            "new",
            "--title",
            "Late delivery",
            "--description",
            "Order shipped late",
        ])
        .output()
        .unwrap();
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "NCR");

    qmt()
        .current_dir(tmp.path())
        .args(["transition", id.as_str(), "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown status"));
}

#[test]
fn test_bulk_transition() {
    let tmp = setup_test_project();
    let a = create_risk(&tmp, "First risk", "2", "2");
    let b = create_risk(&tmp, "Second risk", "3", "3");

    qmt()
        .current_dir(tmp.path())
        .args(["bulk", "transition", a.as_str(), b.as_str(), "--to", "mitigated"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 record(s) changed"));

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "--status", "mitigated", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

// ============================================================================
// End-to-End Cascade Scenario
// ============================================================================

#[test]
fn test_organisation_cascade_delete() {
    let tmp = setup_test_project();
    create_user(&tmp, "coord@acme.test", "Cory Diaz", "customer");
    let org_id = create_org(&tmp, "Acme Ltd");

    qmt()
        .current_dir(tmp.path())
        .args([
            "org",
            "dept-add",
            org_id.as_str(),
            "Operations",
            "--coordinator",
            "coord@acme.test",
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args([
            "employee", "new", "--org", org_id.as_str(), "--name", "Dana Osei",
        ])
        .assert()
        .success();

    let risk_output = qmt()
        .current_dir(tmp.path())
        .args([
            "risk",
            "new",
            "--title",
            "Owned risk",
            "--identified-by",
            "qa@acme.test",
            "--likelihood",
            "2",
            "--impact",
            "2",
            "--org",
            org_id.as_str(),
        ])
        .output()
        .unwrap();
    let risk_id = extract_id(&String::from_utf8_lossy(&risk_output.stdout), "RISK");

    qmt()
        .current_dir(tmp.path())
        .args([
            "response",
            "new",
            "--response-type",
            "mitigate",
            "--description",
            "Second source",
            "--owner",
            "ops@acme.test",
            "--risk",
            risk_id.as_str(),
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["org", "delete", org_id.as_str(), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record(s) removed"));

    // Departments, employees, risks and responses are gone
    for args in [
        ["employee", "list", "--count"],
        ["risk", "list", "--count"],
        ["response", "list", "--count"],
    ] {
        qmt()
            .current_dir(tmp.path())
            .args(args)
            .assert()
            .success()
            .stdout(predicate::str::contains("0"));
    }

    // The coordinator user itself is not deleted
    qmt()
        .current_dir(tmp.path())
        .args(["user", "show", "coord@acme.test"])
        .assert()
        .success();
}

#[test]
fn test_risk_delete_cascades_responses() {
    let tmp = setup_test_project();
    let risk_id = create_risk(&tmp, "Supplier failure", "2", "2");

    qmt()
        .current_dir(tmp.path())
        .args([
            "response",
            "new",
            "--response-type",
            "avoid",
            "--description",
            "Switch supplier",
            "--owner",
            "ops@acme.test",
            "--risk",
            risk_id.as_str(),
        ])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "delete", risk_id.as_str(), "--yes"])
        .assert()
        .success();

    qmt()
        .current_dir(tmp.path())
        .args(["response", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

// ============================================================================
// Attachments, Dashboard, Reports
// ============================================================================

#[test]
fn test_attach_stores_dated_file() {
    let tmp = setup_test_project();

    let output = qmt()
        .current_dir(tmp.path())
        .args([
            "ncr",
            "new",
            "--title",
            "Wrong label",
            "--description",
            "Batch 12 labelled as 13",
        ])
        .output()
        .unwrap();
    let id = extract_id(&String::from_utf8_lossy(&output.stdout), "NCR");

    let evidence = tmp.path().join("photo.jpg");
    fs::write(&evidence, b"jpeg bytes").unwrap();

    qmt()
        .current_dir(tmp.path())
        .args(["attach", id.as_str(), evidence.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("attachments/ncr/"));

    qmt()
        .current_dir(tmp.path())
        .args(["ncr", "show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("attachments/ncr/"));
}

#[test]
fn test_status_dashboard() {
    let tmp = setup_test_project();
    create_org(&tmp, "Acme Ltd");
    create_risk(&tmp, "Supplier failure", "2", "2");

    qmt()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Organisations"))
        .stdout(predicate::str::contains("Risks"))
        .stdout(predicate::str::contains("2 record(s) total"));
}

#[test]
fn test_report_risks() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier failure", "4", "5");

    qmt()
        .current_dir(tmp.path())
        .args(["report", "risks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Risk Register"))
        .stdout(predicate::str::contains("Supplier failure"))
        .stdout(predicate::str::contains("20"));
}

#[test]
fn test_report_review_renders_template() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier failure", "4", "5");

    qmt()
        .current_dir(tmp.path())
        .args(["report", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Management Review"))
        .stdout(predicate::str::contains("Open risks: 1"));
}

#[test]
fn test_validate_clean_project() {
    let tmp = setup_test_project();
    create_user(&tmp, "qa@acme.test", "Quinn Adler", "customer");
    create_risk(&tmp, "Supplier failure", "2", "3");

    qmt()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All records valid"));
}

#[test]
fn test_list_formats() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier failure", "2", "3");

    // JSON round-trips through serde
    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Supplier failure\""));

    // Markdown table has the registry columns
    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| score |").or(predicate::str::contains("score")));

    // CSV carries the registry header
    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "short_id,id,title,identified_by,identified_date,likelihood,impact,score,status",
        ));
}

#[test]
fn test_search_uses_registry_fields() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier delivery failure", "2", "3");
    create_risk(&tmp, "Server outage", "3", "3");

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "--search", "supplier", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_filter_field_must_be_declared() {
    let tmp = setup_test_project();
    create_risk(&tmp, "Supplier failure", "2", "3");

    qmt()
        .current_dir(tmp.path())
        .args(["risk", "list", "--filter", "nonsense=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a filter field"));
}
