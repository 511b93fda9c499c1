use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use predicates::str::contains;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("finance_core_cli").unwrap();
    cmd.env("FINANCE_CORE_HOME", home.path()).env("NO_COLOR", "1");
    cmd
}

/// First column of the list line matching `needle`.
fn listed_id(home: &TempDir, book: &str, needle: &str) -> String {
    let output = cli(home).args(["list", book]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout
        .lines()
        .find(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no list line contains `{needle}`"));
    line.split_whitespace().next().unwrap().to_string()
}

#[test]
fn no_arguments_prints_usage() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .assert()
        .failure()
        .stderr(contains("Usage: finance_core_cli"));
}

#[test]
fn unknown_books_report_an_error() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["list", "nowhere"])
        .assert()
        .failure()
        .stderr(contains("Error:"));
}

#[test]
fn new_add_list_runs_the_basic_flow() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["new", "demo"])
        .assert()
        .success()
        .stdout(contains("Created book `demo`"));
    home.child("books/demo.json")
        .assert(predicates::path::exists());

    cli(&home)
        .args([
            "add",
            "demo",
            "payable",
            "Laptop",
            "Equipment",
            "1200",
            "2030-01-15",
            "installments:3",
        ])
        .assert()
        .success()
        .stdout(contains("Recorded 3 entries:"))
        .stdout(contains("Laptop (1/3)"));

    cli(&home)
        .args(["list", "demo", "pending"])
        .assert()
        .success()
        .stdout(contains("pending"))
        .stdout(contains("3 entries"));
}

#[test]
fn settle_flows_through_a_listed_id() {
    let home = TempDir::new().unwrap();
    cli(&home).args(["new", "demo"]).assert().success();
    cli(&home)
        .args([
            "add",
            "demo",
            "payable",
            "Groceries",
            "Food",
            "82.50",
            "2030-02-01",
        ])
        .assert()
        .success();

    let id = listed_id(&home, "demo", "Groceries");
    cli(&home)
        .args(["settle", "demo", &id, "2030-02-01"])
        .assert()
        .success()
        .stdout(contains("Settled `Groceries` on 2030-02-01"));

    cli(&home)
        .args(["list", "demo", "settled"])
        .assert()
        .success()
        .stdout(contains("1 entry"));
}

#[test]
fn series_mutations_honor_scope_flags() {
    let home = TempDir::new().unwrap();
    cli(&home).args(["new", "demo"]).assert().success();
    cli(&home)
        .args([
            "add",
            "demo",
            "payable",
            "Gym",
            "Health",
            "40",
            "2030-01-01",
            "recurring:3",
        ])
        .assert()
        .success();

    let second = listed_id(&home, "demo", "Gym (2/3)");
    cli(&home)
        .args(["edit", "demo", &second, "amount=45", "--this-and-future"])
        .assert()
        .success()
        .stdout(contains("Updated 2 entries"));

    cli(&home)
        .args(["delete", "demo", &second, "--only-this"])
        .assert()
        .success()
        .stdout(contains("Deleted 1 entry"));

    cli(&home)
        .args(["list", "demo"])
        .assert()
        .success()
        .stdout(contains("2 entries"));
}

#[test]
fn a_card_cycle_closes_into_one_invoice() {
    let home = TempDir::new().unwrap();
    cli(&home).args(["new", "demo"]).assert().success();

    let output = cli(&home)
        .args(["card", "demo", "Visa", "5", "15"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let card_id = stdout
        .split('(')
        .nth(1)
        .and_then(|rest| rest.split(')').next())
        .expect("card id in output")
        .to_string();

    // Day 10 is past closing day 5, so the charge lands in the April cycle.
    cli(&home)
        .args([
            "add", "demo", "payable", "Dinner", "Food", "60", "2030-03-10", "single", &card_id,
        ])
        .assert()
        .success();

    cli(&home)
        .args(["close", "demo", &card_id, "2030-04"])
        .assert()
        .success()
        .stdout(contains("Closed cycle 2030-04"))
        .stdout(contains("Visa invoice - 2030-04"))
        .stdout(contains("due 2030-04-15"));

    cli(&home)
        .args(["close", "demo", &card_id, "2030-04"])
        .assert()
        .failure()
        .stderr(contains("is already closed"));
}

#[test]
fn income_rules_fire_from_recorded_salaries() {
    let home = TempDir::new().unwrap();
    cli(&home).args(["new", "demo"]).assert().success();
    cli(&home)
        .args(["rule", "demo", "Savings", "percentage", "10", "Savings"])
        .assert()
        .success()
        .stdout(contains("Added rule `Savings`"));

    cli(&home)
        .args([
            "add",
            "demo",
            "receivable",
            "Salary",
            "Income",
            "1000",
            "2030-01-25",
        ])
        .assert()
        .success();

    cli(&home)
        .args(["list", "demo"])
        .assert()
        .success()
        .stdout(contains("[Auto] Savings - Salary [Savings]"))
        .stdout(contains("2 entries"));
}
