//! Binary smoke tests for commands that need no network

use assert_cmd::Command;
use predicates::prelude::*;

fn guidechat() -> Command {
    let mut cmd = Command::cargo_bin("guidechat").expect("binary builds");
    cmd.env_remove("GUIDECHAT_API_KEY")
        .env_remove("GUIDECHAT_ENDPOINT_URL")
        .env_remove("GUIDECHAT_MODEL")
        .env_remove("GUIDECHAT_TEMPERATURE")
        .env_remove("GUIDECHAT_TIMEOUT_SECONDS")
        .env_remove("RUST_LOG")
        .args(["--config", "/nonexistent/guidechat.yaml"]);
    cmd
}

#[test]
fn test_places_table() {
    guidechat()
        .arg("places")
        .assert()
        .success()
        .stdout(predicate::str::contains("图书馆").and(predicate::str::contains("体育馆")));
}

#[test]
fn test_places_json() {
    let output = guidechat().args(["places", "--json"]).output().unwrap();
    assert!(output.status.success());

    let places: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let places = places.as_array().expect("array");
    assert_eq!(places.len(), 2);
    assert_eq!(places[0]["id"], 1);
    assert_eq!(places[0]["name"], "图书馆");
    assert_eq!(places[1]["building"], "艺体楼");
}

#[test]
fn test_ask_without_api_key_fails() {
    guidechat()
        .args(["ask", "图书馆在哪？"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GUIDECHAT_API_KEY"));
}

#[test]
fn test_ask_with_place_zero_fails() {
    guidechat()
        .env("GUIDECHAT_API_KEY", "k")
        .args(["ask", "hi", "--place", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown place id: 0"));
}

#[test]
fn test_invalid_temperature_is_rejected() {
    guidechat()
        .env("GUIDECHAT_TEMPERATURE", "5")
        .arg("places")
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}
