use contract_abi::abi::parse_types;
use contract_abi::{AbiCoder, Value};
use serde_json::Value as JsonValue;
use std::process::{Command, Output};

const ALICE: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";
const TRANSFER: &str = "function transfer(address to, uint256 amount) returns (bool)";

fn run(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("contract-abi");
    Command::new(binary_path)
        .args(args)
        .output()
        .expect("cli runs")
}

fn run_json(args: &[&str]) -> JsonValue {
    let output = run(args);
    assert!(
        output.status.success(),
        "cli exited unsuccessfully: {:?}",
        output
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

#[test]
fn cli_prints_selectors_and_topics() {
    let function = run_json(&["selector", "function transfer(address,uint256)"]);
    assert_eq!(function["selector"], "0xa9059cbb");
    assert_eq!(function["signature"], "transfer(address,uint256)");

    let event = run_json(&[
        "selector",
        "event Transfer(address indexed from, address indexed to, uint256 value)",
    ]);
    assert_eq!(
        event["topic"],
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );

    let error = run_json(&["selector", "error Unauthorized()"]);
    assert_eq!(error["type"], "error");
}

#[test]
fn cli_formats_fragments() {
    let minimal = run_json(&["format", TRANSFER, "--format", "minimal"]);
    assert_eq!(
        minimal["formatted"],
        "function transfer(address,uint256) returns (bool)"
    );

    let json = run_json(&["format", TRANSFER, "--format", "json"]);
    assert_eq!(json["name"], "transfer");
    assert_eq!(json["inputs"][1]["type"], "uint256");

    let output = run(&["format", "constructor(uint256)", "--format", "sighash"]);
    assert!(!output.status.success(), "constructor has no sighash");
}

#[test]
fn cli_encodes_and_decodes_calls() {
    let args = format!(r#"["{}", 1000]"#, ALICE);
    let encoded = run_json(&["encode", TRANSFER, &args]);
    let data = encoded["data"].as_str().expect("data is a string");
    assert!(data.starts_with("0xa9059cbb"));
    assert_eq!(data.len(), 2 + 68 * 2);

    let decoded = run_json(&["decode-call", TRANSFER, data]);
    assert_eq!(decoded["function"], "transfer(address,uint256)");
    assert_eq!(decoded["args"][0], ALICE);
    assert_eq!(decoded["args"][1], "1000");
}

#[test]
fn cli_decodes_results_and_reverts() {
    let balance_of = "function balanceOf(address owner) view returns (uint256)";
    let one = format!("0x{:0>64}", "1");
    let result = run_json(&["decode-result", balance_of, &one]);
    assert_eq!(result["result"][0], "1");

    let types = parse_types(&["string"]).expect("type parses");
    let payload = AbiCoder::new()
        .encode(&types, &[Value::from("Not enough")])
        .expect("reason encodes");
    let revert = format!("0x08c379a0{}", hex::encode(payload));
    let result = run_json(&["decode-result", balance_of, &revert]);
    assert_eq!(result["revert"]["reason"], "Not enough");
    assert_eq!(result["revert"]["errorSignature"], "Error(string)");
}

#[test]
fn cli_rejects_bad_input() {
    let output = run(&["selector", "function 1bad()"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid identifier"), "stderr: {}", stderr);

    let output = run(&["encode", TRANSFER, "not json"]);
    assert!(!output.status.success());
}

#[test]
fn cli_config_censors_errors() {
    let path = std::env::temp_dir().join(format!("contract-abi-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"censorErrors": true, "logLevel": "off"}"#).expect("config written");

    let config = path.to_str().expect("utf8 path");
    let output = run(&["--config", config, "encode", TRANSFER, r#"["0x1234", 1]"#]);
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("censored error"), "stderr: {}", stderr);
    assert!(!stderr.contains("0x1234"), "details leaked: {}", stderr);
}
