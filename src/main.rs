//! `contract-abi` command-line interface
//!
//! Every command prints a JSON document on stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value as JsonValue};

use contract_abi::abi::{Fragment, FunctionFragment, Interface};
use contract_abi::utils::bytes::{arrayify, hexlify};
use contract_abi::{AbiCoder, AbiError, CoderConfig, FormatType, Value};

#[derive(Parser, Debug)]
#[command(name = "contract-abi", version, about = "Encode and decode EVM contract ABI data")]
struct Cli {
    /// Coder configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Selector of a function or error, topic of an event
    Selector {
        /// Human-readable fragment, e.g. "function transfer(address,uint256)"
        fragment: String,
    },

    /// Print a fragment in another format
    Format {
        fragment: String,

        #[arg(short, long, value_enum, default_value = "full")]
        format: OutputFormat,
    },

    /// Encode call data for a function
    Encode {
        fragment: String,

        /// Arguments as a JSON array
        args: String,
    },

    /// Decode call data against a function
    DecodeCall {
        fragment: String,

        /// 0x-prefixed call data
        data: String,
    },

    /// Decode return data, reporting reverts
    DecodeResult {
        fragment: String,

        /// 0x-prefixed return data
        data: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Full,
    Minimal,
    Sighash,
    Json,
}

impl From<OutputFormat> for FormatType {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => FormatType::Full,
            OutputFormat::Minimal => FormatType::Minimal,
            OutputFormat::Sighash => FormatType::Sighash,
            OutputFormat::Json => FormatType::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let coder = load_coder(cli.config.as_ref())?;
    let output = run(cli.command, coder)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_coder(path: Option<&PathBuf>) -> Result<AbiCoder> {
    let Some(path) = path else {
        return Ok(AbiCoder::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = CoderConfig::from_json(&text)?;
    Ok(AbiCoder::with_config(config)?)
}

fn run(command: Command, coder: AbiCoder) -> Result<JsonValue> {
    match command {
        Command::Selector { fragment } => {
            let fragment = Fragment::from_string_with_logger(&fragment, coder.logger())?;
            selector(&fragment)
        }
        Command::Format { fragment, format } => {
            let fragment = Fragment::from_string_with_logger(&fragment, coder.logger())?;
            let formatted = fragment.format(format.into())?;
            match format {
                OutputFormat::Json => Ok(serde_json::from_str(&formatted)?),
                _ => Ok(json!({ "formatted": formatted })),
            }
        }
        Command::Encode { fragment, args } => {
            let (iface, function) = single_function(&fragment, coder)?;
            let values = parse_args(&args)?;
            let data = iface.encode_function_data(&function, &values)?;
            Ok(json!({
                "function": function.format(FormatType::Sighash),
                "data": hexlify(&data),
            }))
        }
        Command::DecodeCall { fragment, data } => {
            let (iface, function) = single_function(&fragment, coder)?;
            let args = iface.decode_function_data(&function, &arrayify(&data)?)?;
            Ok(json!({
                "function": function.format(FormatType::Sighash),
                "args": args.to_json(),
            }))
        }
        Command::DecodeResult { fragment, data } => {
            let (iface, function) = single_function(&fragment, coder)?;
            match iface.decode_function_result(&function, &arrayify(&data)?) {
                Ok(results) => Ok(json!({ "result": results.to_json() })),
                Err(AbiError::CallException(exception)) => Ok(json!({
                    "revert": {
                        "message": exception.message,
                        "reason": exception.reason,
                        "errorName": exception.error_name,
                        "errorSignature": exception.error_signature,
                        "errorArgs": exception.error_args.as_ref().map(|a| a.to_json()),
                        "panicCode": exception.panic_code.as_ref().map(|c| c.to_string()),
                    }
                })),
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn selector(fragment: &Fragment) -> Result<JsonValue> {
    let signature = fragment.format(FormatType::Sighash)?;
    match fragment {
        Fragment::Function(f) => Ok(json!({
            "type": "function",
            "signature": signature,
            "selector": hexlify(&f.selector()),
        })),
        Fragment::Error(e) => Ok(json!({
            "type": "error",
            "signature": signature,
            "selector": hexlify(&e.selector()),
        })),
        Fragment::Event(e) => Ok(json!({
            "type": "event",
            "signature": signature,
            "topic": hexlify(&e.topic()),
        })),
        Fragment::Constructor(_) => bail!("constructors have no selector"),
    }
}

fn single_function(fragment: &str, coder: AbiCoder) -> Result<(Interface, FunctionFragment)> {
    let function = match Fragment::from_string_with_logger(fragment, coder.logger())? {
        Fragment::Function(f) => f,
        other => bail!("expected a function fragment, got {}", other.kind()),
    };
    let iface = Interface::with_coder(vec![Fragment::Function(function.clone())], coder);
    Ok((iface, function))
}

fn parse_args(args: &str) -> Result<Vec<Value>> {
    let parsed: JsonValue = serde_json::from_str(args).context("arguments must be JSON")?;
    let items = parsed
        .as_array()
        .ok_or_else(|| anyhow!("arguments must be a JSON array"))?;
    Ok(items.iter().map(Value::from_json).collect::<Result<Vec<_>, _>>()?)
}
