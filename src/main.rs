use clap::{Parser, Subcommand};
use serde::Serialize;
use sim800_agent::config::{Config, ConfigLoader};
use sim800_agent::workflow::{self, SendReport};
use sim800_agent::{logging, AgentError, AgentResult, Modem, SmsRecord};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Initialise a SIM800 GSM modem, send SMS and read stored messages over a serial link."
)]
struct Args {
    /// Configuration file. Defaults to the standard search path.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial port, overriding configuration and environment.
    #[arg(short, long, global = true)]
    port: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the module, power the radio, unlock the SIM and select text mode.
    Init,
    /// Send configured message N to the primary recipient and a delivery
    /// report to the log recipient.
    Send {
        /// Message number, read from `MESSAGE_<N>` or `[sms.messages]`.
        #[arg(default_value_t = 1)]
        number: u32,
    },
    /// List every stored message.
    Read {
        /// Delete each message after listing it.
        #[arg(long)]
        delete: bool,

        /// Print the messages as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sim800: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_tracing(&config.logging);

    match run(args.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "operation failed");
            eprintln!("sim800: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> AgentResult<Config> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();
    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    Ok(config)
}

fn run(command: Command, config: &Config) -> AgentResult<bool> {
    let mut modem = Modem::from_config(config);

    match command {
        Command::Init => {
            workflow::initialize(&mut modem, config.modem.pin.clone())?;
            println!("SIM800 initialization complete");
            Ok(true)
        }
        Command::Send { number } => {
            let report = workflow::send_with_log(&mut modem, &config.sms, number)?;
            print_statistics(config, &report);
            Ok(report.is_success())
        }
        Command::Read { delete, json } => {
            let records = workflow::read_messages(&mut modem, delete)?;
            if json {
                print_json(&records)?;
            } else {
                print_records(&records);
            }
            Ok(true)
        }
    }
}

fn print_statistics(config: &Config, report: &SendReport) {
    let none = "(not configured)";
    println!("{}", "=".repeat(50));
    println!("SMS SENDING STATISTICS");
    println!("{}", "=".repeat(50));
    println!(
        "Primary recipient ({}):",
        config.sms.phone_number.as_deref().unwrap_or(none)
    );
    println!("  Sent: {}/{}", report.primary_sent, report.primary_total);
    println!(
        "Log recipient ({}):",
        config.sms.log_phone_number.as_deref().unwrap_or(none)
    );
    println!("  Sent: {}/{}", report.log_sent, report.log_total);
    println!("{}", "=".repeat(50));
}

fn print_records(records: &[SmsRecord]) {
    if records.is_empty() {
        println!("No SMS messages found");
        return;
    }
    for record in records {
        println!("Message {}:", record.index);
        println!("  Status: {}", record.status);
        println!("  From: {}", record.sender);
        println!("  Time: {}", record.timestamp);
        println!("  Content: {}", record.decoded_content());
    }
    println!("Found {} message(s)", records.len());
}

#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a SmsRecord,
    decoded: String,
    received_at: Option<String>,
}

fn print_json(records: &[SmsRecord]) -> AgentResult<()> {
    let views: Vec<RecordView<'_>> = records
        .iter()
        .map(|record| RecordView {
            record,
            decoded: record.decoded_content().into_owned(),
            received_at: record.timestamp_parsed().map(|ts| ts.to_rfc3339()),
        })
        .collect();
    let text = serde_json::to_string_pretty(&views)
        .map_err(|e| AgentError::step(format!("failed to encode messages: {e}")))?;
    println!("{text}");
    Ok(())
}
