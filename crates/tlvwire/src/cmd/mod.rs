use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use tlvwire_frame::{Binary, Payload, TextString};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod encode;
pub mod inspect;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an echo server.
    Echo(EchoArgs),
    /// Dial a server and send framed payloads.
    Send(SendArgs),
    /// Listen and print received payloads.
    Listen(ListenArgs),
    /// Write framed payloads to a file or stdout.
    Encode(EncodeArgs),
    /// Decode framed payloads from a file or stdin.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    #[default]
    Binary,
    Text,
}

#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Payload type to frame the input as.
    #[arg(long, short = 'k', value_enum, default_value_t = PayloadKind::Binary)]
    pub kind: PayloadKind,
    /// String payload; repeat to send several frames in order.
    #[arg(long, short = 'd', conflicts_with = "file")]
    pub data: Vec<String>,
    /// Read a single payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind (e.g. 127.0.0.1:50000).
    pub addr: String,
    /// Maximum accepted payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to.
    pub addr: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Dial timeout, also used as the read timeout with --wait (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Wait for one response payload per payload sent and print them.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    pub addr: String,
    /// Only print payloads of this type.
    #[arg(long, short = 'k', value_enum)]
    pub kind: Option<PayloadKind>,
    /// Exit after receiving N payloads.
    #[arg(long)]
    pub count: Option<usize>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Write frames to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to decode. Reads stdin when omitted.
    pub path: Option<PathBuf>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

impl PayloadKind {
    pub fn matches(self, payload: &Payload) -> bool {
        matches!(
            (self, payload),
            (PayloadKind::Binary, Payload::Binary(_)) | (PayloadKind::Text, Payload::Text(_))
        )
    }
}

/// Build the payloads described by `--kind`, `--data` and `--file`.
pub fn resolve_payloads(args: &PayloadArgs) -> CliResult<Vec<Payload>> {
    if let Some(path) = &args.file {
        let content = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        let payload = match args.kind {
            PayloadKind::Binary => Payload::Binary(Binary::from(content)),
            PayloadKind::Text => {
                let text = String::from_utf8(content).map_err(|err| {
                    CliError::new(
                        USAGE,
                        format!("{} is not valid UTF-8: {err}", path.display()),
                    )
                })?;
                Payload::Text(TextString::from(text))
            }
        };
        return Ok(vec![payload]);
    }

    if args.data.is_empty() {
        return Err(CliError::new(USAGE, "no payload given (use --data or --file)"));
    }

    Ok(args
        .data
        .iter()
        .map(|data| match args.kind {
            PayloadKind::Binary => Payload::binary(data.as_str()),
            PayloadKind::Text => Payload::text(data.as_str()),
        })
        .collect())
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
