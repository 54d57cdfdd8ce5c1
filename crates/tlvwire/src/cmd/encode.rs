use std::fs::File;
use std::io::{BufWriter, Write};

use tlvwire_frame::PayloadWriter;

use crate::cmd::{resolve_payloads, EncodeArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let payloads = resolve_payloads(&args.payload)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let mut writer = PayloadWriter::new(sink);
    for payload in &payloads {
        writer
            .write_payload(payload)
            .map_err(|err| frame_error("encode failed", err))?;
    }
    tracing::debug!(
        frames = payloads.len(),
        bytes = writer.bytes_written(),
        "encoded payloads"
    );

    Ok(SUCCESS)
}
