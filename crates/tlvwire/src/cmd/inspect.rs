use std::fs::File;
use std::io::{BufReader, Read};

use tlvwire_frame::PayloadReader;

use crate::cmd::listen::codec_config;
use crate::cmd::InspectArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_payload, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let (source, label): (Box<dyn Read>, String) = match &args.path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            (Box::new(BufReader::new(file)), path.display().to_string())
        }
        None => (Box::new(std::io::stdin().lock()), "stdin".to_string()),
    };

    let reader = PayloadReader::with_config(source, codec_config(args.max_payload));
    for payload in reader {
        let payload = payload.map_err(|err| frame_error("decode failed", err))?;
        print_payload(&payload, &label, format);
    }

    Ok(SUCCESS)
}
