use std::io::Write;

use serde::Serialize;

use crate::error::CliError;

/// Write one JSON document followed by a newline.
pub fn render<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value, pretty)
}

/// Write one compact line and flush, for NDJSON streams.
pub fn render_line<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value, false)?;
    stdout.flush()?;
    Ok(())
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}
