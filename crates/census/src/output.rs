//! JSON rendering of lookup results for callers that parse stdout.
//!
//! Consumers expect `[{"cfr": "...", "estado": "..."}]` with a space after
//! every `,` and `:`, and non-ASCII characters left unescaped.

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

use crate::record::VesselRecord;

/// Compact JSON with `", "` and `": "` separators.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn render_records(records: &[VesselRecord]) -> serde_json::Result<String> {
    to_spaced_json(records)
}

/// Output for an invocation without a vessel name.
pub fn render_missing_name() -> serde_json::Result<String> {
    render_records(&[VesselRecord::missing_name()])
}
