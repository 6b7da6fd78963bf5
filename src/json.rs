//! JSON rendering of the report tree.

use std::io::Write;

use crate::error::Result;
use crate::model::Report;

/// Write `report` as pretty-printed JSON. Undefined rates become `null`.
pub fn write_report<W: Write>(report: &Report, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, report)?;
    Ok(())
}
