use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

use crate::output::types::Envelope;

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T) -> Result<()> {
    write_envelope(&Envelope::plan(op, plan)?)
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T) -> Result<()> {
    write_envelope(&Envelope::result(op, result)?)
}

fn write_envelope(env: &Envelope) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, env)?;
    writeln!(&mut out)?;
    Ok(())
}
