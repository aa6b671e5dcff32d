use anyhow::Result;
use clap::Args;

use super::InputArgs;
use crate::sentence::split_sentences;
use crate::telemetry::{self};
use crate::telemetry::ops::sentences::Phase as SentencesPhase;

#[derive(Args, Debug)]
pub struct SentencesCmd {
    #[command(flatten)] pub input: InputArgs,
}

pub fn run(args: SentencesCmd) -> Result<()> {
    let log = telemetry::sentences();
    let _g = log.root_span_kv([("input", args.input.describe())]).entered();

    let text = { let _s = log.span(&SentencesPhase::ReadInput).entered(); args.input.read()? };
    let sentences = { let _s = log.span(&SentencesPhase::Split).entered(); split_sentences(&text) };
    log.info(format!("✂️  {} sentence(s)", sentences.len()));

    if telemetry::config::json_mode() {
        log.result(&sentences)?;
    } else {
        for s in &sentences {
            // one per line; interior newlines would break that
            println!("{}", s.replace('\n', " "));
        }
    }
    Ok(())
}
