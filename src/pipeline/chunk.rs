use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::{load_counter, ChunkArgs, InputArgs};
use crate::chunking::{chunk_sentences, Chunk};
use crate::config::Settings;
use crate::sentence::split_sentences;
use crate::telemetry::{self};
use crate::telemetry::ops::chunk::Phase as ChunkPhase;

#[derive(Args, Debug)]
pub struct ChunkCmd {
    #[command(flatten)] pub input: InputArgs,
    #[command(flatten)] pub chunking: ChunkArgs,
}

#[derive(Serialize)]
struct ChunkResult { sentences: usize, chunks: Vec<Chunk> }

pub fn run(args: ChunkCmd) -> Result<()> {
    let log = telemetry::chunk();
    let _g = log.root_span_kv(
        [("input", args.input.describe())].into_iter().chain(args.chunking.kv()),
    ).entered();

    let params = args.chunking.params()?;
    let text = { let _s = log.span(&ChunkPhase::ReadInput).entered(); args.input.read()? };
    let sentences = { let _s = log.span(&ChunkPhase::Split).entered(); split_sentences(&text) };
    if sentences.is_empty() {
        log.info("ℹ️  No sentences in input; nothing to chunk");
        if telemetry::config::json_mode() {
            log.result(&ChunkResult { sentences: 0, chunks: Vec::new() })?;
        }
        return Ok(());
    }

    let settings = Settings::from_env();
    let counter = {
        let _s = log.span_kv(&ChunkPhase::LoadTokenizer, [("tokenizer", settings.tokenizer.clone())]).entered();
        load_counter(&settings).context("load tokenizer")?
    };
    let chunks = {
        let _s = log.span(&ChunkPhase::Group).entered();
        chunk_sentences(&sentences, &params, &counter)?
    };
    log.info(format!("✅ {} sentence(s) → {} chunk(s)", sentences.len(), chunks.len()));

    if telemetry::config::json_mode() {
        log.result(&ChunkResult { sentences: sentences.len(), chunks })?;
    } else {
        for c in &chunks {
            println!("[{}/{}] {}", c.split_number, c.total_splits, c.text);
        }
    }
    Ok(())
}
