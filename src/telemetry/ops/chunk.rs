use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Chunk;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadInput, LoadTokenizer, Split, Group }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadInput => "read_input",
        Phase::LoadTokenizer => "load_tokenizer",
        Phase::Split => "split",
        Phase::Group => "group",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadInput => info_span!("read_input"),
        Phase::LoadTokenizer => info_span!("load_tokenizer"),
        Phase::Split => info_span!("split"),
        Phase::Group => info_span!("group"),
    }}
}

impl OpMarker for Chunk {
    const NAME: &'static str = "chunk";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("chunk") }
}
