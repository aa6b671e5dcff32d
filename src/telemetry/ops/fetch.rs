use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Fetch;

#[derive(Copy, Clone, Debug)]
pub enum Phase { LoadTokenizer, Efetch, Build, Enrich, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::LoadTokenizer => "load_tokenizer",
        Phase::Efetch => "efetch",
        Phase::Build => "build",
        Phase::Enrich => "enrich",
        Phase::Write => "write",
    }}
    fn span(&self) -> Span { match self {
        Phase::LoadTokenizer => info_span!("load_tokenizer"),
        Phase::Efetch => info_span!("efetch"),
        Phase::Build => info_span!("build"),
        Phase::Enrich => info_span!("enrich"),
        Phase::Write => info_span!("write"),
    }}
}

impl OpMarker for Fetch {
    const NAME: &'static str = "fetch";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("fetch") }
}
