use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Parse;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, LoadTokenizer, ReadArticle, Build, Enrich, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::LoadTokenizer => "load_tokenizer",
        Phase::ReadArticle => "read_article",
        Phase::Build => "build",
        Phase::Enrich => "enrich",
        Phase::Write => "write",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::LoadTokenizer => info_span!("load_tokenizer"),
        Phase::ReadArticle => info_span!("read_article"),
        Phase::Build => info_span!("build"),
        Phase::Enrich => info_span!("enrich"),
        Phase::Write => info_span!("write"),
    }}
}

impl OpMarker for Parse {
    const NAME: &'static str = "parse";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("parse") }
}
