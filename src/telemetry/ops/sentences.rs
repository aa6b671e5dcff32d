use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Sentences;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadInput, Split }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadInput => "read_input",
        Phase::Split => "split",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadInput => info_span!("read_input"),
        Phase::Split => info_span!("split"),
    }}
}

impl OpMarker for Sentences {
    const NAME: &'static str = "sentences";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("sentences") }
}
