pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

fn ctx<O: ctx::OpMarker>() -> LogCtx<O> {
    LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData }
}

pub fn parse() -> LogCtx<ops::parse::Parse> { ctx() }
pub fn fetch() -> LogCtx<ops::fetch::Fetch> { ctx() }
pub fn sentences() -> LogCtx<ops::sentences::Sentences> { ctx() }
pub fn chunk() -> LogCtx<ops::chunk::Chunk> { ctx() }
