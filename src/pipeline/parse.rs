use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::Instrument;

use super::{load_counter, write_article, ChunkArgs};
use crate::api::{self, Enricher};
use crate::config::Settings;
use crate::pubmed::{open_articles, pmid_of, ArticleBuilder};
use crate::telemetry::{self};
use crate::telemetry::ops::parse::Phase as ParsePhase;

#[derive(Args, Debug)]
pub struct ParseCmd {
    /// PubMed XML file (`.xml` or `.xml.gz`)
    pub input: PathBuf,
    #[arg(long, default_value = "data/pubmed")] pub out_dir: PathBuf,
    #[command(flatten)] pub chunking: ChunkArgs,
    /// Look up Crossref citation counts
    #[arg(long, default_value_t = false)] pub citations: bool,
    /// Look up exaly journal rankings
    #[arg(long, default_value_t = false)] pub journal_ranking: bool,
    /// Stop after this many articles
    #[arg(long)] pub limit: Option<usize>,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

#[derive(Serialize)]
struct ParsePlan {
    input: String,
    out_dir: String,
    max_tokens: usize,
    min_tokens: usize,
    sentence_overlap: usize,
    citations: bool,
    journal_ranking: bool,
    sample_pmids: Vec<String>,
}

#[derive(Serialize)]
struct ArticleResult { pmid: String, splits: usize, path: String }

#[derive(Serialize)]
struct ParseResult { processed: usize, skipped: usize, errors: usize, articles: Vec<ArticleResult> }

pub async fn run(args: ParseCmd) -> Result<()> {
    let log = telemetry::parse();
    let _g = log.root_span_kv(
        [
            ("input", args.input.display().to_string()),
            ("out_dir", args.out_dir.display().to_string()),
            ("citations", args.citations.to_string()),
            ("journal_ranking", args.journal_ranking.to_string()),
            ("limit", format!("{:?}", args.limit)),
            ("apply", args.apply.to_string()),
        ]
        .into_iter()
        .chain(args.chunking.kv()),
    ).entered();

    // validate before planning so a bad plan is never shown as runnable
    let params = args.chunking.params()?;

    if !args.apply {
        let _sp = log.span(&ParsePhase::Plan).entered();
        let sample_pmids: Vec<String> = open_articles(&args.input)?
            .take(args.plan_limit)
            .filter_map(|a| a.ok().map(|root| pmid_of(&root)))
            .collect();
        log.info(format!(
            "📝 Parse plan - input={} out_dir={} max_tokens={} min_tokens={} overlap={} citations={} journal_ranking={}",
            args.input.display(), args.out_dir.display(), params.max_tokens, params.min_tokens,
            params.overlap, args.citations, args.journal_ranking
        ));
        for pmid in &sample_pmids { log.info(format!("  pmid={}", pmid)); }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&ParsePlan {
                input: args.input.display().to_string(),
                out_dir: args.out_dir.display().to_string(),
                max_tokens: params.max_tokens,
                min_tokens: params.min_tokens,
                sentence_overlap: params.overlap,
                citations: args.citations,
                journal_ranking: args.journal_ranking,
                sample_pmids,
            })?;
        }
        return Ok(());
    }

    let settings = Settings::from_env();
    let counter = {
        let _s = log.span_kv(&ParsePhase::LoadTokenizer, [("tokenizer", settings.tokenizer.clone())]).entered();
        load_counter(&settings).context("load tokenizer")?
    };
    let builder = ArticleBuilder::new(params, &counter);
    let http = api::http_client(&settings)?;
    let enricher = Enricher::new(&http, &settings, args.citations, args.journal_ranking);

    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;
    let mut per_article: Vec<ArticleResult> = Vec::new();

    let mut articles = open_articles(&args.input)?;
    loop {
        if args.limit.is_some_and(|n| processed + skipped + errors >= n) { break; }

        let next = { let _s = log.span(&ParsePhase::ReadArticle).entered(); articles.next() };
        let root = match next {
            None => break,
            Some(Ok(root)) => root,
            Some(Err(e)) => {
                // the stream is unusable past a syntax error
                log.error(format!("❌ {}: {:#}", args.input.display(), e));
                errors += 1;
                break;
            }
        };

        let built = { let _s = log.span(&ParsePhase::Build).entered(); builder.build(&root) };
        let mut article = match built {
            Ok(article) => article,
            Err(e) => {
                log.warn_kv("skipping article", [("pmid", pmid_of(&root)), ("error", format!("{e:#}"))]);
                errors += 1;
                continue;
            }
        };
        if article.pmid.is_empty() {
            log.warn("skipping article without pmid");
            skipped += 1;
            continue;
        }

        if !enricher.is_noop() {
            enricher.enrich(&mut article).instrument(log.span(&ParsePhase::Enrich)).await;
        }

        let path = { let _s = log.span(&ParsePhase::Write).entered(); write_article(&args.out_dir, &article)? };
        let path = path.display().to_string();
        log.article_summary(&article.pmid, article.article_splits.len(), Some(&path));
        per_article.push(ArticleResult { pmid: article.pmid.clone(), splits: article.article_splits.len(), path });
        processed += 1;
    }

    log.totals(processed, skipped, errors);
    if telemetry::config::json_mode() {
        log.result(&ParseResult { processed, skipped, errors, articles: per_article })?;
    }
    Ok(())
}
