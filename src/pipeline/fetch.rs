use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::Instrument;

use super::{load_counter, write_article, ChunkArgs};
use crate::api::{self, EfetchClient, Enricher};
use crate::config::Settings;
use crate::pubmed::{Article, ArticleBuilder};
use crate::telemetry::{self};
use crate::telemetry::ops::fetch::Phase as FetchPhase;

#[derive(Args, Debug)]
pub struct FetchCmd {
    /// PubMed ids to fetch through efetch
    #[arg(required = true)] pub pmids: Vec<String>,
    /// Write `pubmed_<pmid>.json` files here instead of printing
    #[arg(long)] pub out_dir: Option<PathBuf>,
    #[command(flatten)] pub chunking: ChunkArgs,
    #[arg(long, default_value_t = false)] pub citations: bool,
    #[arg(long, default_value_t = false)] pub journal_ranking: bool,
}

#[derive(Serialize)]
struct FetchResult { fetched: usize, missing: Vec<String>, articles: Vec<Article> }

pub async fn run(args: FetchCmd) -> Result<()> {
    let log = telemetry::fetch();
    let _g = log.root_span_kv(
        [
            ("pmids", args.pmids.join(",")),
            ("out_dir", format!("{:?}", args.out_dir)),
            ("citations", args.citations.to_string()),
            ("journal_ranking", args.journal_ranking.to_string()),
        ]
        .into_iter()
        .chain(args.chunking.kv()),
    ).entered();

    let params = args.chunking.params()?;
    let settings = Settings::from_env();
    let counter = {
        let _s = log.span_kv(&FetchPhase::LoadTokenizer, [("tokenizer", settings.tokenizer.clone())]).entered();
        load_counter(&settings).context("load tokenizer")?
    };
    let builder = ArticleBuilder::new(params, &counter);
    let http = api::http_client(&settings)?;
    let efetch = EfetchClient::new(http.clone(), settings.ncbi_api_key.clone());
    let enricher = Enricher::new(&http, &settings, args.citations, args.journal_ranking);

    let mut fetched: Vec<Article> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    let mut errors = 0usize;

    for pmid in &args.pmids {
        let xml = efetch
            .fetch_xml(pmid)
            .instrument(log.span_kv(&FetchPhase::Efetch, [("pmid", pmid.clone())]))
            .await?;
        let Some(xml) = xml else {
            missing.push(pmid.clone());
            continue;
        };

        let built = { let _s = log.span(&FetchPhase::Build).entered(); builder.build_all(&xml) };
        let articles = match built {
            Ok(articles) => articles,
            Err(e) => {
                log.warn_kv("skipping response", [("pmid", pmid.clone()), ("error", format!("{e:#}"))]);
                errors += 1;
                continue;
            }
        };
        if articles.is_empty() {
            log.warn(format!("no article in efetch response for pmid={}", pmid));
            missing.push(pmid.clone());
            continue;
        }

        for mut article in articles {
            if !enricher.is_noop() {
                enricher.enrich(&mut article).instrument(log.span(&FetchPhase::Enrich)).await;
            }
            let path = match &args.out_dir {
                Some(dir) => {
                    let _s = log.span(&FetchPhase::Write).entered();
                    Some(write_article(dir, &article)?.display().to_string())
                }
                None => None,
            };
            log.article_summary(&article.pmid, article.article_splits.len(), path.as_deref());
            fetched.push(article);
        }
    }

    log.totals(fetched.len(), missing.len(), errors);
    if telemetry::config::json_mode() {
        log.result(&FetchResult { fetched: fetched.len(), missing, articles: fetched })?;
    } else if args.out_dir.is_none() {
        for article in &fetched {
            println!("{}", serde_json::to_string_pretty(article)?);
        }
    }
    Ok(())
}
