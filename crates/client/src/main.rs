//! `adminlist` - load one admin list page and print the visible rows as JSON.

use std::sync::Arc;

use adminlist_client::{
    ClientConfig, HttpCollectionApi, ListController, ListStatus, PageConfig, QueryParams,
    SortOrder, SqliteStore,
};
use adminlist_core::{EntityKind, FilterValue};
use adminlist_events::{ApplySavedFilter, InMemoryChannel};
use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Value, json};

/// Load an admin list and print `{status, notice, total, rows}`.
#[derive(Debug, Parser)]
#[command(name = "adminlist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Collection to list (customers, vendors, invoices, ...).
    entity: EntityKind,

    /// Free-text search across the page's search fields.
    #[arg(long)]
    search: Option<String>,

    /// Exact-match field filter, repeatable.
    #[arg(long = "filter", value_name = "NAME=VALUE", value_parser = parse_pair)]
    filters: Vec<(String, String)>,

    /// Server-side query parameter, repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_pair)]
    params: Vec<(String, String)>,

    /// Column to sort by.
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Zero-based page.
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Rows per page (overrides the configured page size).
    #[arg(long)]
    page_size: Option<usize>,

    /// API server URL.
    #[arg(long, env = "ADMINLIST_API_URL")]
    api_url: Option<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ClientConfig::load().context("failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }

    adminlist_observability::init_with(config.log_format, Some("warn"));

    let store = match &config.cache_db_path {
        Some(path) => SqliteStore::at_path(path),
        None => SqliteStore::open_default()?,
    };

    let mut api = HttpCollectionApi::for_entity(config.api_url.clone(), cli.entity);
    if let Some(token) = &config.auth_token {
        api = api.with_token(token.clone());
    }

    let page = PageConfig::for_entity(cli.entity)
        .page_size(cli.page_size.unwrap_or(config.page_size))
        .search(config.search);
    let channel = InMemoryChannel::<ApplySavedFilter>::new();
    let mut controller: ListController<Value, _, _> =
        ListController::new(page, Arc::new(api), Arc::new(store), &channel);

    let params = cli
        .params
        .iter()
        .fold(QueryParams::new(), |params, (key, value)| {
            params.with(key.as_str(), value.as_str())
        });
    let outcome = controller.reload(&params).await;
    tracing::debug!(?outcome, entity = %cli.entity, "reload finished");

    if let Some(term) = &cli.search {
        controller.apply_search_now(term.as_str());
    }
    for (name, value) in &cli.filters {
        controller.set_field_filter(name.as_str(), Some(FilterValue::text(value.as_str())));
    }
    if let Some(field) = &cli.sort {
        let wanted = if cli.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        controller.sort_by(field.as_str());
        if controller.filters().sort().map(|s| s.order) != Some(wanted) {
            controller.sort_by(field.as_str());
        }
    }
    controller.set_page(cli.page);

    let status = controller.status();
    let view = controller.view();
    let output = json!({
        "status": status,
        "notice": controller.notice().map(|n| n.info().message.clone()),
        "total": view.total_filtered,
        "page": view.page,
        "page_count": view.page_count(),
        "rows": view.rows,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if status == ListStatus::Failed {
        bail!("could not load {} and no cached copy is available", cli.entity);
    }
    Ok(())
}
