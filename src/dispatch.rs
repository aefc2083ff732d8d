//! Per-request provider selection and fan-out.

use std::sync::Arc;

use futures::future::join_all;

use crate::cache::Cache;
use crate::config::Config;
use crate::frame::Frame;
use crate::granularity::Granularity;
use crate::network::NetworkClient;
use crate::parameter::Parameter;
use crate::provider::registry;
use crate::provider::{dwd, eccc, gsa, meteostat_bulk, metno, noaa};
use crate::request::{ProviderRequest, Request};
use crate::station::Station;

/// Everything one dispatch pass needs to reach the network and disk;
/// bundled so call sites don't thread four parameters through every
/// adapter invocation.
#[derive(Clone)]
pub struct DispatchContext {
    pub client: NetworkClient,
    pub cache: Cache,
    pub config: Arc<Config>,
}

struct Candidate {
    provider_id: &'static str,
    priority: i32,
    parameters: Vec<Parameter>,
}

fn candidates_for_station(
    request: &Request,
    station: &Station,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    allowed_providers: Option<&[&str]>,
) -> Vec<Candidate> {
    let mut by_provider: Vec<Candidate> = Vec::new();

    for parameter in &request.parameters {
        for provider in registry::for_granularity_parameter(request.granularity, *parameter) {
            if !provider.supports_country(&station.country) {
                continue;
            }
            if !provider.covers_window(start, end) {
                continue;
            }
            if !station.satisfies(provider.identifier_dependencies) {
                continue;
            }
            if let Some(allowed) = allowed_providers {
                if !allowed.contains(&provider.id) {
                    continue;
                }
            }

            if let Some(existing) = by_provider.iter_mut().find(|c| c.provider_id == provider.id) {
                existing.parameters.push(*parameter);
            } else {
                by_provider.push(Candidate {
                    provider_id: provider.id,
                    priority: provider.priority,
                    parameters: vec![*parameter],
                });
            }
        }
    }

    by_provider
}

async fn invoke_adapter(
    provider_id: &str,
    req: &ProviderRequest,
    station: &Station,
    ctx: &DispatchContext,
) -> Frame {
    let frame = match provider_id {
        "meteostat_hourly" | "meteostat_daily" | "meteostat_monthly" => {
            meteostat_bulk::fetch(req, &ctx.client, &ctx.cache, &ctx.config).await
        }
        "dwd_hourly" | "dwd_daily" => dwd::fetch(req, station, &ctx.cache, &ctx.config).await,
        "eccc_hourly" => eccc::fetch(req, station, &ctx.client, &ctx.cache, &ctx.config).await,
        "gsa_hourly" | "gsa_daily" | "gsa_monthly" => {
            gsa::fetch(req, station, &ctx.client, &ctx.cache, &ctx.config).await
        }
        "noaa_metar" => noaa::fetch(req, station, &ctx.client, &ctx.cache, &ctx.config).await,
        "metno_forecast" => metno::fetch(req, station, &ctx.client, &ctx.cache, &ctx.config).await,
        _ => Frame::empty(),
    };

    match frame.stamp_source(provider_id) {
        Ok(f) => f,
        Err(_) => Frame::empty(),
    }
}

/// Run dispatch for a fully validated request against its resolved
/// stations, returning the concatenated, deterministically ordered frame.
pub async fn dispatch(
    request: &Request,
    stations: &[Station],
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    allowed_providers: Option<&[&str]>,
    ctx: &DispatchContext,
) -> Frame {
    struct Task {
        station_id: String,
        priority: i32,
        provider_id: &'static str,
    }

    let mut tasks: Vec<Task> = Vec::new();
    let mut futures = Vec::new();

    for station in stations {
        let candidates = candidates_for_station(request, station, start, end, allowed_providers);
        for candidate in candidates {
            let provider_req = ProviderRequest {
                station_id: station.id.clone(),
                granularity: request.granularity,
                parameters: candidate.parameters,
                start,
                end,
            };
            let station = station.clone();
            let ctx = ctx.clone();
            let provider_id = candidate.provider_id;

            tasks.push(Task {
                station_id: station.id.clone(),
                priority: candidate.priority,
                provider_id,
            });
            futures.push(tokio::spawn(async move {
                invoke_adapter(provider_id, &provider_req, &station, &ctx).await
            }));
        }
    }

    let results = join_all(futures).await;

    // Pre-sort by (station_id, provider_priority desc, provider_id) so the
    // squash engine's first-non-null rule is deterministic regardless of
    // which task finished first.
    let mut indexed: Vec<(usize, Frame)> = results
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| r.ok().map(|f| (i, f)))
        .collect();

    indexed.sort_by(|(i, _), (j, _)| {
        let a = &tasks[*i];
        let b = &tasks[*j];
        a.station_id
            .cmp(&b.station_id)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| a.provider_id.cmp(b.provider_id))
    });

    let ordered_frames: Vec<Frame> = indexed.into_iter().map(|(_, f)| f).collect();

    Frame::concat(ordered_frames).unwrap_or_else(|_| Frame::empty())
}
