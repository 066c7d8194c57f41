// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hunt id specs
//!
//! Ids outside the hunt namespace are rejected before the store is touched.

use crate::prelude::*;
use hd_engine::{ApiError, GetHuntResultsRequest, ListHuntClientsRequest};
use similar_asserts::assert_eq;

#[tokio::test]
async fn foreign_ids_never_reach_the_store() {
    let ctx = TestContext::new();
    let api = ctx.api();
    ctx.store.reset_stats();

    for id in ["not-a-hunt-id", "", "aff4:/C.0000000000000001", "H.0000000000000001"] {
        let err = api.get_hunt_results(GetHuntResultsRequest::new(id)).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidHuntId(_)), "{id:?}");
        let err = api
            .list_hunt_clients(ListHuntClientsRequest { hunt_id: id.to_string(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidHuntId(_)), "{id:?}");
    }

    assert_eq!(ctx.store.stats().total(), 0);
}

#[tokio::test]
async fn valid_id_without_results_is_empty() {
    let ctx = TestContext::new();
    let api = ctx.api();
    let h = hunt(1, HuntState::Running, 60);
    ctx.put_hunt(&h);

    let rows = api.get_hunt_results(GetHuntResultsRequest::new(h.hunt_id.as_str())).await.unwrap();
    let unknown = api
        .get_hunt_results(GetHuntResultsRequest::new("aff4:/hunts/H.ffffffffffffffff"))
        .await
        .unwrap();

    assert!(rows.is_empty());
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn generated_ids_are_distinct_and_parse() {
    let ctx = TestContext::new();
    let api = ctx.api();
    let mut ids = Vec::new();
    for _ in 0..16 {
        let draft = Hunt { start_request: StartRequest::new(TEST_FLOW, json!({})), ..Hunt::default() };
        ids.push(api.create_hunt(draft).await.unwrap());
    }

    for id in &ids {
        assert_eq!(HuntId::parse(id.as_str()).unwrap(), id.clone());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    api.registry().shutdown();
}
