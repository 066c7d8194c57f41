// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hunt lifecycle specs
//!
//! Create, run, inspect, and stop a hunt through the API over an on-disk
//! store, then reopen the store and find the same state.

use crate::prelude::*;
use hd_adapters::{FakeLaunchAdapter, FakeNotifyAdapter, StoreResultReader};
use hd_core::FakeClock;
use hd_engine::{
    DispatchDeps, HuntApi, HuntClientsKind, HuntRegistry, ListHuntClientsRequest, ListHuntsRequest,
};
use hd_storage::{FsStore, StoreExt};
use similar_asserts::assert_eq;
use std::sync::Arc;

type FsApi = HuntApi<FakeLaunchAdapter, FakeNotifyAdapter, FakeClock>;

fn open(root: &std::path::Path, launcher: &FakeLaunchAdapter, clock: &FakeClock) -> (Arc<dyn Store>, FsApi) {
    let store: Arc<dyn Store> = Arc::new(FsStore::open(root).unwrap());
    let deps = DispatchDeps::new(store.clone(), launcher.clone(), clock.clone());
    let results = Arc::new(StoreResultReader::new(store.clone()));
    (store, HuntApi::new(HuntRegistry::new(deps), FakeNotifyAdapter::new(), results))
}

#[tokio::test]
async fn hunt_state_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = FakeLaunchAdapter::new();
    let clock = FakeClock::new();
    let (store, api) = open(dir.path(), &launcher, &clock);

    let draft = Hunt {
        hunt_description: "users on every host".to_string(),
        client_rate: 60,
        state: HuntState::Running,
        start_request: StartRequest::new(TEST_FLOW, json!({ "done": true })),
        ..Hunt::default()
    };
    let id = api.create_hunt(draft).await.unwrap();
    let hunt = store.get_as::<Hunt>(id.as_str()).unwrap();
    for n in 1..=3 {
        let info = HuntInfo::pending(&hunt, client(n));
        store.set_as(&info.path(QueueKind::Pending), &info).unwrap();
    }

    clock.advance(secs(2));
    api.registry().invalidate().await;
    assert_eq!(launcher.calls().len(), 2);

    let scheduled = api
        .list_hunt_clients(ListHuntClientsRequest {
            hunt_id: id.to_string(),
            kind: HuntClientsKind::Scheduled,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(scheduled.iter().map(|i| i.client_id.clone()).collect::<Vec<_>>(), vec![client(1), client(2)]);
    api.registry().shutdown();

    let (_, reopened) = open(dir.path(), &launcher, &clock);
    let listed = reopened.list_hunts(ListHuntsRequest::default()).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].hunt_id, id);
    assert_eq!(listed[0].hunt_description, "users on every host");
    assert_eq!(listed[0].total_clients_scheduled, 2);

    let stopped = reopened
        .modify_hunt(HuntModification { hunt_id: id.to_string(), state: Some(HuntState::Stopped) })
        .await
        .unwrap();
    assert_eq!(stopped.state, HuntState::Stopped);
    clock.advance(secs(60));
    reopened.registry().invalidate().await;
    assert_eq!(launcher.calls().len(), 2);
    assert_eq!(reopened.get_hunt(id.basename()).await.unwrap().state, HuntState::Stopped);
    reopened.registry().shutdown();
}
