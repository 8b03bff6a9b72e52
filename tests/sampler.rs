use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rtt_monitor::sampler::{Sampler, Scheduler, Status};
use rtt_monitor::server::ServerHandle;
use rtt_monitor::stats::RttStore;
use rtt_monitor::AppState;

async fn spawn() -> (ServerHandle, Arc<AppState>) {
    let state = AppState::new(Arc::new(RttStore::new()));
    let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
    let handle = ServerHandle::spawn("127.0.0.1:0".parse().unwrap(), state.clone(), static_dir)
        .await
        .unwrap();
    (handle, state)
}

#[tokio::test]
async fn ticks_record_locally_and_on_the_server() {
    let (handle, state) = spawn().await;
    let server = format!("http://{}", handle.local_addr());
    let sampler = Sampler::new(&server, Some("sampler-a".into()), Duration::from_secs(2)).unwrap();

    let mut measured = Vec::new();
    for _ in 0..5 {
        measured.push(sampler.tick().await.unwrap());
    }

    let view = sampler.view();
    let stats = view.stats.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.window_size, 5);
    assert!(stats.min >= 0.0);
    assert_eq!(view.recent.len(), 5);
    assert_eq!(view.recent[0].seq, 5);

    // One server sample per ping, including the latest, each one the
    // server's handling time nested inside the matching round trip
    let server_stats = state.store.stats("sampler-a").unwrap();
    assert_eq!(server_stats.count, measured.len());
    for (server_side, rtt) in server_stats.recent.iter().zip(&measured) {
        assert!(server_side.rtt >= 0.0);
        assert!(server_side.rtt <= *rtt);
    }
    assert!(server_stats.max <= stats.max);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn transport_failure_sets_error_status_and_keeps_window() {
    let (handle, _state) = spawn().await;
    let server = format!("http://{}", handle.local_addr());
    let sampler = Sampler::new(&server, Some("sampler-b".into()), Duration::from_secs(2)).unwrap();

    sampler.tick().await.unwrap();
    handle.shutdown().await.unwrap();

    assert!(sampler.tick().await.is_err());
    let view = sampler.view();
    assert!(matches!(view.status, Status::Error { .. }));
    assert_eq!(view.stats.unwrap().total, 1);
}

#[tokio::test]
async fn scheduler_drives_ticks_until_stopped() {
    let (handle, state) = spawn().await;
    let server = format!("http://{}", handle.local_addr());
    let sampler = Arc::new(
        Sampler::new(&server, Some("sampler-c".into()), Duration::from_secs(2)).unwrap(),
    );
    let mut views = sampler.subscribe();

    let mut scheduler = Scheduler::new(sampler.clone());
    scheduler.start(Duration::from_millis(100));

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            views.changed().await.unwrap();
            let total = views.borrow().stats.map(|s| s.total).unwrap_or(0);
            if total >= 3 {
                break;
            }
        }
    })
    .await
    .expect("three ticks within five seconds");

    scheduler.set_interval(Duration::from_millis(150));
    assert!(scheduler.is_running());

    scheduler.stop();
    // Let in-flight ticks land
    tokio::time::sleep(Duration::from_millis(300)).await;
    let settled = sampler.view().stats.unwrap().total;
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(sampler.view().stats.unwrap().total, settled);

    assert!(state.store.history_len("sampler-c").unwrap() as u64 >= settled);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn restart_leaves_only_the_new_timer_firing() {
    let (handle, state) = spawn().await;
    let server = format!("http://{}", handle.local_addr());
    let sampler = Arc::new(
        Sampler::new(&server, Some("sampler-d".into()), Duration::from_secs(2)).unwrap(),
    );

    let mut scheduler = Scheduler::new(sampler.clone());
    scheduler.start(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(200)).await;

    scheduler.set_interval(Duration::from_millis(500));
    // Let ticks started by the fast timer land
    tokio::time::sleep(Duration::from_millis(150)).await;
    let before = state.store.history_len("sampler-d").unwrap();

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    let after = state.store.history_len("sampler-d").unwrap();

    // The slow timer fires twice in 1.1 s; a surviving 20 ms timer would add ~55
    let fired = after - before;
    assert!((1..=3).contains(&fired), "{fired} ticks after restart");

    scheduler.stop();
    handle.shutdown().await.unwrap();
}
