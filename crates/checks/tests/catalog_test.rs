//! Integration tests for the built-in checks driven through the registry

use checks::{
    CheckContext, CheckRegistry, DEFAULT_CHECKS, Environment, MainLoopScheduler, MonitorExit,
    PrebootRunner, detect_procfile,
};
use common::{MemorySink, Reporter};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Helper to build an environment snapshot from literal pairs
fn environment(vars: &[(&str, &str)]) -> Environment {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::from_lookup(|key| vars.get(key).cloned())
}

fn reporter() -> (Arc<MemorySink>, Reporter) {
    let sink = Arc::new(MemorySink::new());
    (sink.clone(), Reporter::new(sink))
}

/// A port nothing is listening on right now
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_default_catalog_preboot() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Procfile.web"), "web: ./serve\n").unwrap();

    let (sink, reporter) = reporter();
    let env = environment(&[
        ("PROCFILE", "Procfile.web"),
        ("PORT", "8000"),
        ("DATABASE_URL", "postgres://db/app"),
        ("REDIS_URL", ""),
    ]);
    let procfile = detect_procfile(env.procfile.as_deref(), dir.path(), &reporter);
    assert_eq!(procfile.as_deref(), Some(std::path::Path::new("Procfile.web")));

    let ctx = CheckContext::new(env, procfile, reporter.clone());
    let checks = CheckRegistry::with_defaults()
        .resolve_all(&DEFAULT_CHECKS, &ctx)
        .unwrap();

    let report = PrebootRunner::new(reporter).run(&checks).unwrap();

    assert!(report.passed());
    assert_eq!(report.ran, 4);
    assert_eq!(
        sink.lines(),
        vec![
            "[Procenv Message] (PE01) Running preboot checks for your application",
            "[Procenv Message] (PB10) Application is expected to bind to port 8000.",
            "[Procenv Message] (DB10) Your application is expected to connect to its database at \"postgres://db/app\".",
        ]
    );
}

#[test]
fn test_missing_procfile_fails_preboot() {
    let dir = tempfile::tempdir().unwrap();

    let (sink, reporter) = reporter();
    let env = environment(&[("PROCFILE", "Procfile.missing")]);
    let procfile = detect_procfile(env.procfile.as_deref(), dir.path(), &reporter);
    assert!(procfile.is_none());

    let ctx = CheckContext::new(env, procfile, reporter.clone());
    let checks = CheckRegistry::with_defaults()
        .resolve_all(&DEFAULT_CHECKS, &ctx)
        .unwrap();

    let report = PrebootRunner::new(reporter).run(&checks).unwrap();

    assert!(!report.passed());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].code, "PF40");
    assert_eq!(sink.count_code("PF10"), 1);
    assert_eq!(sink.count_code("PF40"), 1);
    assert_eq!(sink.count_code("PE11"), 1);
}

#[tokio::test]
async fn test_unset_port_gates_monitor() {
    let (sink, reporter) = reporter();
    let ctx = CheckContext::new(Environment::default(), None, reporter.clone());
    let checks = CheckRegistry::with_defaults()
        .resolve_all(&DEFAULT_CHECKS, &ctx)
        .unwrap();

    let monitors = checks
        .into_iter()
        .filter_map(|check| check.into_monitor())
        .collect();
    let set = MainLoopScheduler::new(reporter).spawn(monitors);
    assert_eq!(set.names(), vec!["PortBindCheck"]);

    let exits = futures::future::join_all(set.into_tasks().into_iter().map(|t| t.handle)).await;
    let exits: Vec<_> = exits.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(exits, vec![MonitorExit::Gated]);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_port_bind_stops_once_application_listens() {
    let port = free_port();
    let (sink, reporter) = reporter();
    let ctx = CheckContext::new(
        environment(&[("PORT", port.to_string().as_str())]),
        None,
        reporter.clone(),
    )
    .with_interval(Duration::from_millis(20));

    let check = CheckRegistry::with_defaults()
        .resolve("port-bind", &ctx)
        .unwrap();
    let monitor = check.into_monitor().unwrap();
    let mut tasks = MainLoopScheduler::new(reporter)
        .spawn(vec![monitor])
        .into_tasks();

    // Let a few ticks find the port unbound
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.count_code("PB40") >= 1);

    // The "application" starts listening
    let _app = TcpListener::bind(("0.0.0.0", port)).await.unwrap();

    let task = tasks.pop().unwrap();
    let exit = tokio::time::timeout(Duration::from_secs(2), task.handle)
        .await
        .expect("Timeout waiting for monitor to stop")
        .unwrap();

    match exit {
        MonitorExit::Stopped { ticks } => {
            assert_eq!(ticks as usize, sink.count_code("PB40") + 1);
        }
        other => panic!("Expected Stopped, got {:?}", other),
    }
    assert!(
        sink.lines()
            .iter()
            .all(|l| l == &format!("[Procenv Message] (PB40) Application is not binding to port {port}."))
    );
}
