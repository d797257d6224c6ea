//! End-to-end orchestrator behaviour driven through a memory history.

use micro_router::config::parse_config;
use micro_router::location::HashType;
use micro_router::{
    match_route, AppKey, LoadFailure, Location, LocationParser, MemoryHistory, NavigationKind,
    Orchestrator, Phase, RouteDefinition, RouteTable, RouterEvent, Signal, ViewState,
};

mod common;
use common::{started, take_events, ScriptedAssets};

fn key(router: &common::TestRouter) -> Option<&str> {
    router.active_key().map(AppKey::as_str)
}

#[test]
fn test_switching_between_apps() {
    let (mut router, history) = started(
        vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")],
        "/a",
    );
    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(key(&router), Some("/a"));
    assert_eq!(take_events(&mut router), ["route:/a", "enter:/a", "loading:/a"]);

    history.push("/b");
    router.process_pending();

    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(key(&router), Some("/b"));
    assert_eq!(
        take_events(&mut router),
        ["route:/b", "leave:/a", "enter:/b", "loading:/b"]
    );
    assert_eq!(
        router.assets().calls,
        ["initialize", "load:/a", "unload:/a", "load:/b"]
    );
}

#[test]
fn test_unmatched_location_is_not_found() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a")], "/a");
    take_events(&mut router);

    history.push("/z");
    router.process_pending();

    assert_eq!(router.phase(), Phase::NotFound);
    assert!(router.active_key().is_none());
    assert_eq!(take_events(&mut router), ["route:/z", "leave:/a", "not_found"]);
    assert!(matches!(router.snapshot().view(), ViewState::NotFound));

    // Already not found: no second notification.
    history.push("/y");
    router.process_pending();
    assert_eq!(take_events(&mut router), ["route:/y"]);
}

#[test]
fn test_every_unmatched_path_resolves_to_nothing() {
    let definitions = vec![
        RouteDefinition::path("/orders").exact(),
        RouteDefinition::path("/users/:id"),
        RouteDefinition::path("/Docs").sensitive(),
    ];
    for url in ["/", "/orders/1", "/users", "/docs", "/usersx/1"] {
        let location = Location::parse(url).unwrap();
        assert!(match_route(&location, &definitions).is_none(), "{url}");
    }
}

#[test]
fn test_first_registered_match_wins() {
    let definitions = vec![
        RouteDefinition::path("/users").named("list"),
        RouteDefinition::path("/users/:id").named("detail"),
        RouteDefinition::path("/").named("shell"),
    ];
    let cases = [
        ("/users", "list"),
        ("/users/7", "list"),
        ("/settings", "shell"),
        ("/", "shell"),
    ];
    for (url, expected) in cases {
        let location = Location::parse(url).unwrap();
        let matched = match_route(&location, &definitions).unwrap();
        assert_eq!(matched.key.as_str(), expected, "{url}");
    }

    // Registering the narrower pattern first changes the winner.
    let table = RouteTable::new(vec![
        RouteDefinition::path("/users/:id").named("detail"),
        RouteDefinition::path("/users").named("list"),
    ]);
    let matched = table.resolve(&Location::parse("/users/7").unwrap()).unwrap();
    assert_eq!(matched.key.as_str(), "detail");
    assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));
}

#[test]
fn test_load_failure_enters_error_phase() {
    let (mut router, _history) = started(vec![RouteDefinition::path("/a")], "/a");
    take_events(&mut router);

    router.dispatch(Signal::LoadingStarted("app1".into()));
    router.dispatch(Signal::Error(LoadFailure::new("boom")));

    assert_eq!(router.phase(), Phase::Error);
    assert_eq!(router.error().map(|e| e.message.as_str()), Some("boom"));
    assert_eq!(take_events(&mut router), ["loading:app1", "error:boom"]);
    let snapshot = router.snapshot();
    assert!(matches!(snapshot.view(), ViewState::Error(failure) if failure.message == "boom"));
}

#[test]
fn test_stale_finish_is_ignored() {
    let (mut router, history) = started(
        vec![
            RouteDefinition::path("/a").named("app-a"),
            RouteDefinition::path("/b").named("app-b"),
        ],
        "/",
    );
    assert_eq!(router.phase(), Phase::NotFound);
    take_events(&mut router);

    history.push("/a");
    router.process_pending();
    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(
        take_events(&mut router),
        ["route:/a", "enter:app-a", "loading:app-a"]
    );

    history.push("/b");
    router.process_pending();
    assert_eq!(
        take_events(&mut router),
        ["route:/b", "leave:app-a", "enter:app-b", "loading:app-b"]
    );

    router.dispatch(Signal::LoadingFinished("app-a".into()));
    assert_eq!(router.loading_key().map(AppKey::as_str), Some("app-b"));
    assert!(take_events(&mut router).is_empty());

    router.dispatch(Signal::LoadingFinished("app-b".into()));
    assert!(router.loading_key().is_none());
    assert_eq!(take_events(&mut router), ["finish:app-b"]);

    // A repeated finish for a completed load is stale too.
    router.dispatch(Signal::LoadingFinished("app-b".into()));
    assert!(take_events(&mut router).is_empty());
}

#[test]
fn test_finish_after_leaving_to_not_found_is_dropped() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a").named("app-a")], "/a");
    assert_eq!(router.loading_key().map(AppKey::as_str), Some("app-a"));

    history.push("/z");
    router.process_pending();
    assert_eq!(router.phase(), Phase::NotFound);
    assert!(router.loading_key().is_none());
    take_events(&mut router);

    router.dispatch(Signal::LoadingFinished("app-a".into()));
    assert!(take_events(&mut router).is_empty());
    assert_eq!(router.phase(), Phase::NotFound);
}

#[test]
fn test_finish_of_left_app_before_next_start_is_dropped() {
    let (mut router, _history) = started(
        vec![
            RouteDefinition::path("/a").named("app-a"),
            RouteDefinition::path("/b").named("app-b"),
        ],
        "/a",
    );
    take_events(&mut router);

    // Deliver the navigation directly so app-b's start stays queued.
    router.dispatch(Signal::Navigate {
        url: "/b".into(),
        kind: NavigationKind::Push,
    });
    assert!(router.loading_key().is_none());
    assert!(matches!(
        router.snapshot().view(),
        ViewState::App { loading: false, .. }
    ));

    router.dispatch(Signal::LoadingFinished("app-a".into()));
    assert_eq!(
        take_events(&mut router),
        ["route:/b", "leave:app-a", "enter:app-b"]
    );

    router.process_pending();
    assert_eq!(router.loading_key().map(AppKey::as_str), Some("app-b"));
    assert!(matches!(
        router.snapshot().view(),
        ViewState::App { loading: true, .. }
    ));
    router.dispatch(Signal::LoadingFinished("app-b".into()));
    assert_eq!(take_events(&mut router), ["loading:app-b", "finish:app-b"]);
}

#[test]
fn test_nothing_happens_after_teardown() {
    let (mut router, history) = started(
        vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")],
        "/a",
    );
    take_events(&mut router);

    router.stop();
    assert_eq!(router.assets().calls.last().map(String::as_str), Some("teardown"));
    assert_eq!(history.listener_count(), 0);

    history.push("/b");
    let sender = router.sender();
    sender.navigate("/b", NavigationKind::Push);
    sender.initialized();
    sender.loading_started("/b");
    sender.loading_finished("/a");
    sender.not_found();
    sender.error(LoadFailure::new("late"));
    sender.update_routes(RouteTable::new(Vec::new()));
    router.process_pending();
    router.dispatch(Signal::NotFound);

    assert!(router.hooks().is_empty());
    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(key(&router), Some("/a"));
    assert_eq!(router.table().len(), 2);

    // Stopping again is harmless and does not tear the collaborator down twice.
    router.stop();
    let teardowns = router
        .assets()
        .calls
        .iter()
        .filter(|c| c.as_str() == "teardown")
        .count();
    assert_eq!(teardowns, 1);
}

#[test]
fn test_route_change_only_for_distinct_urls() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a")], "/a");
    take_events(&mut router);

    history.replace("/a");
    router.process_pending();
    assert!(router.hooks().is_empty());

    history.push("/a?tab=2");
    router.process_pending();
    match router.hooks().as_slice() {
        [RouterEvent::RouteChange(change)] => {
            assert_eq!(change.pathname, "/a");
            assert_eq!(change.query.get("tab").map(String::as_str), Some("2"));
        }
        other => panic!("unexpected events: {other:?}"),
    }
    // Same app, nothing to enter or leave.
    assert_eq!(key(&router), Some("/a"));
}

#[test]
fn test_back_and_forward_reach_the_router() {
    let (mut router, history) = started(
        vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")],
        "/a",
    );
    history.push("/b");
    router.process_pending();
    take_events(&mut router);

    assert!(history.back());
    router.process_pending();
    assert_eq!(key(&router), Some("/a"));
    match router.hooks().first() {
        Some(RouterEvent::RouteChange(change)) => {
            assert_eq!(change.kind, NavigationKind::PopState)
        }
        other => panic!("unexpected event: {other:?}"),
    }
    take_events(&mut router);

    assert!(history.forward());
    router.process_pending();
    assert_eq!(key(&router), Some("/b"));
}

#[test]
fn test_navigation_recovers_from_error() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a")], "/a");
    router.dispatch(Signal::Error(LoadFailure::for_app("boom", "/a")));
    assert_eq!(router.phase(), Phase::Error);
    take_events(&mut router);

    history.push("/a/settings");
    router.process_pending();

    assert_eq!(router.phase(), Phase::Normal);
    assert!(router.error().is_none());
    assert_eq!(take_events(&mut router), ["route:/a/settings"]);
}

#[test]
fn test_navigation_recovers_from_not_found() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a")], "/z");
    assert_eq!(router.phase(), Phase::NotFound);
    take_events(&mut router);

    history.push("/a");
    router.process_pending();

    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(take_events(&mut router), ["route:/a", "enter:/a", "loading:/a"]);
}

#[test]
fn test_not_found_signal_leaves_active_app() {
    let (mut router, history) = started(vec![RouteDefinition::path("/a")], "/a");
    router.dispatch(Signal::LoadingFinished("/a".into()));
    take_events(&mut router);

    router.dispatch(Signal::NotFound);
    assert_eq!(router.phase(), Phase::NotFound);
    assert!(router.active_key().is_none());
    assert_eq!(take_events(&mut router), ["leave:/a", "not_found"]);

    history.push("/a/x");
    router.process_pending();
    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(take_events(&mut router), ["route:/a/x", "enter:/a", "loading:/a"]);
}

#[test]
fn test_resolution_waits_for_initialization() {
    let mut router = Orchestrator::new(
        RouteTable::new(vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")]),
        Vec::new(),
        ScriptedAssets::deferred(),
    );
    let mut history = MemoryHistory::new("/a");
    router.start(&mut history);
    router.process_pending();

    assert_eq!(router.phase(), Phase::Booting);
    assert!(router.active_key().is_none());
    assert!(matches!(router.snapshot().view(), ViewState::Booting));

    history.push("/b");
    router.dispatch(Signal::NotFound);
    router.process_pending();
    assert_eq!(router.phase(), Phase::Booting);
    assert_eq!(take_events(&mut router), ["route:/a", "route:/b"]);

    router.sender().initialized();
    router.process_pending();
    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(key(&router), Some("/b"));
    assert_eq!(take_events(&mut router), ["enter:/b", "loading:/b"]);

    // A second initialized signal changes nothing.
    router.dispatch(Signal::Initialized);
    assert!(router.hooks().is_empty());
}

#[test]
fn test_error_while_booting_applies_once_initialized() {
    let mut router = Orchestrator::new(
        RouteTable::new(vec![RouteDefinition::path("/a")]),
        Vec::new(),
        ScriptedAssets::deferred(),
    );
    let mut history = MemoryHistory::new("/a");
    router.start(&mut history);
    router.process_pending();
    take_events(&mut router);

    router.dispatch(Signal::Error(LoadFailure::new("cdn down")));
    assert_eq!(router.phase(), Phase::Booting);
    assert!(router.hooks().is_empty());

    router.dispatch(Signal::Initialized);
    assert_eq!(router.phase(), Phase::Error);
    assert!(router.active_key().is_none());
    assert_eq!(take_events(&mut router), ["error:cdn down"]);
}

#[test]
fn test_update_routes_reconciles_active_app() {
    let (mut router, _history) = started(vec![RouteDefinition::path("/a")], "/a/x");
    take_events(&mut router);

    let config = parse_config(
        r#"
[[routes]]
name = "shell"
path = "/"
"#,
    )
    .unwrap();
    router.dispatch(Signal::UpdateRoutes(config.route_table()));

    assert_eq!(router.phase(), Phase::Normal);
    assert_eq!(key(&router), Some("shell"));
    assert_eq!(take_events(&mut router), ["leave:/a", "enter:shell", "loading:shell"]);

    router.dispatch(Signal::UpdateRoutes(RouteTable::new(vec![
        RouteDefinition::path("/b"),
    ])));
    assert_eq!(router.phase(), Phase::NotFound);
    assert_eq!(take_events(&mut router), ["leave:shell", "not_found"]);
}

#[test]
fn test_update_routes_keeps_error_for_same_app() {
    let (mut router, _history) = started(vec![RouteDefinition::path("/a")], "/a");
    router.dispatch(Signal::Error(LoadFailure::new("boom")));
    take_events(&mut router);

    router.dispatch(Signal::UpdateRoutes(RouteTable::new(vec![
        RouteDefinition::path("/a"),
    ])));
    assert_eq!(router.phase(), Phase::Error);
    assert!(router.hooks().is_empty());
}

#[test]
fn test_basename_travels_with_match() {
    let table = RouteTable::with_basename(
        Some("/portal".to_string()),
        vec![
            RouteDefinition::path("/seller/:id").named("seller"),
            RouteDefinition::path("/admin")
                .named("admin")
                .with_basename("/console"),
        ],
    );
    let mut router = Orchestrator::new(table, Vec::new(), ScriptedAssets::new());
    let mut history = MemoryHistory::new("/portal/seller/7/orders");
    router.start(&mut history);
    router.process_pending();

    let active = router.active_match().unwrap();
    assert_eq!(active.key.as_str(), "seller");
    assert_eq!(active.basename, "/portal/seller/7");
    assert_eq!(active.params.get("id").map(String::as_str), Some("7"));
    match router.hooks().iter().find(|e| matches!(e, RouterEvent::AppEnter { .. })) {
        Some(RouterEvent::AppEnter { basename, .. }) => assert_eq!(basename, "/portal/seller/7"),
        other => panic!("unexpected event: {other:?}"),
    }

    history.push("/portal/admin");
    router.process_pending();
    assert_eq!(router.active_match().unwrap().basename, "/portal/console");
}

#[test]
fn test_hash_routing() {
    let parser = LocationParser::default().with_hash_type(Some(HashType::Slash));
    let mut router = Orchestrator::new(
        RouteTable::new(vec![RouteDefinition::path("/users/:id")]),
        Vec::new(),
        ScriptedAssets::new(),
    )
    .with_parser(parser);
    let mut history = MemoryHistory::new("/index.html#/users/42");
    router.start(&mut history);
    router.process_pending();

    assert_eq!(router.phase(), Phase::Normal);
    let active = router.active_match().unwrap();
    assert_eq!(active.params.get("id").map(String::as_str), Some("42"));
    assert_eq!(router.location().unwrap().pathname, "/users/42");
}

#[test]
fn test_predicate_definitions() {
    let (router, _history) = started(
        vec![
            RouteDefinition::predicate("beta", |location: &Location| {
                location.query.get("beta").map(String::as_str) == Some("1")
            }),
            RouteDefinition::path("/"),
        ],
        "/home?beta=1",
    );
    assert_eq!(key(&router), Some("beta"));
}
