use limen_orchestrator::{
    Category, Command, EngineEvent, HostEvent, Inputs, Key, Orchestrator, PlayerKind,
    TransitionPhase, Widget,
};
use limen_stage_core::{Display, NodeId, Prop, PropValue, SelectorList};
use limen_test_fixtures::boot;

const DT: f32 = 1.0 / 60.0;

fn tick(engine: &mut Orchestrator, inputs: Inputs) -> Vec<EngineEvent> {
    engine.update(DT, inputs).events.clone()
}

fn run(engine: &mut Orchestrator, seconds: f32) -> Vec<EngineEvent> {
    let ticks = (seconds / DT).ceil() as usize;
    let mut seen = Vec::new();
    for _ in 0..ticks {
        seen.extend(engine.update(DT, Inputs::new()).events.iter().cloned());
    }
    seen
}

fn find(engine: &Orchestrator, selector: &str) -> NodeId {
    SelectorList::parse(selector)
        .expect("selector parses")
        .first(engine.stage())
        .expect("fixture node present")
}

fn click(engine: &mut Orchestrator, node: NodeId) -> Vec<EngineEvent> {
    tick(engine, Inputs::new().event(HostEvent::Click { node }))
}

fn key(engine: &mut Orchestrator, key: Key, focused: Option<NodeId>) -> Vec<EngineEvent> {
    tick(engine, Inputs::new().event(HostEvent::KeyDown { key, focused }))
}

#[test]
fn menu_overlay_traps_focus_and_scroll_until_closed() {
    let (mut engine, _fetcher, _widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());

    let button = find(&engine, ".nav-menu-button");
    let work_button = find(&engine, ".section.work .button-block");
    let link = find(&engine, ".menu-overlay-links .button-block");
    let link_label = find(&engine, ".menu-overlay-links .button-block .text");

    let opened = click(&mut engine, button);
    assert!(opened.contains(&EngineEvent::MenuOpened));
    assert!(engine.is_menu_open());

    // Page content leaves the tab order; overlay links enter it.
    assert_eq!(engine.stage().attr(work_button, "tabindex"), Some("-1"));
    assert_eq!(engine.stage().attr(work_button, "aria-hidden"), Some("true"));
    assert_eq!(engine.stage().attr(link, "tabindex"), Some("0"));

    // Menu labels were split for the line reveal on first open.
    assert_eq!(engine.stage().text(link_label), None);

    // Wheel input is refused while the overlay is up.
    tick(
        &mut engine,
        Inputs::new().event(HostEvent::Wheel { delta_y: 400.0 }),
    );
    run(&mut engine, 0.5);
    assert_eq!(engine.scroll_y(), 0.0);

    let closed = key(&mut engine, Key::Escape, None);
    assert!(closed.contains(&EngineEvent::MenuClosed));
    assert!(!engine.is_menu_open());

    // Focus is only handed back once the close animation settles.
    assert_eq!(engine.stage().attr(work_button, "tabindex"), Some("-1"));
    run(&mut engine, 1.2);
    assert_eq!(engine.stage().attr(work_button, "tabindex"), Some("0"));
    assert_eq!(engine.stage().attr(work_button, "aria-hidden"), None);
    assert_eq!(engine.stage().attr(link, "tabindex"), Some("-1"));

    tick(
        &mut engine,
        Inputs::new().event(HostEvent::Wheel { delta_y: 120.0 }),
    );
    run(&mut engine, 2.0);
    assert_eq!(engine.scroll_y(), 120.0, "scrolling resumes after close");
}

#[test]
fn enter_opens_the_menu_and_link_clicks_close_it() {
    let (mut engine, _fetcher, _widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());

    let button = find(&engine, ".nav-menu-button");
    let link_label = find(&engine, ".menu-overlay-links .button-block .text");

    let opened = key(&mut engine, Key::Enter, Some(button));
    assert!(opened.contains(&EngineEvent::MenuOpened), "enter activates");

    // A click anywhere inside a nav link closes the overlay; the host issues
    // the actual navigation separately.
    let closed = click(&mut engine, link_label);
    assert!(closed.contains(&EngineEvent::MenuClosed));
    assert!(!engine.is_menu_open());
}

#[test]
fn video_overlay_lifecycle_controls_the_player() {
    let (mut engine, _fetcher, widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());

    let click_block = find(&engine, ".video-click-block");
    let menu_button = find(&engine, ".nav-menu-button");

    let opened = click(&mut engine, click_block);
    assert!(opened.contains(&EngineEvent::VideoOpened {
        kind: PlayerKind::YouTube
    }));
    assert!(engine.is_video_open());
    assert_eq!(
        widgets.player_requests(),
        vec![(
            PlayerKind::YouTube,
            "https://youtu.be/limen-atelier-film".to_string()
        )]
    );

    // Everything outside the overlay leaves the tab order, navbar included.
    assert_eq!(engine.stage().attr(menu_button, "tabindex"), Some("-1"));

    // The scripted player reports ready at once, so playback starts on the
    // same tick the overlay opened.
    let player = widgets.last_player().expect("player created");
    assert!(player.borrow().playing);

    // Arrow keys seek in five-second steps, clamped at the start.
    key(&mut engine, Key::ArrowRight, None);
    assert_eq!(player.borrow().time, 5.0);
    for _ in 0..3 {
        key(&mut engine, Key::ArrowLeft, None);
    }
    assert_eq!(player.borrow().time, 0.0, "rewind clamps at zero");

    // Escape closes the video, never the menu underneath.
    let closed = key(&mut engine, Key::Escape, None);
    assert!(closed.contains(&EngineEvent::VideoClosed));
    assert!(!engine.is_video_open());
    assert!(!engine.is_menu_open());
    run(&mut engine, 0.5);
    assert!(
        player.borrow().destroyed,
        "teardown follows the reverse fade"
    );

    // With the overlay gone, escape owns the menu again.
    let reopened = key(&mut engine, Key::Escape, None);
    assert!(reopened.contains(&EngineEvent::MenuOpened));
}

#[test]
fn space_only_closes_from_the_focused_close_button() {
    let (mut engine, _fetcher, _widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());

    let click_block = find(&engine, ".video-click-block");
    let close_button = find(&engine, ".video-overlay-close-button");
    let work_button = find(&engine, ".section.work .button-block");

    click(&mut engine, click_block);
    assert!(engine.is_video_open());

    let miss = key(&mut engine, Key::Space, Some(work_button));
    assert!(!miss.contains(&EngineEvent::VideoClosed));
    assert!(engine.is_video_open());

    let hit = key(&mut engine, Key::Space, Some(close_button));
    assert!(hit.contains(&EngineEvent::VideoClosed));
    assert!(!engine.is_video_open());
}

#[test]
fn playback_waits_for_an_unready_player_runtime() {
    let (mut engine, _fetcher, widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());
    widgets.hold_players_unready();

    let click_block = find(&engine, ".video-click-block");
    click(&mut engine, click_block);

    let player = widgets.last_player().expect("player created");
    run(&mut engine, 0.5);
    assert!(
        !player.borrow().playing,
        "nothing plays before the runtime is ready"
    );

    player.borrow_mut().ready = true;
    run(&mut engine, 0.1);
    assert!(player.borrow().playing, "polling picks up the ready flip");
}

#[test]
fn navigation_snaps_an_open_menu_shut() {
    let (mut engine, _fetcher, _widgets) = boot("home").expect("home boots");
    tick(&mut engine, Inputs::new());

    let button = find(&engine, ".nav-menu-button");
    let block = find(&engine, ".menu-overlay-block");

    click(&mut engine, button);
    assert!(engine.is_menu_open());

    let events = tick(
        &mut engine,
        Inputs::new().command(Command::Navigate {
            to: "/portfolio".into(),
        }),
    );
    assert!(!engine.is_menu_open());
    assert!(
        !events.contains(&EngineEvent::MenuClosed),
        "the reset is silent"
    );
    assert!(events.contains(&EngineEvent::PhaseChanged {
        phase: TransitionPhase::FadingOut
    }));
    assert_eq!(
        engine.stage().prop(block, Prop::Display),
        Some(PropValue::Display(Display::None))
    );

    run(&mut engine, 1.5);
    assert_eq!(engine.path(), "/portfolio", "the transition still lands");
}

#[test]
fn pages_without_a_video_overlay_stay_inert() {
    let (mut engine, _fetcher, _widgets) = boot("contact").expect("contact boots");

    let first = tick(&mut engine, Inputs::new());
    assert_eq!(first.len(), 3);
    assert!(matches!(
        first[0],
        EngineEvent::WidgetInjected {
            widget: Widget::Scheduler
        }
    ));
    assert!(matches!(
        first[1],
        EngineEvent::RevealStarted {
            category: Category::Heading,
            ..
        }
    ));
    assert_eq!(
        first[2],
        EngineEvent::PageReady {
            path: "/contact".into()
        }
    );
    assert_eq!(engine.reveal_count(), 2, "heading and footer only");

    // No overlay markup: video keys fall through, escape still owns the menu.
    key(&mut engine, Key::ArrowRight, None);
    assert!(!engine.is_video_open());

    let opened = key(&mut engine, Key::Escape, None);
    assert!(opened.contains(&EngineEvent::MenuOpened));
}
