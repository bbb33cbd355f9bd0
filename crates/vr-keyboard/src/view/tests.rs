//! Tests for the keyboard view state machine.

use vr_keyboard_core::{HoverAction, HoverEvent, PointerEvent};

use super::*;
use crate::action::SwipeDirection;
use crate::layout::{Key, LayoutBuilder, codes};

const Q: usize = 0;
const W: usize = 1;
const R: usize = 3;
const T: usize = 4;
const ABC: usize = 5;
const DEL: usize = 6;
const SHIFT: usize = 8;

/// Two rows of 40x40 keys, 200x80 in total.
///
/// ```text
/// q     w    e     r(®)   t
/// abc   del  .com  shift  space
/// ```
fn test_layout() -> Layout {
    LayoutBuilder::new()
        .key_size(40, 40)
        .row([
            Key::char('q'),
            Key::char('w'),
            Key::char('e'),
            Key::char('r').with_alternates("®"),
            Key::char('t'),
        ])
        .row([
            Key::new(['a' as i32, 'b' as i32, 'c' as i32]).with_label("abc"),
            Key::new([codes::DELETE]).with_label("del").repeatable(),
            Key::new([codes::DOMAIN]).with_text(".com"),
            Key::new([codes::SHIFT]),
            Key::new([codes::SPACE]),
        ])
        .build()
        .unwrap()
}

fn view() -> KeyboardView {
    KeyboardView::new(test_layout(), KeyboardConfig::default())
}

fn view_with(config: KeyboardConfig) -> KeyboardView {
    KeyboardView::new(test_layout(), config)
}

/// Center of a key.
fn at(view: &KeyboardView, key: usize) -> (f32, f32) {
    let (x, y) = view.layout().keys()[key].center();
    (x as f32, y as f32)
}

fn tap(view: &mut KeyboardView, key: usize, down: Millis, up: Millis) {
    let (x, y) = at(view, key);
    view.on_pointer_event(PointerEvent::down(x, y, down));
    view.on_pointer_event(PointerEvent::up(x, y, up));
}

fn commits(actions: &[KeyboardAction]) -> Vec<i32> {
    actions
        .iter()
        .filter_map(|action| match action {
            KeyboardAction::KeyCommit { code, .. } => Some(*code),
            _ => None,
        })
        .collect()
}

#[test]
fn test_tap_commits_key() {
    let mut view = view();
    tap(&mut view, Q, 0, 50);
    assert_eq!(
        view.take_actions(),
        vec![
            KeyboardAction::Press { code: 'q' as i32 },
            KeyboardAction::KeyCommit {
                code: 'q' as i32,
                candidates: vec!['q' as i32],
                has_popup: false,
            },
            KeyboardAction::Release { code: 'q' as i32 },
        ]
    );
    assert_eq!(view.state(), TouchState::Idle);
}

#[test]
fn test_tap_outside_keys_reports_no_key() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(300.0, 300.0, 0));
    view.on_pointer_event(PointerEvent::up(300.0, 300.0, 10));
    assert_eq!(
        view.take_actions(),
        vec![KeyboardAction::Press { code: 0 }, KeyboardAction::NoKey]
    );
}

#[test]
fn test_release_debounces_to_last_key() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    // drift onto w after 100ms, release 30ms later
    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 100));
    view.on_pointer_event(PointerEvent::up(60.0, 20.0, 130));

    let session = view.session();
    assert_eq!(session.last_key, Some(Q));
    assert!(session.current_key_time < session.last_key_time);
    assert_eq!(commits(&view.take_actions()), vec!['q' as i32]);
}

#[test]
fn test_release_after_drifting_commits_pressed_key() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 100));
    view.on_pointer_event(PointerEvent::up(60.0, 20.0, 300));

    assert_eq!(view.session().current_key, Some(Q));
    assert_eq!(commits(&view.take_actions()), vec!['q' as i32]);
}

#[test]
fn test_release_without_debounce_uses_release_point_for_candidates() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 100));
    view.on_pointer_event(PointerEvent::up(60.0, 20.0, 100));

    let commit = view
        .take_actions()
        .into_iter()
        .find(|action| matches!(action, KeyboardAction::KeyCommit { .. }));
    assert_eq!(
        commit,
        Some(KeyboardAction::KeyCommit {
            code: 'q' as i32,
            candidates: vec!['w' as i32],
            has_popup: false,
        })
    );
}

#[test]
fn test_multi_tap_cycles_codes() {
    let mut view = view();
    tap(&mut view, ABC, 0, 10);
    tap(&mut view, ABC, 100, 110);
    tap(&mut view, ABC, 200, 210);

    let relevant: Vec<_> = view
        .take_actions()
        .into_iter()
        .filter(|action| {
            matches!(
                action,
                KeyboardAction::KeyCommit { .. } | KeyboardAction::DeleteProvisional
            )
        })
        .collect();
    let commit = |c: char| KeyboardAction::KeyCommit {
        code: c as i32,
        candidates: vec!['a' as i32, 'b' as i32, 'c' as i32],
        has_popup: false,
    };
    assert_eq!(
        relevant,
        vec![
            commit('a'),
            KeyboardAction::DeleteProvisional,
            commit('b'),
            KeyboardAction::DeleteProvisional,
            commit('c'),
        ]
    );
}

#[test]
fn test_slow_taps_do_not_cycle() {
    let mut view = view();
    tap(&mut view, ABC, 0, 10);
    tap(&mut view, ABC, 400, 410);
    let actions = view.take_actions();
    assert_eq!(commits(&actions), vec!['a' as i32, 'a' as i32]);
    assert!(!actions.contains(&KeyboardAction::DeleteProvisional));
}

#[test]
fn test_shift_double_tap_enters_multi_tap_without_retraction() {
    let mut view = view();
    tap(&mut view, SHIFT, 0, 10);
    tap(&mut view, SHIFT, 100, 110);
    let actions = view.take_actions();
    assert_eq!(commits(&actions), vec![codes::SHIFT, codes::SHIFT]);
    assert!(!actions.contains(&KeyboardAction::DeleteProvisional));
    assert!(actions.contains(&KeyboardAction::MultiTap { key: SHIFT }));
}

#[test]
fn test_text_key_emits_text() {
    let mut view = view();
    tap(&mut view, 7, 0, 10);
    assert_eq!(
        view.take_actions(),
        vec![
            KeyboardAction::Press { code: codes::DOMAIN },
            KeyboardAction::Text(".com".into()),
            KeyboardAction::Release { code: NOT_A_KEY },
        ]
    );
}

#[test]
fn test_repeatable_key_repeats_while_held() {
    let mut view = view();
    let (x, y) = at(&view, DEL);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    // immediate commit on down
    assert_eq!(commits(&view.take_actions()), vec![codes::DELETE]);

    view.tick(399);
    assert!(commits(&view.take_actions()).is_empty());

    // 400 + 50 * 3
    view.tick(550);
    view.on_pointer_event(PointerEvent::up(x, y, 560));
    let actions = view.take_actions();
    assert_eq!(commits(&actions), vec![codes::DELETE; 4]);
    // release after repeating does not commit again
    assert!(!actions.contains(&KeyboardAction::NoKey));

    view.tick(2_000);
    assert!(view.take_actions().is_empty());
}

#[test]
fn test_fast_motion_is_a_swipe_not_a_key() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(10.0, 20.0, 0));
    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 10));
    view.on_pointer_event(PointerEvent::moved(110.0, 20.0, 20));
    view.on_pointer_event(PointerEvent::moved(160.0, 20.0, 30));
    view.on_pointer_event(PointerEvent::up(190.0, 20.0, 40));

    let actions = view.take_actions();
    let swipes = actions
        .iter()
        .filter(|action| matches!(action, KeyboardAction::Swipe(_)))
        .count();
    assert_eq!(swipes, 1);
    assert!(actions.contains(&KeyboardAction::Swipe(SwipeDirection::Right)));
    assert!(commits(&actions).is_empty());
    assert!(!actions.contains(&KeyboardAction::NoKey));
}

/// Quick flick that stalls before reaching swipe distance, then creeps over.
fn stalled_flick(view: &mut KeyboardView) {
    view.on_pointer_event(PointerEvent::down(10.0, 20.0, 0));
    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 10));
    view.on_pointer_event(PointerEvent::moved(100.0, 20.0, 20));
    view.on_pointer_event(PointerEvent::moved(120.0, 20.0, 400));
    view.on_pointer_event(PointerEvent::up(120.0, 20.0, 410));
}

#[test]
fn test_decayed_flick_commits_down_key() {
    let mut config = KeyboardConfig::default();
    config.disambiguate_swipe = true;
    let mut view = view_with(config);
    stalled_flick(&mut view);

    let actions = view.take_actions();
    assert_eq!(commits(&actions), vec!['q' as i32]);
    assert!(!actions.iter().any(|a| matches!(a, KeyboardAction::Swipe(_))));
}

#[test]
fn test_decayed_flick_without_disambiguation_is_a_swipe() {
    let mut view = view();
    stalled_flick(&mut view);

    let actions = view.take_actions();
    assert!(actions.contains(&KeyboardAction::Swipe(SwipeDirection::Right)));
    assert!(commits(&actions).is_empty());
}

#[test]
fn test_long_press_on_key_with_alternates_aborts() {
    let mut view = view();
    let (x, y) = at(&view, R);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    view.tick(500);

    assert_eq!(view.take_popup_request(), Some(R));
    assert!(view.is_aborted());

    view.on_pointer_event(PointerEvent::moved(x + 1.0, y, 550));
    view.on_pointer_event(PointerEvent::up(x, y, 600));
    let actions = view.take_actions();
    assert!(actions.contains(&KeyboardAction::LongPress {
        key: R,
        code: 'r' as i32
    }));
    assert!(commits(&actions).is_empty());
}

#[test]
fn test_long_press_without_alternates_still_commits() {
    let mut view = view();
    let (x, y) = at(&view, SHIFT);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    view.tick(600);
    view.on_pointer_event(PointerEvent::up(x, y, 700));

    let actions = view.take_actions();
    assert!(actions.contains(&KeyboardAction::LongPress {
        key: SHIFT,
        code: codes::SHIFT
    }));
    assert_eq!(commits(&actions), vec![codes::SHIFT]);
    assert_eq!(view.take_popup_request(), None);
}

#[test]
fn test_released_session_drops_pending_timers() {
    let mut view = view();
    tap(&mut view, R, 0, 100);
    view.take_actions();
    view.tick(1_000);
    assert!(view.take_actions().is_empty());
    assert_eq!(view.take_popup_request(), None);
}

#[test]
fn test_second_pointer_releases_first() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    view.on_pointer_event(PointerEvent::moved(22.0, 20.0, 10));

    // second finger lands on t
    view.on_pointer_event(PointerEvent::down(180.0, 20.0, 20).with_pointer_count(2));
    assert_eq!(commits(&view.take_actions()), vec!['q' as i32]);

    // both fingers moving
    view.on_pointer_event(PointerEvent::moved(100.0, 20.0, 30).with_pointer_count(2));
    view.on_pointer_event(PointerEvent::moved(60.0, 60.0, 40).with_pointer_count(2));
    assert!(view.take_actions().is_empty());

    // first finger lifts, second keeps moving and lifts on t
    view.on_pointer_event(PointerEvent::up(60.0, 60.0, 50).with_pointer_count(2));
    view.on_pointer_event(PointerEvent::moved(180.0, 20.0, 60));
    view.on_pointer_event(PointerEvent::up(180.0, 20.0, 70));
    let actions = view.take_actions();
    assert_eq!(actions[0], KeyboardAction::Press { code: 't' as i32 });
    assert_eq!(commits(&actions), vec!['t' as i32]);
}

#[test]
fn test_single_pointer_up_after_count_change_delivers_down_and_up() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0).with_pointer_count(2));
    view.take_actions();

    let (x, y) = at(&view, W);
    view.on_pointer_event(PointerEvent::up(x, y, 10));
    let actions = view.take_actions();
    assert_eq!(actions[0], KeyboardAction::Press { code: 'w' as i32 });
    assert_eq!(commits(&actions), vec!['w' as i32]);
}

#[test]
fn test_disabled_keys_swallow_events() {
    let mut view = view();
    view.update_layout(|layout| layout.disable_keys([Q]));
    tap(&mut view, Q, 0, 10);
    assert!(view.take_actions().is_empty());

    tap(&mut view, W, 100, 110);
    assert_eq!(commits(&view.take_actions()), vec!['w' as i32]);
}

#[test]
fn test_far_and_non_finite_points_hit_nothing() {
    let mut config = KeyboardConfig::default();
    config.proximity_correction = true;
    config.padding_left = 4;
    config.padding_top = 6;
    config.vertical_correction = 5;
    let mut view = view_with(config);

    let points = [
        (100_000.0, 20.0),
        (-100_000.0, -100_000.0),
        (f32::NEG_INFINITY, 20.0),
        (20.0, f32::INFINITY),
        (f32::MAX, f32::MIN),
    ];
    for (step, (x, y)) in points.into_iter().enumerate() {
        let time = step as Millis * 100;
        view.on_pointer_event(PointerEvent::down(x, y, time));
        view.on_pointer_event(PointerEvent::cancel(time + 10));
        view.on_hover_event(HoverEvent::new(HoverAction::Move, x, y, 1));
        assert_eq!(
            view.take_actions(),
            vec![KeyboardAction::Press { code: 0 }],
            "point ({x}, {y})"
        );
    }
}

#[test]
fn test_cancel_aborts_without_commit() {
    let mut view = view();
    let (x, y) = at(&view, Q);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    view.on_pointer_event(PointerEvent::cancel(10));
    view.on_pointer_event(PointerEvent::moved(x, y, 20));
    view.on_pointer_event(PointerEvent::up(x, y, 30));

    assert!(view.is_aborted());
    assert_eq!(
        view.take_actions(),
        vec![KeyboardAction::Press { code: 'q' as i32 }]
    );

    tap(&mut view, Q, 100, 110);
    assert_eq!(commits(&view.take_actions()), vec!['q' as i32]);
}

#[test]
fn test_layout_swap_aborts_session() {
    let mut view = view();
    let (x, y) = at(&view, Q);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    view.set_layout(test_layout());
    view.on_pointer_event(PointerEvent::up(x, y, 30));
    view.tick(1_000);

    let actions = view.take_actions();
    assert!(commits(&actions).is_empty());
    assert!(!actions.iter().any(|a| matches!(a, KeyboardAction::LongPress { .. })));
    assert!(
        view.take_requests()
            .iter()
            .any(|r| r.kind == SurfaceRequestKind::InvalidateAll)
    );
}

#[test]
fn test_padding_and_vertical_correction() {
    let mut config = KeyboardConfig::default();
    config.padding_left = 10;
    config.padding_top = 5;
    config.vertical_correction = -10;
    let mut view = view_with(config);

    // (45, 55) lands on (35, 40): first key of the second row
    view.on_pointer_event(PointerEvent::down(45.0, 55.0, 0));
    view.on_pointer_event(PointerEvent::up(45.0, 55.0, 10));
    assert_eq!(commits(&view.take_actions()), vec!['a' as i32]);
}

#[test]
fn test_preview_shows_and_hides_after_delay() {
    let mut view = view();
    let (x, y) = at(&view, Q);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    assert!(view.is_preview_visible());
    assert_eq!(view.pressed_key(), Some(Q));
    let requests = view.take_requests();
    assert!(requests.iter().any(|r| matches!(
        &r.kind,
        SurfaceRequestKind::ShowPreview(bubble) if bubble.key == Q && bubble.label == "q"
    )));

    view.on_pointer_event(PointerEvent::up(x, y, 50));
    assert_eq!(view.pressed_key(), None);
    view.tick(119);
    assert!(view.is_preview_visible());
    view.tick(120);
    assert!(!view.is_preview_visible());
    assert!(
        view.take_requests()
            .iter()
            .any(|r| r.kind == SurfaceRequestKind::HidePreview)
    );
}

#[test]
fn test_preview_stays_on_pressed_key_while_drifting() {
    let mut view = view();
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    assert!(view.is_preview_visible());
    view.take_requests();

    view.on_pointer_event(PointerEvent::moved(60.0, 20.0, 300));
    assert!(!view.take_requests().iter().any(|r| matches!(
        &r.kind,
        SurfaceRequestKind::ShowPreview(bubble) if bubble.key == W
    )));
}

#[test]
fn test_visible_preview_switches_without_delay() {
    let mut config = KeyboardConfig::default();
    config.timing.preview_delay_before_ms = 100;
    let mut view = view_with(config);

    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    assert!(!view.is_preview_visible());
    view.tick(100);
    assert!(view.is_preview_visible());
    view.on_pointer_event(PointerEvent::up(20.0, 20.0, 150));
    view.take_requests();

    // still inside the hide delay
    let (x, y) = at(&view, W);
    view.on_pointer_event(PointerEvent::down(x, y, 180));
    assert!(view.take_requests().iter().any(|r| matches!(
        &r.kind,
        SurfaceRequestKind::ShowPreview(bubble) if bubble.key == W
    )));
}

#[test]
fn test_preview_label_follows_shift() {
    let mut view = view();
    view.set_shifted(true);
    view.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
    assert!(view.take_requests().iter().any(|r| matches!(
        &r.kind,
        SurfaceRequestKind::ShowPreview(bubble) if bubble.label == "Q"
    )));
}

#[test]
fn test_hover_invalidates_changed_keys() {
    let mut view = view();
    let (qx, qy) = at(&view, Q);
    let (wx, wy) = at(&view, W);

    view.on_hover_event(HoverEvent::new(HoverAction::Enter, qx, qy, 1));
    assert!(view.layout().keys()[Q].is_hovered());
    assert_eq!(
        view.take_requests(),
        vec![SurfaceRequest::new(
            SurfaceLayer::Main,
            SurfaceRequestKind::InvalidateKey(Q)
        )]
    );

    view.on_hover_event(HoverEvent::new(HoverAction::Move, qx + 2.0, qy, 1));
    assert!(view.take_requests().is_empty());

    view.on_hover_event(HoverEvent::new(HoverAction::Move, wx, wy, 1));
    let invalidated: Vec<_> = view
        .take_requests()
        .into_iter()
        .map(|r| r.kind)
        .collect();
    assert_eq!(
        invalidated,
        vec![
            SurfaceRequestKind::InvalidateKey(W),
            SurfaceRequestKind::InvalidateKey(Q)
        ]
    );
    assert!(!view.layout().keys()[Q].is_hovered());
    assert!(view.take_actions().is_empty());

    view.set_hovered(false);
    assert!(!view.is_hovered());
    assert!(!view.layout().keys()[W].is_hovered());
    assert_eq!(
        view.take_requests()
            .into_iter()
            .map(|r| r.kind)
            .collect::<Vec<_>>(),
        vec![SurfaceRequestKind::InvalidateAll]
    );
}

#[test]
fn test_hover_exit_clears_device() {
    let mut view = view();
    let (x, y) = at(&view, T);
    view.on_hover_event(HoverEvent::new(HoverAction::Move, x, y, 0));
    view.on_hover_event(HoverEvent::new(HoverAction::Exit, x, y, 0));
    assert!(!view.is_hovered());
    assert!(!view.layout().keys()[T].is_hovered());
}

#[test]
fn test_resize_failure_keeps_geometry() {
    let mut view = view();
    let before = view.layout().keys().to_vec();
    assert!(view.resize(0).is_err());
    assert_eq!(view.layout().keys(), &before[..]);

    view.resize(100).unwrap();
    assert_eq!(view.layout().total_width(), 100);
}

#[test]
fn test_close_cancels_everything() {
    let mut view = view();
    let (x, y) = at(&view, DEL);
    view.on_pointer_event(PointerEvent::down(x, y, 0));
    view.take_actions();
    view.close();
    assert!(view.is_aborted());
    assert!(!view.is_preview_visible());
    assert_eq!(view.next_deadline(), None);
    view.tick(5_000);
    assert!(view.take_actions().is_empty());
}
