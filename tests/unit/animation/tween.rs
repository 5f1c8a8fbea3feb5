use super::*;
use crate::foundation::error::FlexError;

type Log = Vec<(u32, f64)>;

fn record(tag: u32) -> impl FnMut(&mut Log, f64) -> FlexResult<()> {
    move |log: &mut Log, v| {
        log.push((tag, v));
        Ok(())
    }
}

#[test]
fn width_tween_hits_endpoints_and_retires() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    let mut log = Log::new();
    reg.start(
        1,
        "width",
        TweenSpec::new(0.0, 400.0).duration(200.0).easing(Ease::Linear),
        record(1),
    );

    reg.tick(&mut log, 0.0).unwrap();
    assert_eq!(log.last(), Some(&(1, 0.0)));

    reg.tick(&mut log, 100.0).unwrap();
    assert_eq!(log.last(), Some(&(1, 200.0)));
    assert!(reg.is_active(1, "width"));

    reg.tick(&mut log, 100.0).unwrap();
    assert_eq!(log.last(), Some(&(1, 400.0)));
    assert!(!reg.is_active(1, "width"));
    assert!(reg.is_empty());

    // Further ticks deliver nothing.
    let n = log.len();
    reg.tick(&mut log, 16.0).unwrap();
    assert_eq!(log.len(), n);

    // Restarting a retired key is fine.
    reg.start(1, "width", TweenSpec::new(400.0, 0.0), record(2));
    assert!(reg.is_active(1, "width"));
}

#[test]
fn completion_is_exact_even_with_overshooting_dt() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    let mut log = Log::new();
    reg.start(7, "gap", TweenSpec::new(3.0, 17.5), record(7));
    reg.tick(&mut log, 1_000.0).unwrap();
    assert_eq!(log, vec![(7, 17.5)]);
    assert!(reg.is_empty());
}

#[test]
fn restarting_a_key_cancels_the_previous_callback() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    let mut log = Log::new();
    reg.start(1, "width", TweenSpec::new(0.0, 100.0), record(1));
    reg.tick(&mut log, 50.0).unwrap();
    reg.start(1, "width", TweenSpec::new(50.0, 10.0), record(2));
    assert_eq!(reg.len(), 1);

    let mark = log.len();
    reg.tick(&mut log, 50.0).unwrap();
    reg.tick(&mut log, 500.0).unwrap();
    assert!(log[mark..].iter().all(|(tag, _)| *tag == 2));
    assert_eq!(log.last(), Some(&(2, 10.0)));
}

#[test]
fn keys_are_scoped_per_owner() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    reg.start(1, "width", TweenSpec::new(0.0, 1.0), record(1));
    reg.start(2, "width", TweenSpec::new(0.0, 1.0), record(2));
    reg.start(2, "height", TweenSpec::new(0.0, 1.0), record(3));
    assert_eq!(reg.len(), 3);

    assert_eq!(reg.cancel_owner(2), 2);
    assert!(reg.is_active(1, "width"));
    assert!(!reg.cancel(2, "width"));
}

#[test]
fn zero_duration_completes_on_first_tick() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    let mut log = Log::new();
    reg.start(1, "r", TweenSpec::new(0.0, 8.0).duration(0.0), record(1));
    assert_eq!(reg.value(1, "r"), Some(8.0));
    reg.tick(&mut log, 0.0).unwrap();
    assert_eq!(log, vec![(1, 8.0)]);
    assert!(reg.is_empty());
}

#[test]
fn failing_callback_is_cancelled_and_reported_after_others_run() {
    let mut reg = TweenRegistry::<u32, Log>::new();
    let mut log = Log::new();
    reg.start(1, "bad", TweenSpec::new(0.0, 1.0), |_: &mut Log, _| {
        Err(FlexError::measurement("no font"))
    });
    reg.start(2, "good", TweenSpec::new(0.0, 1.0), record(2));

    let err = reg.tick(&mut log, 10.0).unwrap_err();
    assert!(matches!(err, FlexError::Measurement(_)));
    assert_eq!(log.len(), 1);
    assert!(!reg.is_active(1, "bad"));
    assert!(reg.is_active(2, "good"));
}

#[test]
fn absorb_replaces_matching_keys() {
    let mut a = TweenRegistry::<u32, Log>::new();
    let mut b = TweenRegistry::<u32, Log>::new();
    a.start(1, "width", TweenSpec::new(0.0, 1.0), record(1));
    a.start(1, "height", TweenSpec::new(0.0, 1.0), record(1));
    b.start(1, "width", TweenSpec::new(5.0, 6.0), record(9));
    a.absorb(b);
    assert_eq!(a.len(), 2);
    assert_eq!(a.value(1, "width"), Some(5.0));
}

#[test]
fn animation_options_leave_timing_to_the_stage() {
    let o: AnimationOptions = serde_json::from_str("{}").unwrap();
    assert!(o.duration.is_none());
    assert!(o.easing.is_none());
    let o: AnimationOptions = serde_json::from_str(r#"{"duration": 50, "easing": "linear"}"#).unwrap();
    assert_eq!(o.duration, Some(50.0));
}
