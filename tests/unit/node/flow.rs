use super::*;
use crate::{
    config::StageOpts,
    foundation::core::Rect,
    scene::text::MonospaceMeasurer,
    style::attrs::FlexDirection,
};

// MonospaceMeasurer at the default 16px: 8px per character, 20px per line.
fn wrapped() -> TextStyle {
    TextStyle {
        word_wrap: true,
        ..TextStyle::default()
    }
}

fn width(w: Dimension) -> StyleAttributeSet {
    StyleAttributeSet::new().with(StyleAttr::Width(w))
}

fn text_drawable(stage: &Stage, id: NodeId) -> Drawable {
    let v = stage.visuals(id).unwrap().content.unwrap();
    stage.scene().visual(v).unwrap().drawable().clone()
}

#[test]
fn fixed_width_wraps_at_that_width() {
    let mut stage = Stage::headless();
    let n = stage
        .create_flow(
            None,
            &width(Dimension::Px(80.0)),
            "the quick brown fox jumps",
            wrapped(),
        )
        .unwrap();
    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (80.0, 60.0));

    stage.set_styles(n, &width(Dimension::Px(160.0)), None).unwrap();
    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (160.0, 40.0));
    assert_eq!(stage.cached_box(n).unwrap(), Some(b));
    match text_drawable(&stage, n) {
        Drawable::Text { wrap_width, .. } => assert_eq!(wrap_width, Some(160.0)),
        other => panic!("unexpected drawable {other:?}"),
    }
}

#[test]
fn unwrapped_text_takes_its_natural_size() {
    let mut stage = Stage::headless();
    let n = stage
        .create_flow(Some("title"), &StyleAttributeSet::new(), "hello", TextStyle::default())
        .unwrap();
    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (40.0, 20.0));
    assert_eq!(stage.styles(n).unwrap().flex_shrink, Some(0.0));

    stage.set_text(n, "hello world").unwrap();
    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (88.0, 20.0));
    assert_eq!(stage.text(n).unwrap(), "hello world");
    match text_drawable(&stage, n) {
        Drawable::Text { content, size, .. } => {
            assert_eq!(content, "hello world");
            assert_eq!(size, Size::new(88.0, 20.0));
        }
        other => panic!("unexpected drawable {other:?}"),
    }
}

#[test]
fn same_size_text_change_is_still_remeasured() {
    let mut stage = Stage::headless();
    let n = stage
        .create_flow(None, &StyleAttributeSet::new(), "abc", TextStyle::default())
        .unwrap();
    stage.set_text(n, "xyz").unwrap();
    match text_drawable(&stage, n) {
        Drawable::Text { content, .. } => assert_eq!(content, "xyz"),
        other => panic!("unexpected drawable {other:?}"),
    }
}

#[test]
fn relative_width_resolves_then_measures() {
    let mut stage = Stage::headless();
    let parent = stage
        .create_container(None, &width(Dimension::Px(200.0)))
        .unwrap();
    let n = stage
        .create_flow(
            None,
            &width(Dimension::Percent(50.0)),
            "aaaa bbbb cccc dddd",
            wrapped(),
        )
        .unwrap();

    let before = stage.layout_passes();
    stage.add_flex_children(parent, &[n]).unwrap();
    assert!(stage.layout_passes() - before <= 1 + u64::from(stage.opts().flow_pass_cap));

    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (100.0, 40.0));
    assert_eq!(stage.computed_box(parent).unwrap().height, 40.0);
}

#[test]
fn text_style_changes_feed_back_into_layout() {
    let mut stage = Stage::headless();
    let n = stage
        .create_flow(None, &StyleAttributeSet::new(), "hi", TextStyle::default())
        .unwrap();
    let big = TextStyle {
        font_size: 32.0,
        ..TextStyle::default()
    };
    stage.set_text_style(n, big).unwrap();
    let b = stage.computed_box(n).unwrap();
    assert_eq!((b.width, b.height), (32.0, 40.0));
}

#[test]
fn measurement_failure_keeps_the_last_box() {
    let mut stage = Stage::headless();
    let n = stage
        .create_flow(None, &StyleAttributeSet::new(), "hello", TextStyle::default())
        .unwrap();
    let good = stage.cached_box(n).unwrap();

    let broken = TextStyle {
        font_size: 0.0,
        ..TextStyle::default()
    };
    let err = stage.set_text_style(n, broken).unwrap_err();
    assert!(matches!(err, FlexError::Measurement(_)));
    assert_eq!(stage.cached_box(n).unwrap(), good);
    assert_eq!(stage.computed_box(n).unwrap().width, 40.0);
}

#[test]
fn pass_budget_resets_per_recalculation() {
    let opts = StageOpts::default();
    let mut stage = Stage::new(opts, MonospaceMeasurer::default()).unwrap();
    let n = stage
        .create_flow(None, &StyleAttributeSet::new(), "x", TextStyle::default())
        .unwrap();

    stage.epoch += 1;
    assert!(stage.take_flow_passes(n, 2).unwrap());
    assert!(!stage.take_flow_passes(n, 1).unwrap());
    stage.epoch += 1;
    assert!(stage.take_flow_passes(n, 1).unwrap());
    assert!(stage.take_flow_passes(n, 1).unwrap());
    assert!(!stage.take_flow_passes(n, 1).unwrap());
}

#[test]
fn text_api_rejects_other_kinds() {
    let mut stage = Stage::headless();
    let c = stage.create_container(None, &StyleAttributeSet::new()).unwrap();
    assert!(matches!(
        stage.set_text(c, "nope"),
        Err(FlexError::InvalidTopology(_))
    ));
    assert!(stage.text(c).is_err());
}

#[test]
fn size_write_on_flow_leaves_ancestors_cached_at_their_layout_size() {
    let mut stage = Stage::headless();
    let column = StyleAttributeSet::new()
        .with(StyleAttr::Width(Dimension::Px(200.0)))
        .with(StyleAttr::FlexDirection(FlexDirection::Column));
    let root = stage.create_container(None, &column).unwrap();
    let n = stage
        .create_flow(None, &StyleAttributeSet::new(), "hello", TextStyle::default())
        .unwrap();
    stage.add_flex_children(root, &[n]).unwrap();

    // Measured height wins over the written one; the parent must follow it.
    let tall = StyleAttributeSet::new().with(StyleAttr::Height(Dimension::Px(300.0)));
    stage.set_styles(n, &tall, None).unwrap();
    let r = stage.computed_box(root).unwrap();
    assert_eq!((r.width, r.height), (200.0, 20.0));
    for id in [root, n] {
        assert_eq!(stage.cached_box(id).unwrap(), Some(stage.computed_box(id).unwrap()));
    }
    let bg = stage.visuals(root).unwrap().background;
    match stage.scene().visual(bg).unwrap().drawable() {
        Drawable::Fill { shape, .. } => {
            assert_eq!(shape.rect(), Rect::new(0.0, 0.0, 200.0, 20.0));
        }
        other => panic!("unexpected drawable {other:?}"),
    }

    let redraws = |stage: &Stage| -> Vec<u64> {
        [root, n]
            .iter()
            .map(|&id| {
                let v = stage.visuals(id).unwrap().background;
                stage.scene().visual(v).unwrap().redraws()
            })
            .collect()
    };
    let before = redraws(&stage);
    stage.recalculate(root).unwrap();
    assert_eq!(redraws(&stage), before);
}
