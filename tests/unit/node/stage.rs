use super::*;
use crate::{
    animation::{driver::FrameDriver, ease::Ease},
    foundation::core::{Fps, Vec2},
    style::attrs::{Gutter, Overflow},
};

fn px(v: f32) -> Dimension {
    Dimension::Px(v)
}

fn sized(w: f32, h: f32) -> StyleAttributeSet {
    StyleAttributeSet::new()
        .with(StyleAttr::Width(px(w)))
        .with(StyleAttr::Height(px(h)))
}

fn scene_order(stage: &Stage, id: NodeId) -> Vec<NodeId> {
    let group = stage.visuals(id).unwrap().group;
    stage
        .scene()
        .children(group)
        .iter()
        .filter_map(|&v| stage.scene().get(v).and_then(Visual::layout_node))
        .collect()
}

fn redraws(stage: &Stage, id: NodeId) -> u64 {
    let bg = stage.visuals(id).unwrap().background;
    stage.scene().visual(bg).unwrap().redraws()
}

fn linear(ms: f64) -> AnimationOptions {
    AnimationOptions {
        duration: Some(ms),
        easing: Some(Ease::Linear),
    }
}

#[test]
fn solver_and_scene_child_order_stay_equal() {
    let mut stage = Stage::headless();
    let root = stage.create_container(Some("root"), &sized(300.0, 100.0)).unwrap();
    let a = stage.create_container(Some("a"), &sized(10.0, 10.0)).unwrap();
    let b = stage.create_container(Some("b"), &sized(10.0, 10.0)).unwrap();
    let c = stage.create_container(Some("c"), &sized(10.0, 10.0)).unwrap();

    stage.add_flex_children(root, &[a, b]).unwrap();
    stage.add_flex_children(root, &[c]).unwrap();
    assert_eq!(stage.solver_children(root).unwrap(), vec![a, b, c]);
    assert_eq!(scene_order(&stage, root), vec![a, b, c]);
    assert_eq!(stage.children(root).unwrap(), &[a, b, c]);
    assert_eq!(stage.computed_box(c).unwrap().left, 20.0);

    stage.remove_flex_child(root, b).unwrap();
    assert_eq!(stage.solver_children(root).unwrap(), vec![a, c]);
    assert_eq!(scene_order(&stage, root), vec![a, c]);
    assert_eq!(stage.parent(b).unwrap(), None);
    assert_eq!(stage.computed_box(c).unwrap().left, 10.0);

    stage.add_flex_children(root, &[b]).unwrap();
    assert_eq!(stage.solver_children(root).unwrap(), vec![a, c, b]);
    assert_eq!(scene_order(&stage, root), vec![a, c, b]);
}

#[test]
fn border_is_kept_above_children() {
    let mut stage = Stage::headless();
    let root = stage.create_container(None, &sized(100.0, 100.0)).unwrap();
    let a = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    stage.add_flex_children(root, &[a]).unwrap();

    let v = stage.visuals(root).unwrap();
    let kids = stage.scene().children(v.group);
    assert_eq!(kids.first(), Some(&v.background));
    assert_eq!(kids.last(), Some(&v.border));
}

#[test]
fn hierarchy_misuse_fails_fast_without_changes() {
    let mut stage = Stage::headless();
    let p1 = stage.create_container(None, &sized(100.0, 100.0)).unwrap();
    let p2 = stage.create_container(None, &sized(100.0, 100.0)).unwrap();
    let child = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    let other = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    stage.add_flex_children(p1, &[child]).unwrap();

    let err = stage.add_flex_children(p2, &[other, child]).unwrap_err();
    assert!(matches!(err, FlexError::InvalidTopology(_)));
    assert!(stage.children(p2).unwrap().is_empty());
    assert_eq!(stage.parent(other).unwrap(), None);

    let err = stage.remove_flex_child(p2, child).unwrap_err();
    assert!(matches!(err, FlexError::InvalidTopology(_)));

    // p1 is the root above `child`.
    assert!(stage.add_flex_children(child, &[p1]).is_err());
    assert!(stage.add_flex_children(p2, &[other, other]).is_err());
    assert_eq!(stage.solver_children(p1).unwrap(), vec![child]);
}

#[test]
fn recalculate_is_idempotent_and_redraw_free() {
    let mut stage = Stage::headless();
    let root = stage.create_container(None, &sized(200.0, 100.0)).unwrap();
    let a = stage
        .create_container(None, &StyleAttributeSet::new().with(StyleAttr::Flex(1.0)))
        .unwrap();
    let b = stage.create_container(None, &sized(50.0, 20.0)).unwrap();
    stage.add_flex_children(root, &[a, b]).unwrap();

    let first = stage.recalculate(a).unwrap();
    let boxes: Vec<_> = [root, a, b]
        .iter()
        .map(|&n| stage.computed_box(n).unwrap())
        .collect();
    let counts: Vec<_> = [root, a, b].iter().map(|&n| redraws(&stage, n)).collect();

    let second = stage.recalculate(root).unwrap();
    assert_eq!(first, second);
    for (i, &n) in [root, a, b].iter().enumerate() {
        assert_eq!(stage.computed_box(n).unwrap(), boxes[i]);
        assert_eq!(redraws(&stage, n), counts[i]);
        assert_eq!(stage.cached_box(n).unwrap(), Some(boxes[i]));
    }
    assert_eq!(boxes[1].width, 150.0);
    assert_eq!(boxes[2].left, 150.0);
}

#[test]
fn moves_do_not_redraw_but_resizes_do() {
    let mut stage = Stage::headless();
    let root = stage.create_container(None, &sized(300.0, 100.0)).unwrap();
    let a = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    let b = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    stage.add_flex_children(root, &[a, b]).unwrap();
    let (ra, rb) = (redraws(&stage, a), redraws(&stage, b));

    stage
        .set_styles(a, &StyleAttributeSet::new().with(StyleAttr::Width(px(50.0))), None)
        .unwrap();
    assert_eq!(redraws(&stage, a), ra + 1);
    assert_eq!(redraws(&stage, b), rb);
    let group = stage.visuals(b).unwrap().group;
    assert_eq!(stage.scene().visual(group).unwrap().position(), Vec2::new(50.0, 0.0));
}

#[test]
fn trace_lists_visited_nodes_by_depth() {
    let mut stage = Stage::headless();
    let root = stage.create_container(Some("root"), &sized(100.0, 100.0)).unwrap();
    let a = stage.create_container(Some("a"), &sized(10.0, 10.0)).unwrap();
    let b = stage.create_container(None, &sized(5.0, 5.0)).unwrap();
    stage.add_flex_children(a, &[b]).unwrap();
    stage.add_flex_children(root, &[a]).unwrap();

    let trace = stage.recalculate(b).unwrap();
    assert_eq!(trace.nodes(), vec![root, a, b]);
    assert_eq!(
        trace.to_string(),
        format!("root\n\ta\n\t\t#{}", b.index())
    );
    assert_eq!(stage.root_of(b).unwrap(), root);
}

#[test]
fn overflow_hidden_toggles_the_clip() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(100.0, 50.0)).unwrap();
    let v = stage.visuals(n).unwrap();
    assert_eq!(stage.scene().visual(v.group).unwrap().mask(), None);

    let hidden = StyleAttributeSet::new().with(StyleAttr::Overflow(Overflow::Hidden));
    stage.set_styles(n, &hidden, None).unwrap();
    let group = stage.scene().visual(v.group).unwrap();
    assert_eq!(group.mask(), Some(v.mask));
    match stage.scene().visual(v.mask).unwrap().drawable() {
        Drawable::Mask { shape } => assert_eq!(shape.rect(), Rect::new(0.0, 0.0, 100.0, 50.0)),
        other => panic!("unexpected drawable {other:?}"),
    }

    let visible = StyleAttributeSet::new().with(StyleAttr::Overflow(Overflow::Scroll));
    stage.set_styles(n, &visible, None).unwrap();
    assert_eq!(stage.scene().visual(v.group).unwrap().mask(), None);
    assert!(!stage.scene().children(v.group).contains(&v.mask));
}

#[test]
fn paint_writes_repaint_without_resize() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(20.0, 20.0)).unwrap();
    let before = redraws(&stage, n);
    let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
    stage
        .set_styles(
            n,
            &StyleAttributeSet::new().with(StyleAttr::BackgroundColor(red)),
            None,
        )
        .unwrap();
    assert_eq!(redraws(&stage, n), before + 1);
    let bg = stage.visuals(n).unwrap().background;
    match stage.scene().visual(bg).unwrap().drawable() {
        Drawable::Fill { color, .. } => assert_eq!(*color, red),
        other => panic!("unexpected drawable {other:?}"),
    }
}

#[test]
fn invalid_patch_leaves_node_untouched() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(20.0, 20.0)).unwrap();
    let bad = StyleAttributeSet::new()
        .with(StyleAttr::Height(px(40.0)))
        .with(StyleAttr::Width(px(-1.0)));
    let err = stage.set_styles(n, &bad, None).unwrap_err();
    assert!(matches!(err, FlexError::InvalidStyle(_)));
    assert_eq!(stage.computed_box(n).unwrap().height, 20.0);
    assert_eq!(stage.styles(n).unwrap().height, Some(px(20.0)));

    assert!(stage.create_container(None, &bad).is_err());
    assert_eq!(stage.node_ids(), vec![n]);
}

#[test]
fn width_animation_reaches_target_and_retires() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(0.0, 10.0)).unwrap();
    let target = StyleAttributeSet::new().with(StyleAttr::Width(px(400.0)));
    stage.set_styles(n, &target, Some(linear(200.0))).unwrap();
    assert_eq!(stage.tweens().value(n, "width"), Some(0.0));

    let mut driver = FrameDriver::new(Fps::new(10, 1).unwrap());
    driver.step(&mut stage).unwrap();
    assert_eq!(stage.computed_box(n).unwrap().width, 200.0);
    driver.step(&mut stage).unwrap();
    assert_eq!(stage.computed_box(n).unwrap().width, 400.0);
    assert!(!stage.tweens().is_active(n, "width"));
    assert!(stage.tweens().is_empty());

    stage.set_styles(n, &target, Some(linear(200.0))).unwrap();
    assert!(stage.tweens().is_active(n, "width"));
}

#[test]
fn restarting_a_key_cancels_the_previous_tween() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(0.0, 10.0)).unwrap();
    let wide = StyleAttributeSet::new().with(StyleAttr::Width(px(400.0)));
    stage.set_styles(n, &wide, Some(linear(200.0))).unwrap();

    let mut driver = FrameDriver::new(Fps::new(10, 1).unwrap());
    driver.step(&mut stage).unwrap();
    assert_eq!(stage.computed_box(n).unwrap().width, 200.0);

    let narrow = StyleAttributeSet::new().with(StyleAttr::Width(px(0.0)));
    stage.set_styles(n, &narrow, Some(linear(1000.0))).unwrap();
    assert_eq!(stage.tweens().len(), 1);

    driver.step(&mut stage).unwrap();
    assert_eq!(stage.computed_box(n).unwrap().width, 180.0);
    driver.run(&mut stage, 9).unwrap();
    assert_eq!(stage.computed_box(n).unwrap().width, 0.0);
    assert!(stage.tweens().is_empty());
}

#[test]
fn animated_patch_splits_immediate_and_tweened_keys() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(100.0, 100.0)).unwrap();
    let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
    let patch = StyleAttributeSet::new()
        .with(StyleAttr::BackgroundColor(red))
        .with(StyleAttr::BorderRadius(8.0))
        .with(StyleAttr::Gap(GapValue {
            gutter: Gutter::Column,
            length: px(12.0),
        }))
        .with(StyleAttr::Height(Dimension::Percent(50.0)));
    stage.set_styles(n, &patch, Some(linear(100.0))).unwrap();

    assert_eq!(stage.paint(n).unwrap().fill, red);
    assert_eq!(stage.styles(n).unwrap().height, Some(Dimension::Percent(50.0)));
    assert!(stage.tweens().is_active(n, "borderRadius"));
    assert!(stage.tweens().is_active(n, "columnGap"));
    assert!(!stage.tweens().is_active(n, "height"));

    let mut driver = FrameDriver::new(Fps::new(20, 1).unwrap());
    driver.run(&mut stage, 2).unwrap();
    assert_eq!(stage.paint(n).unwrap().radius, 8.0);
    let gaps = &stage.styles(n).unwrap().gap;
    assert_eq!(gaps.len(), 1);
    assert_eq!((gaps[0].gutter, gaps[0].length), (Gutter::Column, px(12.0)));
}

#[test]
fn destroy_releases_subtree_and_tweens() {
    let mut stage = Stage::headless();
    let root = stage.create_container(None, &sized(300.0, 100.0)).unwrap();
    let a = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    let a1 = stage.create_container(None, &sized(5.0, 5.0)).unwrap();
    let b = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    stage.add_flex_children(a, &[a1]).unwrap();
    stage.add_flex_children(root, &[a, b]).unwrap();
    let visuals_before = stage.scene().len();

    let wide = StyleAttributeSet::new().with(StyleAttr::Width(px(40.0)));
    stage.set_styles(a1, &wide, Some(linear(100.0))).unwrap();
    stage.destroy(a).unwrap();

    assert!(!stage.contains(a) && !stage.contains(a1));
    assert!(stage.tweens().is_empty());
    assert_eq!(stage.solver_children(root).unwrap(), vec![b]);
    assert_eq!(scene_order(&stage, root), vec![b]);
    assert_eq!(stage.computed_box(b).unwrap().left, 0.0);
    // group, background, border and mask for each destroyed node
    assert_eq!(stage.scene().len(), visuals_before - 8);

    let again = stage.create_container(None, &sized(1.0, 1.0)).unwrap();
    assert!(again == a || again == a1);
}

#[test]
fn attach_root_hosts_a_layout_root_under_a_plain_visual() {
    let mut stage = Stage::headless();
    let host = stage.create_visual(Drawable::Group);
    let root = stage.create_container(None, &sized(10.0, 10.0)).unwrap();
    let other = stage.create_container(None, &sized(50.0, 50.0)).unwrap();
    stage.attach_root(root, host).unwrap();

    assert_eq!(stage.root_of(root).unwrap(), root);
    let group = stage.visuals(root).unwrap().group;
    assert_eq!(stage.scene().visual(group).unwrap().parent(), Some(host));
    assert!(stage.add_flex_children(other, &[root]).is_err());

    let layout_group = stage.visuals(other).unwrap().group;
    let plain = stage.create_visual(Drawable::Group);
    assert!(stage.attach_root(root, layout_group).is_err());
    assert!(stage.attach_visual(plain, layout_group).is_err());
    stage.attach_visual(host, plain).unwrap();
}

#[test]
fn find_looks_up_labels() {
    let mut stage = Stage::headless();
    let a = stage.create_container(Some("a"), &sized(1.0, 1.0)).unwrap();
    assert_eq!(stage.find("a"), Some(a));
    assert_eq!(stage.find("missing"), None);
    assert_eq!(stage.label(a).unwrap(), Some("a"));
}

#[test]
fn fill_and_flow_ignore_child_edits() {
    let mut stage = Stage::headless();
    let fill = stage
        .create_fill(
            None,
            &sized(10.0, 10.0),
            crate::node::FillOptions::new(crate::foundation::core::Size::new(5.0, 5.0)),
        )
        .unwrap();
    let child = stage.create_container(None, &sized(1.0, 1.0)).unwrap();
    stage.add_flex_children(fill, &[child]).unwrap();
    assert!(stage.children(fill).unwrap().is_empty());
    assert_eq!(stage.parent(child).unwrap(), None);
    stage.remove_flex_child(fill, child).unwrap();
}

#[test]
fn column_gap_tween_starts_from_its_own_gutter() {
    let mut stage = Stage::headless();
    let n = stage.create_container(None, &sized(100.0, 100.0)).unwrap();
    let row = StyleAttributeSet::new().with(StyleAttr::Gap(GapValue {
        gutter: Gutter::Row,
        length: px(8.0),
    }));
    stage.set_styles(n, &row, None).unwrap();

    let column = StyleAttributeSet::new().with(StyleAttr::Gap(GapValue {
        gutter: Gutter::Column,
        length: px(20.0),
    }));
    stage.set_styles(n, &column, Some(linear(200.0))).unwrap();
    assert_eq!(stage.tweens().value(n, "columnGap"), Some(0.0));
    assert!(!stage.tweens().is_active(n, "rowGap"));

    let mut driver = FrameDriver::new(Fps::new(10, 1).unwrap());
    driver.step(&mut stage).unwrap();
    let styles = stage.styles(n).unwrap();
    assert_eq!(styles.gap_for(Gutter::Column), Some(px(10.0)));
    assert_eq!(styles.gap_for(Gutter::Row), Some(px(8.0)));

    let handle = stage.node(n).unwrap().handle;
    let gap = stage.solver.style(handle).unwrap().gap;
    assert_eq!(gap.width, taffy::style::LengthPercentage::length(10.0));
    assert_eq!(gap.height, taffy::style::LengthPercentage::length(8.0));
}

#[test]
fn headless_stage_uses_default_options() {
    let stage = Stage::headless();
    assert_eq!(*stage.opts(), StageOpts::default());
    assert_eq!(stage.node_ids(), Vec::<NodeId>::new());
}
