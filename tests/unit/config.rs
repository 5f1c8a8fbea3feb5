use super::*;
use crate::scene::text::MonospaceMeasurer;

const TREE: &str = r##"{
    "stage": { "flowPassCap": 3 },
    "root": {
        "label": "root",
        "kind": "container",
        "styles": { "width": 400, "height": 300, "flexDirection": "column",
                    "backgroundColor": "#202020" },
        "children": [
            { "label": "title", "kind": "flow", "text": "hello",
              "textStyle": { "fontSize": 16 } },
            { "label": "cover", "kind": "fill", "asset": { "width": 100, "height": 100 },
              "fit": "contain", "anchor": "top-left", "styles": { "flex": 1 } },
            { "label": "game", "kind": "composite", "styles": { "height": 60 } }
        ]
    }
}"##;

#[test]
fn tree_spec_builds_the_described_stage() {
    let spec = TreeSpec::from_json(TREE).unwrap();
    assert_eq!(spec.stage.flow_pass_cap, 3);
    assert_eq!(spec.root.children.len(), 3);

    let (stage, root) = spec.build(MonospaceMeasurer::default()).unwrap();
    assert_eq!(stage.label(root).unwrap(), Some("root"));
    let title = stage.find("title").unwrap();
    let cover = stage.find("cover").unwrap();
    let game = stage.find("game").unwrap();
    assert_eq!(stage.children(root).unwrap(), &[title, cover, game]);

    let t = stage.computed_box(title).unwrap();
    assert_eq!((t.width, t.height), (40.0, 20.0));
    let c = stage.computed_box(cover).unwrap();
    assert_eq!((c.top, c.height), (20.0, 220.0));
    assert_eq!(stage.computed_box(game).unwrap().top, 240.0);
}

#[test]
fn tree_spec_errors_are_config_errors() {
    let err = TreeSpec::from_json(r#"{"root": {"kind": "bogus"}}"#).unwrap_err();
    assert!(matches!(err, FlexError::Config(_)));

    let err = TreeSpec::from_json(r#"{"root": {"kind": "container", "styles": {"colour": 1}}}"#)
        .unwrap_err();
    assert!(matches!(err, FlexError::Config(_)));

    let spec = TreeSpec::from_json(r#"{"root": {"kind": "fill"}}"#).unwrap();
    assert!(matches!(
        spec.build(MonospaceMeasurer::default()),
        Err(FlexError::Config(_))
    ));
}

#[test]
fn stage_opts_defaults_and_validation() {
    let opts: StageOpts = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, StageOpts::default());
    assert_eq!(opts.tween_duration_ms, 200.0);
    assert_eq!(opts.flow_pass_cap, 2);
    opts.validate().unwrap();

    let bad = StageOpts {
        flow_pass_cap: 1,
        ..StageOpts::default()
    };
    assert!(matches!(bad.validate(), Err(FlexError::Config(_))));
    let bad = StageOpts {
        available_width: Some(f32::NAN),
        ..StageOpts::default()
    };
    assert!(bad.validate().is_err());
    assert!(serde_json::from_str::<StageOpts>(r#"{"unknown": 1}"#).is_err());
}
