use omr_sig::core::{
    Evaluation, Glyph, HorizontalSide, Point2, Rect, Segment, Shape, Staff, StaffId, Step, StemDir,
};
use omr_sig::dots::RepeatSide;
use omr_sig::graph::{BarlineData, ChordData, HeadData, InterKind};
use omr_sig::{
    GlyphInput, Inter, InterId, SheetConfig, SheetError, SheetInput, SheetProcessor, StackInput,
    StaffBarsInput, SystemInput,
};

fn staff() -> Staff {
    Staff {
        id: StaffId(1),
        part: 1,
        left_x: 0.0,
        right_x: 800.0,
        top_line_y: 100.0,
        interline: 20.0,
    }
}

fn bar(x: f32) -> Inter {
    Inter::new(
        InterKind::Barline(BarlineData {
            median: Segment::new(Point2::new(x + 1.0, 100.0), Point2::new(x + 1.0, 180.0)),
            width: 2.0,
        }),
        Shape::ThinBarline,
        0.9,
        Rect::new(x, 100.0, 2.0, 80.0),
    )
    .with_staff(StaffId(1))
}

/// Head at index `at`, its chord right after it.
fn note(at: u32, center: Point2<f32>) -> [Inter; 2] {
    let head = Inter::new(
        InterKind::Head(HeadData {
            step: Step::G,
            octave: 4,
            chord: Some(InterId(at + 1)),
        }),
        Shape::NoteheadBlack,
        0.8,
        Rect::centered(center, 20.0, 16.0),
    )
    .with_staff(StaffId(1));
    let tail = Point2::new(center.x + 10.0, center.y - 70.0);
    let chord = Inter::new(
        InterKind::HeadChord(ChordData {
            heads: vec![InterId(at)],
            stem: StemDir::Up,
            tail,
        }),
        Shape::HeadChord,
        0.8,
        Rect::new(center.x - 10.0, tail.y, 20.0, center.y + 8.0 - tail.y),
    )
    .with_staff(StaffId(1));
    [head, chord]
}

fn dot(id: u32, cx: f32, cy: f32) -> GlyphInput {
    GlyphInput {
        glyph: Glyph::from_bounds(id, Rect::centered(Point2::new(cx, cy), 5.0, 5.0)),
        eval: Evaluation::new(Shape::DotSet, 0.9),
    }
}

/// Slur glyph sagging 15 px below the chord from `(x1, 160)` to
/// `(x1 + 180, 160)`.
fn slur(id: u32, x1: f32) -> GlyphInput {
    let (cx, cy, r) = (x1 + 90.0, -102.5_f32, 277.5_f32);
    let (from, to) = (1.2393_f32, std::f32::consts::PI - 1.2393);
    let points: Vec<Point2<f32>> = (0..31)
        .map(|i| {
            let a = from + (to - from) * i as f32 / 30.0;
            Point2::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect();
    GlyphInput {
        glyph: Glyph::from_bounds(id, Rect::new(x1, 159.0, 180.0, 17.0)).with_points(points),
        eval: Evaluation::new(Shape::Slur, 0.85),
    }
}

fn stack(right_bars: Vec<StaffBarsInput>) -> StackInput {
    StackInput {
        left_x: 0.0,
        right_x: 800.0,
        left_bars: Vec::new(),
        right_bars,
    }
}

/// System 0 ends with a right repeat and a slur leaving its last note;
/// system 1 starts with the end of that slur.
fn sheet() -> SheetInput {
    let [head_a, chord_a] = note(1, Point2::new(600.0, 150.0));
    let first = SystemInput {
        origin: Point2::origin(),
        staves: vec![staff()],
        parts: Vec::new(),
        stacks: vec![stack(vec![StaffBarsInput {
            staff: StaffId(1),
            bars: vec![0],
        }])],
        inters: vec![bar(780.0), head_a, chord_a],
        glyphs: vec![dot(1, 774.0, 150.0), dot(2, 774.0, 130.0), slur(3, 605.0)],
    };

    let [head_b, chord_b] = note(0, Point2::new(200.0, 150.0));
    let second = SystemInput {
        origin: Point2::origin(),
        staves: vec![staff()],
        parts: Vec::new(),
        stacks: vec![stack(Vec::new())],
        inters: vec![head_b, chord_b],
        glyphs: vec![slur(4, 15.0)],
    };

    SheetInput {
        interline: Some(20.0),
        systems: vec![first, second],
    }
}

#[test]
fn sheet_resolves_repeat_and_stitches_slur() {
    let sheet = SheetProcessor::default().process(sheet()).unwrap();
    let report = &sheet.report;

    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.systems.len(), 2);

    let first = &report.systems[0];
    assert_eq!(first.dots.repeat_dots, 2);
    assert_eq!(first.dots.repeat_pairs, 1);
    assert_eq!(
        first.dots.repeat_sides,
        vec![RepeatSide {
            stack: 0,
            side: HorizontalSide::Right
        }]
    );
    assert_eq!(first.barlines.len(), 1);
    assert!(first.barlines[0].right_repeat);
    assert!(!first.barlines[0].left_repeat);
    assert_eq!(first.slurs.len(), 1);
    assert_eq!(report.systems[1].slurs.len(), 1);

    assert_eq!(report.connections.len(), 1);
    let connection = report.connections[0];
    assert!(connection.tie);
    assert_eq!(connection.prev.system, 0);
    assert_eq!(connection.next.system, 1);
    assert_eq!(sheet.linkage.len(), 1);
    assert!(sheet.systems[0].stacks[0].is_repeat(HorizontalSide::Right));
}

#[test]
fn report_serializes_graph_snapshots() {
    let sheet = SheetProcessor::default().process(sheet()).unwrap();
    let json = sheet.report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let inters = value["systems"][0]["graph"]["inters"].as_array().unwrap();
    assert!(inters.iter().any(|i| i["kind"]["kind"] == "repeat_dot"));
    assert!(inters.iter().any(|i| i["kind"]["kind"] == "slur"));
    let relations = value["systems"][0]["graph"]["relations"].as_array().unwrap();
    assert!(relations.iter().any(|r| r["kind"] == "repeat_dot_pair"));
    assert_eq!(value["connections"].as_array().unwrap().len(), 1);
}

#[test]
fn dangling_reference_is_an_input_error() {
    let mut input = sheet();
    input.systems[1].stacks[0].right_bars.push(StaffBarsInput {
        staff: StaffId(1),
        bars: vec![9],
    });
    let err = SheetProcessor::default().process(input).unwrap_err();
    assert!(matches!(err, SheetError::Input(_)), "{err}");
}

#[test]
fn invalid_interline_is_rejected() {
    let mut input = sheet();
    input.interline = Some(0.0);
    assert!(SheetProcessor::default().process(input).is_err());
}

#[test]
fn config_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = SheetConfig::default();
    config.interline = 24.0;
    config.slurs.max_delta_y = 3.0;
    config.write_json(&path).unwrap();

    let loaded = SheetConfig::load_json(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.scale().unwrap().interline(), 24.0);
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "slurs": { "max_delta_y": 2.5 } }"#).unwrap();

    let loaded = SheetConfig::load_json(&path).unwrap();
    assert_eq!(loaded.interline, 20.0);
    assert_eq!(loaded.slurs.max_delta_y, 2.5);
    assert_eq!(loaded.slurs.area_dy, 6.0);
    assert_eq!(loaded.dots, SheetConfig::default().dots);
}
