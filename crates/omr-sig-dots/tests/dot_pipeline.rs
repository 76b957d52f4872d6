use omr_sig_core::{
    Evaluation, Glyph, GlyphId, HorizontalSide, Point2, Rect, Scale, Segment, Shape, Staff,
    StaffId, Step, StemDir,
};
use omr_sig_dots::{DotParams, DotResolver, PendingDots, RepeatSide};
use omr_sig_graph::{
    BarlineData, ChordData, HeadData, Inter, InterId, InterKind, Measure, MeasureStack, Part,
    PartBarline, RelationKind, StaffBarline, SystemInfo,
};

/// One staff (lines at y = 100..180, interline 20), one part.
fn system() -> SystemInfo {
    let mut system = SystemInfo::new(0, Scale::default());
    system.staves = vec![Staff {
        id: StaffId(1),
        part: 1,
        left_x: 0.0,
        right_x: 800.0,
        top_line_y: 100.0,
        interline: 20.0,
    }];
    system.parts = vec![Part {
        id: 1,
        staves: vec![StaffId(1)],
    }];
    system
}

fn add_bar(system: &mut SystemInfo, x: f32, top: f32, height: f32) -> InterId {
    let mid = x + 1.0;
    system.sig.add_vertex(
        Inter::new(
            InterKind::Barline(BarlineData {
                median: Segment::new(Point2::new(mid, top), Point2::new(mid, top + height)),
                width: 2.0,
            }),
            Shape::ThinBarline,
            0.9,
            Rect::new(x, top, 2.0, height),
        )
        .with_staff(StaffId(1)),
    )
}

/// Two stacks split by `bar`, which ends the first one.
fn split_stacks(system: &mut SystemInfo, bar: InterId) {
    let sb = StaffBarline::from_bars(&system.sig, StaffId(1), &[bar]).unwrap();
    let x = sb.right_x;
    system.stacks = vec![
        MeasureStack {
            left_x: 0.0,
            right_x: x,
            measures: vec![Measure {
                part: 1,
                left_barline: None,
                right_barline: Some(PartBarline::from_staff_barlines(vec![sb])),
            }],
            ..MeasureStack::default()
        },
        MeasureStack {
            left_x: x,
            right_x: 800.0,
            measures: vec![Measure {
                part: 1,
                ..Measure::default()
            }],
            ..MeasureStack::default()
        },
    ];
}

fn add_chord(system: &mut SystemInfo, head_box: Rect, chord_box: Rect) -> (InterId, InterId) {
    let head = system.sig.add_vertex(
        Inter::new(
            InterKind::Head(HeadData {
                step: Step::B,
                octave: 4,
                chord: None,
            }),
            Shape::NoteheadBlack,
            0.8,
            head_box,
        )
        .with_staff(StaffId(1)),
    );
    let chord = system.sig.add_vertex(
        Inter::new(
            InterKind::HeadChord(ChordData {
                heads: vec![head],
                stem: StemDir::Up,
                tail: Point2::new(chord_box.right(), chord_box.y),
            }),
            Shape::HeadChord,
            0.8,
            chord_box,
        )
        .with_staff(StaffId(1)),
    );
    (head, chord)
}

fn dot(id: u32, cx: f32, cy: f32) -> (Glyph, Evaluation) {
    (
        Glyph::from_bounds(id, Rect::centered(Point2::new(cx, cy), 5.0, 5.0)),
        Evaluation::new(Shape::DotSet, 0.9),
    )
}

fn inters_of_glyph(system: &SystemInfo, glyph: u32) -> Vec<InterId> {
    system
        .sig
        .vertices()
        .filter(|(_, inter)| inter.glyph == Some(GlyphId(glyph)))
        .map(|(id, _)| id)
        .collect()
}

#[test]
fn dot_next_to_bar_becomes_repeat_dot() {
    let mut system = system();
    let bar = add_bar(&mut system, 200.0, 100.0, 80.0);
    let resolver = DotResolver::default();

    // Pitch +1, 0.3 interline left of the bar edge.
    let pending = resolver.instant_phase(&mut system, [dot(1, 194.0, 150.0)]);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.repeat_dots(), 1);

    let repeats = system.sig.inters_by_shape(Shape::RepeatDot);
    assert_eq!(repeats.len(), 1);
    let repeat = system.sig.inter(repeats[0]).unwrap();
    assert_eq!(repeat.kind, InterKind::RepeatDot { pitch: 1 });
    assert_eq!(repeat.staff, Some(StaffId(1)));
    approx::assert_abs_diff_eq!(repeat.grade, 0.72, epsilon = 1e-9);
    let edges = system.sig.outgoing(repeats[0], RelationKind::RepeatDotBar);
    assert_eq!(edges.len(), 1);
    assert_eq!(system.sig.edge_target(edges[0]), Some(bar));
    assert!(system.sig.relation(edges[0]).unwrap().is_acceptable());
}

#[test]
fn closest_bar_wins_over_best_graded() {
    let mut system = system();
    // Left bar: 0.4 interline away but vertically off; right bar: 0.45 away,
    // vertically perfect and better graded.
    let near = add_bar(&mut system, 184.0, 108.0, 80.0);
    let far = add_bar(&mut system, 203.0, 100.0, 80.0);
    let resolver = DotResolver::default();
    resolver.instant_phase(&mut system, [dot(1, 194.0, 150.0)]);

    let repeats = system.sig.inters_by_shape(Shape::RepeatDot);
    assert_eq!(repeats.len(), 1);
    let edge = system.sig.outgoing(repeats[0], RelationKind::RepeatDotBar)[0];
    assert_eq!(system.sig.edge_target(edge), Some(near));
    assert_ne!(system.sig.edge_target(edge), Some(far));
}

#[test]
fn dot_far_from_staff_middle_is_not_a_repeat_dot() {
    let mut system = system();
    add_bar(&mut system, 200.0, 100.0, 80.0);
    let resolver = DotResolver::default();
    // Pitch +4: on the bottom line.
    let pending = resolver.instant_phase(&mut system, [dot(1, 194.0, 180.0)]);
    assert_eq!(pending.repeat_dots(), 0);
    assert!(system.sig.inters_by_shape(Shape::RepeatDot).is_empty());
}

#[test]
fn unpaired_repeat_dot_is_deleted_late() {
    let mut system = system();
    let bar = add_bar(&mut system, 200.0, 100.0, 80.0);
    split_stacks(&mut system, bar);
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(&mut system, [dot(1, 194.0, 150.0)]);
    let report = resolver.late_checks(&mut system, pending);

    assert_eq!(report.unpaired_removed, 1);
    assert!(report.repeat_sides.is_empty());
    assert!(system.sig.inters_by_shape(Shape::RepeatDot).is_empty());
    assert!(!system.stacks[0].is_repeat(HorizontalSide::Right));
}

#[test]
fn paired_repeat_dots_mark_stack_side_and_win_conflicts() {
    let mut system = system();
    let bar = add_bar(&mut system, 200.0, 100.0, 80.0);
    split_stacks(&mut system, bar);
    // Competing interpretation of the lower dot's area.
    let rival = system.sig.add_vertex(Inter::new(
        InterKind::Articulation,
        Shape::Staccato,
        0.5,
        Rect::centered(Point2::new(194.0, 150.0), 5.0, 5.0),
    ));

    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(
        &mut system,
        [dot(1, 194.0, 150.0), dot(2, 194.0, 130.0)],
    );
    assert_eq!(pending.repeat_dots(), 2);
    let report = resolver.late_checks(&mut system, pending);

    assert_eq!(report.repeat_pairs, 1);
    assert_eq!(report.unpaired_removed, 0);
    assert_eq!(
        report.repeat_sides,
        vec![RepeatSide {
            stack: 0,
            side: HorizontalSide::Right
        }]
    );
    assert!(system.stacks[0].is_repeat(HorizontalSide::Right));
    assert!(!system.stacks[1].is_repeat(HorizontalSide::Left));
    let barline = system.stacks[0].measures[0].right_barline.as_ref().unwrap();
    assert!(barline.is_right_repeat());
    assert!(!barline.is_left_repeat());

    assert_eq!(report.conflicts_removed, 1);
    assert!(system.sig.inter(rival).is_none());
    assert_eq!(system.sig.inters_by_shape(Shape::RepeatDot).len(), 2);
}

#[test]
fn dot_below_chord_becomes_staccato() {
    let mut system = system();
    let (_, chord) = add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(&mut system, [dot(1, 406.0, 160.0)]);
    assert_eq!(pending.staccatos(), 1);

    let arts = system.sig.inters_by_shape(Shape::Staccato);
    assert_eq!(arts.len(), 1);
    let edges = system.sig.incoming(arts[0], RelationKind::ChordArticulation);
    assert_eq!(edges.len(), 1);
    assert_eq!(system.sig.edge_source(edges[0]), Some(chord));
    assert_eq!(system.sig.inter(arts[0]).unwrap().staff, Some(StaffId(1)));
}

#[test]
fn dot_inside_chord_span_is_no_staccato() {
    let mut system = system();
    add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(&mut system, [dot(1, 418.0, 140.0)]);
    assert_eq!(pending.staccatos(), 0);
}

#[test]
fn dots_after_head_and_rest_are_augmentation_dots() {
    let mut system = system();
    let (head, _) = add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let rest = system.sig.add_vertex(
        Inter::new(
            InterKind::Rest,
            Shape::QuarterRest,
            0.8,
            Rect::new(500.0, 120.0, 10.0, 40.0),
        )
        .with_staff(StaffId(1)),
    );

    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(
        &mut system,
        [dot(1, 418.5, 140.0), dot(2, 516.5, 130.0)],
    );
    let report = resolver.late_checks(&mut system, pending);
    assert_eq!(report.augmentation_dots, 2);

    let on_head = system.sig.incoming(head, RelationKind::Augmentation);
    assert_eq!(on_head.len(), 1);
    let aug = system.sig.edge_source(on_head[0]).unwrap();
    assert_eq!(system.sig.inter(aug).unwrap().glyph, Some(GlyphId(1)));
    assert_eq!(system.sig.inter(aug).unwrap().staff, Some(StaffId(1)));

    let on_rest = system.sig.incoming(rest, RelationKind::Augmentation);
    assert_eq!(on_rest.len(), 1);
    let aug = system.sig.edge_source(on_rest[0]).unwrap();
    assert_eq!(system.sig.inter(aug).unwrap().glyph, Some(GlyphId(2)));
}

#[test]
fn second_dot_links_to_first_dot() {
    let mut system = system();
    add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(
        &mut system,
        [dot(1, 418.5, 140.0), dot(2, 426.5, 140.0)],
    );
    let report = resolver.late_checks(&mut system, pending);
    assert_eq!(report.double_dots, 1);

    let seconds: Vec<InterId> = system
        .sig
        .inters_by_shape(Shape::AugmentationDot)
        .into_iter()
        .filter(|id| system.sig.has_relation(*id, RelationKind::DoubleDot))
        .collect();
    assert_eq!(seconds.len(), 2);
    let edge = system.sig.outgoing(seconds[1], RelationKind::DoubleDot);
    let edge = if edge.is_empty() {
        system.sig.outgoing(seconds[0], RelationKind::DoubleDot)[0]
    } else {
        edge[0]
    };
    let second = system.sig.edge_source(edge).unwrap();
    let first = system.sig.edge_target(edge).unwrap();
    assert_eq!(system.sig.inter(second).unwrap().glyph, Some(GlyphId(2)));
    assert_eq!(system.sig.inter(first).unwrap().glyph, Some(GlyphId(1)));
}

#[test]
fn double_dot_leaves_the_head_to_the_first_dot() {
    let mut system = system();
    let (head, _) = add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(
        &mut system,
        [dot(1, 418.5, 140.0), dot(2, 426.5, 140.0)],
    );
    resolver.late_checks(&mut system, pending);

    let on_head = system.sig.incoming(head, RelationKind::Augmentation);
    assert_eq!(on_head.len(), 1);
    let first = system.sig.edge_source(on_head[0]).unwrap();
    assert_eq!(system.sig.inter(first).unwrap().glyph, Some(GlyphId(1)));

    let doubles = system.sig.incoming(first, RelationKind::DoubleDot);
    assert_eq!(doubles.len(), 1);
    let second = system.sig.edge_source(doubles[0]).unwrap();
    assert_eq!(system.sig.inter(second).unwrap().glyph, Some(GlyphId(2)));

    // Glyph 2 survives only as the second dot.
    let readings = inters_of_glyph(&system, 2);
    assert_eq!(readings, vec![second]);
    assert!(system
        .sig
        .outgoing(second, RelationKind::Augmentation)
        .is_empty());
}

#[test]
fn dot_between_head_and_rest_augments_only_the_best() {
    let mut system = system();
    let (head, _) = add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    let rest = system.sig.add_vertex(
        Inter::new(
            InterKind::Rest,
            Shape::QuarterRest,
            0.8,
            Rect::new(404.0, 120.0, 10.0, 40.0),
        )
        .with_staff(StaffId(1)),
    );
    let resolver = DotResolver::default();
    let pending = resolver.instant_phase(&mut system, [dot(1, 418.5, 140.0)]);
    resolver.late_checks(&mut system, pending);

    let aug = inters_of_glyph(&system, 1);
    assert_eq!(aug.len(), 1);
    let out = system.sig.outgoing(aug[0], RelationKind::Augmentation);
    assert_eq!(out.len(), 1);
    assert_eq!(system.sig.edge_target(out[0]), Some(rest));
    assert!(system.sig.incoming(head, RelationKind::Augmentation).is_empty());
}

#[test]
fn dot_under_arc_becomes_fermata_dot() {
    let mut system = system();
    let above = system.sig.add_vertex(Inter::new(
        InterKind::FermataArc,
        Shape::FermataArc,
        0.8,
        Rect::new(300.0, 40.0, 40.0, 24.0),
    ));
    let below = system.sig.add_vertex(Inter::new(
        InterKind::FermataArc,
        Shape::FermataArcBelow,
        0.8,
        Rect::new(600.0, 220.0, 40.0, 24.0),
    ));
    let resolver = DotResolver::default();
    // Lower half of the upper arc spans 52..64, target at 61.
    // Upper half of the lower arc spans 220..232, target at 223.
    let pending = resolver.instant_phase(
        &mut system,
        [dot(1, 320.0, 61.0), dot(2, 620.0, 223.0), dot(3, 320.0, 44.0)],
    );
    let report = resolver.late_checks(&mut system, pending);
    assert_eq!(report.fermata_dots, 2);

    for (arc, glyph) in [(above, 1), (below, 2)] {
        let edges = system.sig.incoming(arc, RelationKind::DotFermata);
        assert_eq!(edges.len(), 1);
        let dot = system.sig.edge_source(edges[0]).unwrap();
        assert_eq!(system.sig.inter(dot).unwrap().shape, Shape::FermataDot);
        assert_eq!(system.sig.inter(dot).unwrap().glyph, Some(GlyphId(glyph)));
    }
    assert!(inters_of_glyph(&system, 3).is_empty());
}

#[test]
fn isolated_dot_yields_no_interpretation() {
    let mut system = system();
    let bar = add_bar(&mut system, 200.0, 100.0, 80.0);
    split_stacks(&mut system, bar);
    add_chord(
        &mut system,
        Rect::new(400.0, 135.0, 12.0, 10.0),
        Rect::new(400.0, 85.0, 12.0, 60.0),
    );
    system.sig.add_vertex(Inter::new(
        InterKind::FermataArc,
        Shape::FermataArc,
        0.8,
        Rect::new(300.0, 40.0, 40.0, 24.0),
    ));
    let before = system.sig.vertex_count();

    let resolver = DotResolver::new(DotParams::default());
    let pending = resolver.instant_phase(&mut system, [dot(1, 700.0, 150.0)]);
    let report = resolver.late_checks(&mut system, pending);

    assert_eq!(system.sig.vertex_count(), before);
    assert!(inters_of_glyph(&system, 1).is_empty());
    assert_eq!(report.pending, 1);
    assert_eq!(report.augmentation_dots + report.fermata_dots + report.staccatos, 0);
}

#[test]
fn non_dot_shapes_are_ignored() {
    let mut system = system();
    let resolver = DotResolver::default();
    let mut pending = PendingDots::new();
    let (glyph, _) = dot(1, 194.0, 150.0);
    resolver.instant_checks(
        &mut system,
        &mut pending,
        glyph,
        Evaluation::new(Shape::QuarterRest, 0.9),
    );
    assert!(pending.is_empty());
}
