use serde::{Deserialize, Serialize};

/// Shape labels produced by the glyph classifier, plus the shapes assigned to
/// interpretations built from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Generic dot, before disambiguation.
    DotSet,
    RepeatDot,
    AugmentationDot,
    FermataDot,
    Staccato,
    /// Fermata arc above its dot (opening downward).
    FermataArc,
    /// Fermata arc below its dot (opening upward).
    FermataArcBelow,
    ThinBarline,
    ThickBarline,
    NoteheadBlack,
    NoteheadVoid,
    WholeNote,
    HeadChord,
    WholeRest,
    HalfRest,
    QuarterRest,
    EighthRest,
    SixteenthRest,
    Slur,
}

impl Shape {
    /// Shapes handled by the dot pipeline.
    pub fn is_dot(self) -> bool {
        matches!(
            self,
            Shape::DotSet
                | Shape::RepeatDot
                | Shape::AugmentationDot
                | Shape::FermataDot
                | Shape::Staccato
        )
    }

    pub fn is_barline(self) -> bool {
        matches!(self, Shape::ThinBarline | Shape::ThickBarline)
    }

    pub fn is_head(self) -> bool {
        matches!(
            self,
            Shape::NoteheadBlack | Shape::NoteheadVoid | Shape::WholeNote
        )
    }

    pub fn is_rest(self) -> bool {
        matches!(
            self,
            Shape::WholeRest
                | Shape::HalfRest
                | Shape::QuarterRest
                | Shape::EighthRest
                | Shape::SixteenthRest
        )
    }

    pub fn is_fermata_arc(self) -> bool {
        matches!(self, Shape::FermataArc | Shape::FermataArcBelow)
    }
}
