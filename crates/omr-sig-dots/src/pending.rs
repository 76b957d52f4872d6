use omr_sig_core::{Evaluation, Glyph};

/// A dot glyph awaiting the late checks.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDot {
    pub glyph: Glyph,
    pub eval: Evaluation,
}

impl PendingDot {
    #[inline]
    pub fn is_vip(&self) -> bool {
        self.glyph.vip
    }
}

/// Output of the instant phase of one system, consumed by the late phase.
///
/// Dots are kept bottom-up (decreasing bottom ordinate, insertion order on
/// ties) so the late checks visit them deterministically.
#[derive(Clone, Debug, Default)]
pub struct PendingDots {
    dots: Vec<PendingDot>,
    pub(crate) repeat_dots: usize,
    pub(crate) staccatos: usize,
}

impl PendingDots {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, dot: PendingDot) {
        let bottom = dot.glyph.bounds.bottom();
        let at = self
            .dots
            .partition_point(|d| d.glyph.bounds.bottom() >= bottom);
        self.dots.insert(at, dot);
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingDot> + '_ {
        self.dots.iter()
    }

    /// Provisional repeat dots created so far.
    pub fn repeat_dots(&self) -> usize {
        self.repeat_dots
    }

    /// Staccato articulations created so far.
    pub fn staccatos(&self) -> usize {
        self.staccatos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omr_sig_core::{Rect, Shape};

    fn dot(id: u32, y: f32) -> PendingDot {
        PendingDot {
            glyph: Glyph::from_bounds(id, Rect::new(0.0, y, 4.0, 4.0)),
            eval: Evaluation::new(Shape::DotSet, 0.9),
        }
    }

    #[test]
    fn dots_are_kept_bottom_up() {
        let mut pending = PendingDots::new();
        pending.push(dot(1, 10.0));
        pending.push(dot(2, 50.0));
        pending.push(dot(3, 30.0));
        pending.push(dot(4, 50.0));
        let ids: Vec<u32> = pending.iter().map(|d| d.glyph.id.0).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }
}
