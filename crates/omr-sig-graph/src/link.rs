use crate::error::SigError;
use crate::graph::{EdgeId, SIGraph};
use crate::inter::InterId;
use crate::relation::Relation;

/// A proposed relation between an interpretation under construction and a
/// partner already in the graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub partner: InterId,
    pub relation: Relation,
    /// Direction: `true` when the relation goes from the new inter to the
    /// partner.
    pub outgoing: bool,
}

impl Link {
    pub fn new(partner: InterId, relation: Relation, outgoing: bool) -> Self {
        Self {
            partner,
            relation,
            outgoing,
        }
    }

    #[inline]
    pub fn grade(&self) -> f64 {
        self.relation.grade
    }

    /// Insert the relation between `inter` and the partner.
    pub fn apply_to(&self, sig: &mut SIGraph, inter: InterId) -> Result<EdgeId, SigError> {
        if self.outgoing {
            sig.add_edge(inter, self.partner, self.relation)
        } else {
            sig.add_edge(self.partner, inter, self.relation)
        }
    }
}

/// Highest-graded link, the first one on ties.
pub fn best_of<I>(links: I) -> Option<Link>
where
    I: IntoIterator<Item = Link>,
{
    links.into_iter().fold(None, |best, link| match best {
        Some(b) if b.grade() >= link.grade() => Some(b),
        _ => Some(link),
    })
}
