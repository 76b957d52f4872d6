use crate::inter::InterId;
use crate::relation::RelationKind;

/// Structural errors raised by [`crate::SIGraph`] mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SigError {
    #[error("{0} is not a vertex of this graph")]
    UnknownInter(InterId),
    #[error("{0} has been removed from the graph")]
    RemovedInter(InterId),
    #[error("{kind} relation from {inter} to itself")]
    SelfLoop { inter: InterId, kind: RelationKind },
    #[error("manual {kind} relation on {inter} cannot be replaced")]
    ManualRelation { inter: InterId, kind: RelationKind },
}
