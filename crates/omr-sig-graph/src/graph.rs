//! Symbol interpretation graph of one system.
//!
//! Vertices live in an arena addressed by [`InterId`]; removal is lazy (the
//! vertex is flagged and its edges dropped) so handles never dangle. Edges
//! live in a second arena with per-vertex adjacency lists.

use crate::error::SigError;
use crate::inter::{Inter, InterId, InterTag};
use crate::relation::{Relation, RelationKind};
use log::debug;
use omr_sig_core::{Rect, Shape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle of a relation inside its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

#[derive(Clone, Debug)]
struct Edge {
    source: InterId,
    target: InterId,
    relation: Relation,
}

/// The interpretation graph of one system.
#[derive(Clone, Debug, Default)]
pub struct SIGraph {
    inters: Vec<Inter>,
    edges: Vec<Option<Edge>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    by_shape: BTreeMap<Shape, Vec<InterId>>,
}

/// Serializable view of the live part of a graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub inters: Vec<InterEntry>,
    pub relations: Vec<RelationEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterEntry {
    pub id: InterId,
    #[serde(flatten)]
    pub inter: Inter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub source: InterId,
    pub target: InterId,
    #[serde(flatten)]
    pub relation: Relation,
}

impl SIGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new interpretation and return its handle.
    pub fn add_vertex(&mut self, mut inter: Inter) -> InterId {
        let id = InterId(self.inters.len() as u32);
        inter.removed = false;
        self.by_shape.entry(inter.shape).or_default().push(id);
        self.inters.push(inter);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Live interpretation, `None` when unknown or removed.
    pub fn inter(&self, id: InterId) -> Option<&Inter> {
        self.inters.get(id.index()).filter(|inter| !inter.removed)
    }

    pub fn inter_mut(&mut self, id: InterId) -> Option<&mut Inter> {
        self.inters.get_mut(id.index()).filter(|inter| !inter.removed)
    }

    #[inline]
    pub fn contains(&self, id: InterId) -> bool {
        self.inter(id).is_some()
    }

    fn check_live(&self, id: InterId) -> Result<(), SigError> {
        match self.inters.get(id.index()) {
            None => Err(SigError::UnknownInter(id)),
            Some(inter) if inter.removed => Err(SigError::RemovedInter(id)),
            Some(_) => Ok(()),
        }
    }

    /// Live vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = (InterId, &Inter)> + '_ {
        self.inters
            .iter()
            .enumerate()
            .filter(|(_, inter)| !inter.removed)
            .map(|(i, inter)| (InterId(i as u32), inter))
    }

    pub fn vertex_count(&self) -> usize {
        self.inters.iter().filter(|inter| !inter.removed).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Insert a directed relation from `source` to `target`.
    ///
    /// Cardinality is enforced by replacement: when the kind allows a single
    /// incoming edge per target (or a single outgoing edge per source), the
    /// prior edge is dropped in favour of the new one. An existing edge with
    /// the same endpoints and kind is updated in place. Manual edges are
    /// never displaced by automated ones.
    pub fn add_edge(
        &mut self,
        source: InterId,
        target: InterId,
        relation: Relation,
    ) -> Result<EdgeId, SigError> {
        self.check_live(source)?;
        self.check_live(target)?;
        let kind = relation.kind;
        if source == target {
            return Err(SigError::SelfLoop {
                inter: source,
                kind,
            });
        }

        if let Some(existing) = self
            .outgoing(source, kind)
            .into_iter()
            .find(|e| self.edge_target(*e) == Some(target))
        {
            if let Some(edge) = self.edges[existing.0 as usize].as_mut() {
                if edge.relation.manual && !relation.manual {
                    return Err(SigError::ManualRelation {
                        inter: target,
                        kind,
                    });
                }
                edge.relation = relation;
            }
            return Ok(existing);
        }

        let mut displaced = Vec::new();
        if kind.is_single_target() {
            for e in self.incoming(target, kind) {
                displaced.push((e, target));
            }
        }
        if kind.is_single_source() {
            for e in self.outgoing(source, kind) {
                displaced.push((e, source));
            }
        }
        if let Some((_, owner)) = displaced
            .iter()
            .find(|(e, _)| self.relation(*e).is_some_and(|r| r.manual))
        {
            return Err(SigError::ManualRelation {
                inter: *owner,
                kind,
            });
        }
        for (e, _) in displaced {
            if let Some(old) = self.remove_edge(e) {
                debug!("{kind} replaced: {old} superseded by {relation}");
            }
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            source,
            target,
            relation,
        }));
        self.outgoing[source.index()].push(id);
        self.incoming[target.index()].push(id);
        Ok(id)
    }

    /// Drop one edge, returning its relation.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Option<Relation> {
        let removed = self.edges.get_mut(edge.0 as usize)?.take()?;
        self.outgoing[removed.source.index()].retain(|e| *e != edge);
        self.incoming[removed.target.index()].retain(|e| *e != edge);
        Some(removed.relation)
    }

    /// Drop all given edges except manual ones; returns how many were dropped.
    pub fn remove_all_edges<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = EdgeId>,
    {
        let mut count = 0;
        for edge in edges {
            if self.relation(edge).is_some_and(|r| !r.manual) && self.remove_edge(edge).is_some() {
                count += 1;
            }
        }
        count
    }

    pub fn relation(&self, edge: EdgeId) -> Option<&Relation> {
        self.edge_ref(edge).map(|e| &e.relation)
    }

    pub fn edge_source(&self, edge: EdgeId) -> Option<InterId> {
        self.edge_ref(edge).map(|e| e.source)
    }

    pub fn edge_target(&self, edge: EdgeId) -> Option<InterId> {
        self.edge_ref(edge).map(|e| e.target)
    }

    fn edge_ref(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge.0 as usize).and_then(Option::as_ref)
    }

    /// The other end of `edge`, seen from `inter`.
    pub fn opposite(&self, inter: InterId, edge: EdgeId) -> Option<InterId> {
        let e = self.edge_ref(edge)?;
        if e.source == inter {
            Some(e.target)
        } else if e.target == inter {
            Some(e.source)
        } else {
            None
        }
    }

    /// Outgoing edges of `kind`, in insertion order.
    pub fn outgoing(&self, inter: InterId, kind: RelationKind) -> Vec<EdgeId> {
        self.filter_kind(self.outgoing.get(inter.index()), kind)
    }

    /// Incoming edges of `kind`, in insertion order.
    pub fn incoming(&self, inter: InterId, kind: RelationKind) -> Vec<EdgeId> {
        self.filter_kind(self.incoming.get(inter.index()), kind)
    }

    fn filter_kind(&self, list: Option<&Vec<EdgeId>>, kind: RelationKind) -> Vec<EdgeId> {
        list.map(|edges| {
            edges
                .iter()
                .copied()
                .filter(|e| self.relation(*e).is_some_and(|r| r.kind == kind))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Edges of `kind` touching `inter` in either direction.
    pub fn relations(&self, inter: InterId, kind: RelationKind) -> Vec<EdgeId> {
        let mut edges = self.outgoing(inter, kind);
        edges.extend(self.incoming(inter, kind));
        edges.sort();
        edges
    }

    /// Every edge touching `inter`.
    pub fn edges_of(&self, inter: InterId) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = self
            .outgoing
            .get(inter.index())
            .into_iter()
            .chain(self.incoming.get(inter.index()))
            .flatten()
            .copied()
            .collect();
        edges.sort();
        edges
    }

    pub fn has_relation(&self, inter: InterId, kind: RelationKind) -> bool {
        !self.relations(inter, kind).is_empty()
    }

    /// Whether `inter` carries at least one manual relation.
    pub fn is_manual(&self, inter: InterId) -> bool {
        self.edges_of(inter)
            .into_iter()
            .any(|e| self.relation(e).is_some_and(|r| r.manual))
    }

    /// Mark `inter` removed and drop all its edges. Returns `false` when it
    /// was already removed or unknown.
    pub fn remove(&mut self, inter: InterId) -> bool {
        if !self.contains(inter) {
            return false;
        }
        for edge in self.edges_of(inter) {
            self.remove_edge(edge);
        }
        if let Some(removed) = self.inters.get_mut(inter.index()) {
            removed.removed = true;
            debug!("removed {inter} {removed}");
        }
        true
    }

    /// Live inters of `shape`, by increasing abscissa.
    pub fn inters_by_shape(&self, shape: Shape) -> Vec<InterId> {
        let mut ids: Vec<InterId> = self
            .by_shape
            .get(&shape)
            .map(|ids| ids.iter().copied().filter(|id| self.contains(*id)).collect())
            .unwrap_or_default();
        self.sort_by_abscissa(&mut ids);
        ids
    }

    /// Live inters of kind `tag`, by increasing abscissa.
    pub fn inters_of(&self, tag: InterTag) -> Vec<InterId> {
        self.inters_where(|inter| inter.tag() == tag)
    }

    /// Live inters accepted by `pred`, by increasing abscissa.
    pub fn inters_where<F>(&self, pred: F) -> Vec<InterId>
    where
        F: Fn(&Inter) -> bool,
    {
        let mut ids: Vec<InterId> = self
            .vertices()
            .filter(|(_, inter)| pred(inter))
            .map(|(id, _)| id)
            .collect();
        self.sort_by_abscissa(&mut ids);
        ids
    }

    /// Sort by left abscissa, handle order on ties. Unknown ids go last.
    pub fn sort_by_abscissa(&self, ids: &mut [InterId]) {
        ids.sort_by(|a, b| {
            let xa = self.bound_or_last(*a, |r| r.x);
            let xb = self.bound_or_last(*b, |r| r.x);
            xa.total_cmp(&xb).then(a.cmp(b))
        });
    }

    /// Sort by top ordinate, handle order on ties. Unknown ids go last.
    pub fn sort_by_ordinate(&self, ids: &mut [InterId]) {
        ids.sort_by(|a, b| {
            let ya = self.bound_or_last(*a, |r| r.y);
            let yb = self.bound_or_last(*b, |r| r.y);
            ya.total_cmp(&yb).then(a.cmp(b))
        });
    }

    fn bound_or_last(&self, id: InterId, key: impl Fn(&Rect) -> f32) -> f32 {
        self.inters
            .get(id.index())
            .map_or(f32::INFINITY, |inter| key(&inter.bounds))
    }

    /// Live members of `ids` whose box intersects `area`, order preserved.
    pub fn intersected(&self, ids: &[InterId], area: &Rect) -> Vec<InterId> {
        ids.iter()
            .copied()
            .filter(|id| self.inter(*id).is_some_and(|i| i.bounds.intersects(area)))
            .collect()
    }

    /// Live vertices and edges, in handle order.
    pub fn snapshot(&self) -> GraphSnapshot {
        let inters = self
            .vertices()
            .map(|(id, inter)| InterEntry {
                id,
                inter: inter.clone(),
            })
            .collect();
        let relations = self
            .edges
            .iter()
            .flatten()
            .map(|e| RelationEntry {
                source: e.source,
                target: e.target,
                relation: e.relation,
            })
            .collect();
        GraphSnapshot { inters, relations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inter::InterKind;
    use crate::relation::RelationKind;

    fn rest(sig: &mut SIGraph, x: f32) -> InterId {
        sig.add_vertex(Inter::new(
            InterKind::Rest,
            Shape::QuarterRest,
            0.8,
            Rect::new(x, 0.0, 10.0, 20.0),
        ))
    }

    fn dot(sig: &mut SIGraph, x: f32) -> InterId {
        sig.add_vertex(Inter::new(
            InterKind::AugmentationDot,
            Shape::AugmentationDot,
            0.7,
            Rect::new(x, 5.0, 4.0, 4.0),
        ))
    }

    #[test]
    fn single_target_edge_is_replaced() {
        let mut sig = SIGraph::new();
        let first = dot(&mut sig, 0.0);
        let d1 = dot(&mut sig, 8.0);
        let d2 = dot(&mut sig, 9.0);
        sig.add_edge(d1, first, Relation::new(RelationKind::DoubleDot))
            .unwrap();
        sig.add_edge(d2, first, Relation::new(RelationKind::DoubleDot))
            .unwrap();
        let rels = sig.relations(first, RelationKind::DoubleDot);
        assert_eq!(rels.len(), 1);
        assert_eq!(sig.opposite(first, rels[0]), Some(d2));
        assert!(!sig.has_relation(d1, RelationKind::DoubleDot));
    }

    #[test]
    fn augmentation_dot_keeps_a_single_partner() {
        let mut sig = SIGraph::new();
        let r1 = rest(&mut sig, 0.0);
        let r2 = rest(&mut sig, 30.0);
        let d1 = dot(&mut sig, 12.0);
        let d2 = dot(&mut sig, 14.0);
        sig.add_edge(d1, r1, Relation::new(RelationKind::Augmentation))
            .unwrap();
        sig.add_edge(d2, r1, Relation::new(RelationKind::Augmentation))
            .unwrap();
        assert_eq!(sig.incoming(r1, RelationKind::Augmentation).len(), 2);

        sig.add_edge(d1, r2, Relation::new(RelationKind::Augmentation))
            .unwrap();
        let out = sig.outgoing(d1, RelationKind::Augmentation);
        assert_eq!(out.len(), 1);
        assert_eq!(sig.edge_target(out[0]), Some(r2));
        assert_eq!(sig.incoming(r1, RelationKind::Augmentation).len(), 1);
    }

    #[test]
    fn same_pair_is_updated_not_duplicated() {
        let mut sig = SIGraph::new();
        let a = dot(&mut sig, 0.0);
        let b = dot(&mut sig, 10.0);
        let e1 = sig
            .add_edge(a, b, Relation::new(RelationKind::RepeatDotPair))
            .unwrap();
        let e2 = sig
            .add_edge(a, b, Relation::new(RelationKind::RepeatDotPair))
            .unwrap();
        assert_eq!(e1, e2);
        assert_eq!(sig.edge_count(), 1);
    }

    #[test]
    fn manual_edge_survives_replacement_and_pruning() {
        let mut sig = SIGraph::new();
        let r1 = rest(&mut sig, 0.0);
        let r2 = rest(&mut sig, 30.0);
        let d = dot(&mut sig, 12.0);
        let manual = sig
            .add_edge(d, r1, Relation::new(RelationKind::Augmentation).manual())
            .unwrap();
        let err = sig
            .add_edge(d, r2, Relation::new(RelationKind::Augmentation))
            .unwrap_err();
        assert!(matches!(err, SigError::ManualRelation { .. }));
        assert_eq!(sig.remove_all_edges([manual]), 0);
        assert!(sig.is_manual(d));
        assert!(!sig.is_manual(r2));
    }

    #[test]
    fn edges_require_live_endpoints() {
        let mut sig = SIGraph::new();
        let a = dot(&mut sig, 0.0);
        let b = dot(&mut sig, 10.0);
        assert!(sig.remove(b));
        assert_eq!(
            sig.add_edge(a, b, Relation::new(RelationKind::DoubleDot)),
            Err(SigError::RemovedInter(b))
        );
        assert_eq!(
            sig.add_edge(a, InterId(99), Relation::new(RelationKind::DoubleDot)),
            Err(SigError::UnknownInter(InterId(99)))
        );
        assert!(matches!(
            sig.add_edge(a, a, Relation::new(RelationKind::DoubleDot)),
            Err(SigError::SelfLoop { .. })
        ));
    }

    #[test]
    fn remove_is_idempotent_and_drops_edges() {
        let mut sig = SIGraph::new();
        let r = rest(&mut sig, 0.0);
        let d = dot(&mut sig, 12.0);
        sig.add_edge(d, r, Relation::new(RelationKind::Augmentation))
            .unwrap();
        assert!(sig.remove(d));
        assert!(!sig.remove(d));
        assert_eq!(sig.edge_count(), 0);
        assert!(sig.inter(d).is_none());
        assert_eq!(sig.vertex_count(), 1);
        assert!(sig.inters_by_shape(Shape::AugmentationDot).is_empty());
    }

    #[test]
    fn queries_are_sorted_by_abscissa() {
        let mut sig = SIGraph::new();
        let c = dot(&mut sig, 30.0);
        let a = dot(&mut sig, 10.0);
        let b = dot(&mut sig, 20.0);
        assert_eq!(sig.inters_by_shape(Shape::AugmentationDot), vec![a, b, c]);
        assert_eq!(sig.inters_of(InterTag::AugmentationDot), vec![a, b, c]);
        let hits = sig.intersected(&[a, b, c], &Rect::new(15.0, 0.0, 10.0, 10.0));
        assert_eq!(hits, vec![b]);
    }

    #[test]
    fn removal_is_owned_by_the_graph() {
        let mut sig = SIGraph::new();
        let r = rest(&mut sig, 0.0);
        let copy = sig.inter(r).unwrap().clone();
        assert!(!copy.is_removed());
        assert!(sig.remove(r));
        assert!(sig.inter(r).is_none());
        assert!(sig.inter_mut(r).is_none());
        assert!(!sig.remove(r));

        // A serialized removed flag does not survive insertion.
        let mut value = serde_json::to_value(&copy).unwrap();
        value["removed"] = serde_json::Value::Bool(true);
        let stale: Inter = serde_json::from_value(value).unwrap();
        assert!(stale.is_removed());
        let again = sig.add_vertex(stale);
        assert!(!sig.inter(again).unwrap().is_removed());
    }

    #[test]
    fn unknown_ids_sort_last() {
        let mut sig = SIGraph::new();
        let b = dot(&mut sig, 20.0);
        let a = dot(&mut sig, 10.0);
        let stray = InterId(99);
        let mut ids = [stray, b, a];
        sig.sort_by_abscissa(&mut ids);
        assert_eq!(ids, [a, b, stray]);
        let mut ids = [stray, a];
        sig.sort_by_ordinate(&mut ids);
        assert_eq!(ids, [a, stray]);
    }

    #[test]
    fn snapshot_skips_removed() {
        let mut sig = SIGraph::new();
        let r = rest(&mut sig, 0.0);
        let d = dot(&mut sig, 12.0);
        sig.add_edge(d, r, Relation::new(RelationKind::Augmentation))
            .unwrap();
        sig.remove(r);
        let snap = sig.snapshot();
        assert_eq!(snap.inters.len(), 1);
        assert_eq!(snap.inters[0].id, d);
        assert!(snap.relations.is_empty());
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"kind\":\"augmentation_dot\""));
    }
}
