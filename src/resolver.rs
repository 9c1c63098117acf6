//! Cycle-safe construction of type graphs.
//!
//! A producer walks its own source representation and brackets the
//! construction of every named declaration with `enter` / `finish`. The
//! resolver reserves an arena slot on `enter`, so a reference that loops back
//! to a declaration still under construction becomes a `RecursiveReference`
//! pointing at that reserved slot instead of an infinite descent. `finish`
//! fills the slot exactly once and settles every placeholder recorded against
//! it; `into_graph` checks that nothing is left pending.
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::error::GraphError;
use crate::types::{NamedId, NamedType, RecursiveReference, Type};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Name, module and visibility of a declaration, known before its body is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationHeader {
    pub name: String,
    pub origin_module: String,
    pub is_exported: bool,
}

/// Outcome of `RecursiveResolver::enter`.
#[derive(Debug)]
pub enum Visit {
    /// Not seen before: build the body, then call `finish`.
    Enter(NamedId),
    /// Already under construction further up: use this back-edge in place of the body.
    Cycle(Type),
    /// Already built: reuse the shared declaration.
    Finished(Type),
}

#[derive(Debug)]
enum Slot {
    Reserved(DeclarationHeader),
    Finished(Arc<NamedType>),
}

#[derive(Debug)]
pub struct RecursiveResolver<S> {
    visiting: Vec<(S, NamedId)>,
    reserved: HashMap<S, NamedId>,
    pending: HashMap<S, Vec<NamedId>>,
    slots: Vec<Slot>,
}

/// A finished, immutable type graph.
///
/// `declarations` is the arena every `RecursiveReference` in the graph points into.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    root: Arc<NamedType>,
    declarations: Vec<Arc<NamedType>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DeclarationHeader {
    pub fn new(name: impl Into<String>, origin_module: impl Into<String>, is_exported: bool) -> Self {
        Self {
            name: name.into(),
            origin_module: origin_module.into(),
            is_exported,
        }
    }
}

impl<S> Default for RecursiveResolver<S> {
    fn default() -> Self {
        Self {
            visiting: Vec::new(),
            reserved: HashMap::new(),
            pending: HashMap::new(),
            slots: Vec::new(),
        }
    }
}

impl<S> RecursiveResolver<S>
where
    S: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visiting(&self, source: &S) -> bool {
        self.visiting.iter().any(|(s, _)| s == source)
    }

    /// Placeholders created for declarations that have not finished yet.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn enter(&mut self, source: S, header: DeclarationHeader) -> Result<Visit, GraphError> {
        if let Some(&id) = self.reserved.get(&source) {
            return match &self.slots[id.index()] {
                Slot::Finished(named) => Ok(Visit::Finished(Type::Named(named.clone()))),
                // reserved slots are exactly the ones on the visiting stack
                Slot::Reserved(reserved) => {
                    debug!(source = ?source, name = %reserved.name, %id, "cycle detected");
                    let placeholder = RecursiveReference {
                        target: id,
                        name: reserved.name.clone(),
                    };
                    self.pending.entry(source).or_default().push(id);
                    Ok(Visit::Cycle(Type::RecursiveReference(placeholder)))
                }
            };
        }

        let id = NamedId(self.slots.len() as u32);
        debug!(source = ?source, name = %header.name, %id, "entering declaration");
        self.slots.push(Slot::Reserved(header));
        self.reserved.insert(source.clone(), id);
        self.visiting.push((source, id));
        Ok(Visit::Enter(id))
    }

    /// Complete the declaration on top of the visiting stack.
    pub fn finish(&mut self, source: &S, target: Type) -> Result<Arc<NamedType>, GraphError> {
        let Some(&id) = self.reserved.get(source) else {
            return Err(GraphError::NotVisiting { name: format!("{source:?}") });
        };
        let header = match &self.slots[id.index()] {
            Slot::Finished(named) => {
                return Err(GraphError::AlreadyRegistered { name: named.name.clone() });
            }
            Slot::Reserved(header) => header.clone(),
        };
        match self.visiting.last() {
            Some((top, _)) if top == source => {}
            Some((_, top_id)) => {
                return Err(GraphError::VisitOrder {
                    finished: header.name,
                    top: self.slot_name(*top_id).to_owned(),
                });
            }
            None => return Err(GraphError::NotVisiting { name: header.name }),
        }
        self.visiting.pop();

        let named = Arc::new(NamedType {
            name: header.name,
            origin_module: header.origin_module,
            is_exported: header.is_exported,
            target,
        });
        self.slots[id.index()] = Slot::Finished(named.clone());

        let resolved = self.pending.remove(source).map_or(0, |refs| refs.len());
        debug!(name = %named.name, %id, resolved, "declaration finished");
        Ok(named)
    }

    /// Dereference a slot; fails while the declaration is still being built.
    pub fn declaration(&self, id: NamedId) -> Result<&Arc<NamedType>, GraphError> {
        match self.slots.get(id.index()) {
            Some(Slot::Finished(named)) => Ok(named),
            Some(Slot::Reserved(_)) => Err(GraphError::Unresolved { id }),
            None => Err(GraphError::UnknownSlot { id }),
        }
    }

    /// Seal the arena. Every entered declaration must have finished.
    pub fn into_graph(self, root: Arc<NamedType>) -> Result<TypeGraph, GraphError> {
        let mut unresolved: Vec<String> = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Reserved(header) => Some(header.name.clone()),
                Slot::Finished(_) => None,
            })
            .collect();
        if !unresolved.is_empty() {
            unresolved.sort();
            debug!(pending = self.pending_count(), "type graph has unfinished declarations");
            return Err(GraphError::UnresolvedPlaceholders { names: unresolved });
        }

        let declarations: Vec<Arc<NamedType>> = self
            .slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Finished(named) => Some(named),
                Slot::Reserved(_) => None,
            })
            .collect();
        debug!(root = %root.name, declarations = declarations.len(), "type graph sealed");
        Ok(TypeGraph { root, declarations })
    }

    fn slot_name(&self, id: NamedId) -> &str {
        match &self.slots[id.index()] {
            Slot::Reserved(header) => &header.name,
            Slot::Finished(named) => &named.name,
        }
    }
}

impl TypeGraph {
    /// Graph for a hand-built declaration that contains no recursive references.
    pub fn new(root: NamedType) -> Self {
        Self {
            root: Arc::new(root),
            declarations: Vec::new(),
        }
    }

    pub fn root(&self) -> &Arc<NamedType> {
        &self.root
    }

    pub fn declarations(&self) -> &[Arc<NamedType>] {
        &self.declarations
    }

    pub fn declaration(&self, id: NamedId) -> Result<&Arc<NamedType>, GraphError> {
        self.declarations
            .get(id.index())
            .ok_or(GraphError::UnknownSlot { id })
    }

    /// Follow a `RecursiveReference` to the declaration it stands for.
    pub fn resolve_reference(&self, reference: &RecursiveReference) -> Result<&Arc<NamedType>, GraphError> {
        self.declaration(reference.target)
    }

    /// Root plus every exported declaration, root first, without repeats.
    pub fn exported(&self) -> Vec<&Arc<NamedType>> {
        let mut out = vec![&self.root];
        for named in &self.declarations {
            if named.is_exported && !out.iter().any(|seen| Arc::ptr_eq(seen, named)) {
                out.push(named);
            }
        }
        out
    }
}

// ------------------------------- Tests ------------------------------------ //
