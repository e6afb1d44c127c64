//! Dependency-ordered sequencing of object types.
//!
//! A [`SequenceAnalyzer`] fixes the output types of a run; each call to
//! [`SequenceAnalyzer::sequence`] starts a fresh, lazy [`Sequence`] that walks
//! the type graph depth-first with an explicit frame stack. Output items are
//! produced in post-order, so every dependency precedes its dependents.
//!
//! The walk runs in four phases:
//!
//! 1. system roots (data class and query definitions),
//! 2. root types: output types with no unresolved output dependency,
//! 3. deferred dependents,
//! 4. types with a dynamic dependency.
//!
//! Cycles are reported through the optional log callback and otherwise
//! ignored: a type already visited is never entered again.

mod probe;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use object_types_sdk::{OutputItem, TypeDescriptor, TypeFilter, TypeKey};
use tracing::{debug, trace};

use super::catalog::TypeCatalog;

type LogFn<'a> = dyn Fn(&str, usize, bool) + 'a;

/// How a type is reached from the type that references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Via {
    Reference,
    /// Processed as part of its parent's unit of work.
    Folded,
    /// Reached from its composite owner.
    Component,
    /// Entered in place of one of its components.
    Owner,
}

#[derive(Debug, Clone)]
struct Edge {
    target: String,
    via: Via,
}

/// Output types and traversal rules of one sequencing run.
pub struct SequenceAnalyzer<'a> {
    catalog: &'a TypeCatalog,
    filter: &'a dyn TypeFilter,
    /// Sorted by key: ordinal ignore-case order.
    output_types: Vec<(TypeKey, String)>,
    output_set: HashSet<TypeKey>,
    log: Option<Box<LogFn<'a>>>,
}

impl<'a> SequenceAnalyzer<'a> {
    /// Analyzer over every registered type.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog, filter: &'a dyn TypeFilter) -> Self {
        Self::with_types(catalog, filter, catalog.all_types())
    }

    /// Analyzer restricted to the given type names.
    ///
    /// Registered names are selected by the filter and dropped when they fold
    /// into their parent. Names only the entity provider knows are kept as
    /// given; names nobody knows are skipped.
    #[must_use]
    pub fn with_types<I, S>(catalog: &'a TypeCatalog, filter: &'a dyn TypeFilter, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output: IndexMap<TypeKey, String> = IndexMap::new();

        for name in types {
            let name = name.as_ref();
            let key = TypeKey::new(name);
            if output.contains_key(&key) {
                continue;
            }
            if let Some(descriptor) = catalog.registered(&key) {
                if !is_folded(filter, descriptor) && filter.is_included_type(descriptor) {
                    output.insert(key, descriptor.object_type.clone());
                }
            } else if catalog.get_descriptor(name).is_some() {
                output.insert(key, name.to_owned());
            } else {
                debug!(object_type = %name, "Requested object type is unknown, skipping");
            }
        }

        let mut output_types: Vec<(TypeKey, String)> = output.into_iter().collect();
        output_types.sort_by(|a, b| a.0.cmp(&b.0));
        let output_set = output_types.iter().map(|(key, _)| key.clone()).collect();

        Self {
            catalog,
            filter,
            output_types,
            output_set,
            log: None,
        }
    }

    /// Installs a callback receiving `(message, indent, is_cycle)` for every
    /// visited type and every detected cycle.
    #[must_use]
    pub fn with_log(mut self, log: impl Fn(&str, usize, bool) + 'a) -> Self {
        self.log = Some(Box::new(log));
        self
    }

    /// Output type names in processing order.
    pub fn output_type_names(&self) -> impl Iterator<Item = &str> {
        self.output_types.iter().map(|(_, name)| name.as_str())
    }

    #[must_use]
    pub fn is_output_type(&self, object_type: &str) -> bool {
        self.output_set.contains(&TypeKey::new(object_type))
    }

    /// Starts a new run. Runs are independent of each other.
    #[must_use]
    pub fn sequence(&self) -> Sequence<'_, 'a> {
        Sequence {
            analyzer: self,
            phase: Phase::SystemRoots(0),
            pending: self.output_set.clone(),
            returned: IndexMap::new(),
            visited: HashSet::new(),
            frames: Vec::new(),
            deferred_dependents: Vec::new(),
            deferred_dynamic: Vec::new(),
            descriptors: HashMap::new(),
            ready: VecDeque::new(),
            allow_dynamic: false,
        }
    }

    /// Edges leaving `descriptor`, in visiting order.
    fn successors(&self, descriptor: &TypeDescriptor, via: Via) -> Vec<Edge> {
        let well_known = self.catalog.well_known();
        let mut edges = Vec::new();

        // A folded type is walked from its parent, which must not be entered again.
        let parents: Vec<&str> = descriptor
            .parent_type
            .iter()
            .map(String::as_str)
            .chain(
                descriptor
                    .register_as
                    .iter()
                    .flatten()
                    .map(|r| r.target_type.as_str()),
            )
            .collect();
        let is_parent = |name: &str| parents.iter().any(|p| p.eq_ignore_ascii_case(name));
        let mut push = |target: &str, edge_via: Via| {
            if via == Via::Folded && is_parent(target) {
                return;
            }
            edges.push(Edge {
                target: target.to_owned(),
                via: edge_via,
            });
        };

        for dependency in &descriptor.dependencies {
            push(&dependency.target_type, Via::Reference);
        }
        if descriptor.is_site_object() {
            push(&well_known.site, Via::Reference);
        }
        for parent in &parents {
            push(parent, Via::Reference);
        }
        if via != Via::Component
            && let Some(composite) = &descriptor.composite_type
        {
            push(composite, Via::Reference);
        }
        for component in &descriptor.component_types {
            push(component, Via::Component);
        }
        for child in &descriptor.child_types {
            if self
                .catalog
                .get_descriptor(child)
                .is_some_and(|d| self.filter.is_child_included_to_parent(&d))
            {
                push(child, Via::Folded);
            }
        }
        for binding in &descriptor.binding_types {
            if self
                .catalog
                .get_descriptor(binding)
                .is_some_and(|d| self.filter.is_binding_included_to_parent(&d))
            {
                push(binding, Via::Folded);
            }
        }
        edges
    }

    fn log(&self, message: &str, indent: usize, is_cycle: bool) {
        if let Some(log) = &self.log {
            log(message, indent, is_cycle);
        }
    }
}

fn is_folded(filter: &dyn TypeFilter, descriptor: &TypeDescriptor) -> bool {
    descriptor.has_parent()
        && if descriptor.is_binding() {
            filter.is_binding_included_to_parent(descriptor)
        } else {
            filter.is_child_included_to_parent(descriptor)
        }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    SystemRoots(usize),
    Roots(usize),
    Dependents(usize),
    Dynamic(usize),
    Done,
}

#[derive(Debug)]
struct Frame {
    key: TypeKey,
    descriptor: Arc<TypeDescriptor>,
    edges: Vec<Edge>,
    next: usize,
    is_output: bool,
}

/// Lazy, non-restartable run of a [`SequenceAnalyzer`].
///
/// The traversal pauses whenever an item is ready and resumes exactly there
/// on the next call to `next`.
pub struct Sequence<'s, 'a> {
    analyzer: &'s SequenceAnalyzer<'a>,
    phase: Phase,
    pending: HashSet<TypeKey>,
    returned: IndexMap<TypeKey, String>,
    visited: HashSet<TypeKey>,
    frames: Vec<Frame>,
    deferred_dependents: Vec<(TypeKey, String)>,
    deferred_dynamic: Vec<(TypeKey, String)>,
    descriptors: HashMap<TypeKey, Option<Arc<TypeDescriptor>>>,
    ready: VecDeque<OutputItem>,
    allow_dynamic: bool,
}

impl Sequence<'_, '_> {
    /// Names of the types emitted so far, in emission order.
    pub fn emitted(&self) -> impl Iterator<Item = &str> {
        self.returned.values().map(String::as_str)
    }

    fn resolve(&mut self, name: &str) -> Option<Arc<TypeDescriptor>> {
        let catalog = self.analyzer.catalog;
        self.descriptors
            .entry(TypeKey::new(name))
            .or_insert_with(|| catalog.get_descriptor(name))
            .clone()
    }

    fn is_blocked_dynamic(&self, key: &TypeKey, descriptor: &TypeDescriptor) -> bool {
        !self.allow_dynamic
            && descriptor.has_dynamic_dependency()
            && self.analyzer.output_set.contains(key)
    }

    /// Advances to the next root of the current phase. Returns `false` when
    /// every phase is exhausted.
    fn advance(&mut self) -> bool {
        match self.phase {
            Phase::SystemRoots(i) => {
                let roots = self.analyzer.catalog.well_known().system_roots();
                if let Some(root) = roots.get(i) {
                    self.phase = Phase::SystemRoots(i + 1);
                    let root = (*root).to_owned();
                    self.enter(&root, Via::Reference);
                } else {
                    self.phase = Phase::Roots(0);
                }
            }
            Phase::Roots(i) => {
                if let Some((key, name)) = self.analyzer.output_types.get(i) {
                    self.phase = Phase::Roots(i + 1);
                    self.visit_root(key.clone(), name.clone());
                } else {
                    self.phase = Phase::Dependents(0);
                }
            }
            Phase::Dependents(i) => {
                if let Some((key, name)) = self.deferred_dependents.get(i).cloned() {
                    self.phase = Phase::Dependents(i + 1);
                    if self.pending.contains(&key) {
                        self.enter(&name, Via::Reference);
                    }
                } else {
                    self.allow_dynamic = true;
                    self.phase = Phase::Dynamic(0);
                }
            }
            Phase::Dynamic(i) => {
                if let Some((key, name)) = self.deferred_dynamic.get(i).cloned() {
                    self.phase = Phase::Dynamic(i + 1);
                    if self.pending.contains(&key) {
                        self.enter(&name, Via::Reference);
                    }
                } else {
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => return false,
        }
        true
    }

    fn visit_root(&mut self, key: TypeKey, name: String) {
        if !self.pending.contains(&key) {
            return;
        }
        let Some(descriptor) = self.resolve(&name) else {
            return;
        };
        if descriptor.has_dynamic_dependency() {
            trace!(object_type = %name, "Deferring type with dynamic dependency");
            self.deferred_dynamic.push((key, name));
        } else if self.has_unresolved_dependency(&descriptor) {
            trace!(object_type = %name, "Deferring dependent type");
            self.deferred_dependents.push((key, name));
        } else {
            self.enter(&name, Via::Reference);
        }
    }

    fn enter(&mut self, name: &str, via: Via) {
        let key = TypeKey::new(name);
        let depth = self.frames.len();

        if self.visited.contains(&key) {
            let reentered_self = self.frames.last().is_some_and(|f| f.key == key);
            let on_output_stack = self
                .frames
                .iter()
                .find(|f| f.is_output && f.key == key)
                .map(|f| f.descriptor.object_type.clone());
            if !reentered_self && let Some(target) = on_output_stack {
                let path = self
                    .frames
                    .iter()
                    .filter(|f| f.is_output)
                    .map(|f| f.descriptor.object_type.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                let message = format!("Cycle detected: {target} ({path} -> {target})");
                debug!(object_type = %target, path = %path, "Object type dependency cycle");
                self.analyzer.log(&message, depth, true);
            }
            return;
        }

        let Some(descriptor) = self.resolve(name) else {
            trace!(object_type = %name, "Unresolved object type reference, skipping");
            return;
        };
        if self.is_blocked_dynamic(&key, &descriptor) {
            return;
        }
        // Components are expanded from their composite so they precede it.
        if via == Via::Reference
            && let Some(owner) = self.unvisited_owner(&descriptor)
        {
            trace!(object_type = %name, owner = %owner, "Entering composite owner first");
            self.enter(&owner, Via::Owner);
            return;
        }

        let is_output = self.analyzer.output_set.contains(&key);
        self.visited.insert(key.clone());
        self.analyzer.log(&descriptor.object_type, depth, false);

        let edges = self.analyzer.successors(&descriptor, via);
        self.frames.push(Frame {
            key,
            descriptor,
            edges,
            next: 0,
            is_output,
        });
    }

    /// Topmost composite owner of `descriptor` that is not visited yet and
    /// lists its member among its components.
    fn unvisited_owner(&mut self, descriptor: &TypeDescriptor) -> Option<String> {
        let mut seen = HashSet::from([descriptor.key()]);
        let mut owner = None;
        let mut member = descriptor.object_type.clone();
        let mut next = descriptor.composite_type.clone();

        while let Some(name) = next.take() {
            let key = TypeKey::new(&name);
            if self.visited.contains(&key) || !seen.insert(key.clone()) {
                break;
            }
            let Some(composite) = self.resolve(&name) else {
                break;
            };
            let lists_member = composite
                .component_types
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&member));
            if !lists_member || self.is_blocked_dynamic(&key, &composite) {
                break;
            }
            member.clone_from(&composite.object_type);
            next.clone_from(&composite.composite_type);
            owner = Some(name);
        }
        owner
    }

    /// Follows the next edge of the innermost frame, or completes it.
    fn step(&mut self) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if let Some(edge) = frame.edges.get(frame.next).cloned() {
            frame.next += 1;
            self.enter(&edge.target, edge.via);
            return;
        }

        let Some(frame) = self.frames.pop() else {
            return;
        };
        if frame.is_output && self.pending.contains(&frame.key) {
            self.emit_with_bindings(&frame.descriptor);
        }
    }

    /// Emits `descriptor`, then each of its direct bindings that is ready.
    fn emit_with_bindings(&mut self, descriptor: &TypeDescriptor) {
        self.emit(descriptor);

        let candidates = descriptor
            .binding_types
            .iter()
            .chain(&descriptor.other_binding_types);
        for name in candidates {
            let key = TypeKey::new(name);
            if !self.pending.contains(&key) {
                continue;
            }
            let Some(binding) = self.resolve(name) else {
                continue;
            };
            if self.is_blocked_dynamic(&key, &binding) || self.has_unresolved_dependency(&binding) {
                continue;
            }
            self.visited.insert(key);
            self.emit(&binding);
        }
    }

    fn emit(&mut self, descriptor: &TypeDescriptor) {
        let key = descriptor.key();
        if !self.pending.remove(&key) {
            return;
        }
        trace!(object_type = %descriptor.object_type, "Emitting object type");
        self.ready.extend(OutputItem::expand(
            descriptor,
            self.analyzer.catalog.well_known(),
        ));
        self.returned.insert(key, descriptor.object_type.clone());
    }
}

impl Iterator for Sequence<'_, '_> {
    type Item = OutputItem;

    fn next(&mut self) -> Option<OutputItem> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            if self.frames.is_empty() {
                if !self.advance() {
                    return None;
                }
            } else {
                self.step();
            }
        }
    }
}
