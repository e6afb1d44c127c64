//! Closure probe for root detection and binding interleaving.

use std::collections::HashSet;

use object_types_sdk::{TypeDescriptor, TypeKey};

use super::{Sequence, Via};

impl Sequence<'_, '_> {
    /// Returns `true` if some output type in the dependency closure of
    /// `descriptor` has not been emitted yet.
    ///
    /// Output types end the walk: emitted ones resolve their branch, pending
    /// ones block. Non-output types are walked through. Dynamic output types
    /// never block before the dynamic phase. The probe has its own visited
    /// set and leaves the run state untouched.
    pub(super) fn has_unresolved_dependency(&mut self, descriptor: &TypeDescriptor) -> bool {
        let analyzer = self.analyzer;
        let mut seen: HashSet<TypeKey> = HashSet::from([descriptor.key()]);
        let mut stack: Vec<(String, Via)> = analyzer
            .successors(descriptor, Via::Reference)
            .into_iter()
            .rev()
            .map(|edge| (edge.target, edge.via))
            .collect();

        while let Some((name, via)) = stack.pop() {
            let key = TypeKey::new(&name);
            if !seen.insert(key.clone()) {
                continue;
            }
            let Some(target) = self.resolve(&name) else {
                continue;
            };

            if analyzer.output_set.contains(&key) {
                if self.returned.contains_key(&key) || self.is_blocked_dynamic(&key, &target) {
                    continue;
                }
                if self.pending.contains(&key) {
                    return true;
                }
                continue;
            }

            stack.extend(
                analyzer
                    .successors(&target, via)
                    .into_iter()
                    .rev()
                    .map(|edge| (edge.target, edge.via)),
            );
        }
        false
    }
}
