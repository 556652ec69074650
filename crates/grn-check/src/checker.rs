//! Symbolic BFS over the product, batch-parallel across a machine word.
//!
//! Each round spreads the colorings of the frontier states over the open
//! transitions, accumulating into a next-round snapshot so one BFS level
//! never rides its own updates. The set of pursued parametrizations can
//! narrow between rounds once bits are known accepted.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use log::debug;

use grn_core::{Paramset, StateId};
use grn_graph::Product;

use crate::coloring;
use crate::results::SynthesisResults;
use crate::settings::CheckerSettings;
use crate::storage::ColorStorage;

/// The symbolic model checker; borrows the product read-only.
pub struct ModelChecker<'a> {
    product: &'a Product,
}

struct Pass<'a> {
    product: &'a Product,
    settings: &'a CheckerSettings,
    next_colors: Vec<Paramset>,
    updates: BTreeSet<StateId>,
    next_updates: BTreeSet<StateId>,
    to_find: Paramset,
    restrict: Paramset,
    cost: Vec<Option<usize>>,
    found_depth: BTreeMap<StateId, usize>,
    bfs_level: usize,
}

impl Pass<'_> {
    /// Offers new bits to a state in the next-round snapshot.
    fn offer(&mut self, target: StateId, bits: Paramset) {
        if bits.none() {
            return;
        }
        let current = self.next_colors[target];
        if current.contains(bits) {
            return;
        }
        self.next_colors[target] = current | bits;
        self.next_updates.insert(target);
        if self.settings.is_final(target, self.product) {
            let fresh = bits.minus(current);
            let depth = self.bfs_level + 1;
            self.found_depth.entry(target).or_insert(depth);
            for bit in fresh.iter_ones() {
                if self.cost[bit].is_none() {
                    self.cost[bit] = Some(depth);
                }
            }
            self.to_find = self.to_find.minus(fresh);
        }
    }

    /// Spreads the passed bits of one state over its open transitions.
    fn transfer(&mut self, source: StateId, passed: Paramset) {
        if passed.none() {
            return;
        }
        let product = self.product;
        let (first, last) = self.settings.range;
        for transition in product.transitions(source) {
            let cons = product.trans_const(source, transition);
            let bits = passed & coloring::open_mask(first, last, cons);
            self.offer(transition.target, bits);
        }
        if !product.stationary(source).is_empty() {
            let loops =
                coloring::loop_mask(product.uts(), product.uts_id(source), first, last) & passed;
            if loops.any() {
                for &target in product.stationary(source) {
                    self.offer(target, loops);
                }
            }
        }
    }

    /// Picks the update whose coloring dominates the others, which cuts
    /// down redundant propagation.
    fn strongest_update(&self, storage: &ColorStorage) -> StateId {
        let mut best_id = *self.updates.iter().next().expect("updates are non-empty");
        let mut best = Paramset::EMPTY;
        for &id in &self.updates {
            let color = storage.color(id);
            if color != best && color.contains(best) {
                best = color;
                best_id = id;
            }
        }
        best_id
    }
}

impl<'a> ModelChecker<'a> {
    /// Creates a checker over the product.
    pub fn new(product: &'a Product) -> Self {
        Self { product }
    }

    /// Runs one pass configured by `settings` on top of `storage`.
    ///
    /// Existing colors in the storage are kept and extended; callers reset
    /// the storage when a fresh pass is wanted. On return the storage holds
    /// the final coloring together with the per-bit costs and the
    /// acceptable mask.
    pub fn conduct_check(
        &self,
        settings: &CheckerSettings,
        storage: &mut ColorStorage,
    ) -> SynthesisResults {
        let starting = settings.starting;
        let mut pass = Pass {
            product: self.product,
            settings,
            next_colors: storage.colors().to_vec(),
            updates: BTreeSet::new(),
            next_updates: BTreeSet::new(),
            to_find: starting,
            restrict: starting,
            cost: vec![None; Paramset::WIDTH],
            found_depth: BTreeMap::new(),
            bfs_level: 0,
        };
        let initials: Vec<StateId> = settings.initials(self.product).to_vec();

        if !settings.seed_only {
            for &id in &initials {
                storage.update(id, starting);
                pass.next_colors[id] |= starting;
                pass.updates.insert(id);
            }
            if settings.mark_initials {
                let marked = initials
                    .iter()
                    .any(|&id| settings.is_final(id, self.product));
                if marked && starting.any() {
                    for &id in &initials {
                        if settings.is_final(id, self.product) {
                            pass.found_depth.insert(id, 0);
                        }
                    }
                    for bit in starting.iter_ones() {
                        pass.cost[bit] = Some(0);
                    }
                    pass.to_find = pass.to_find.minus(starting);
                }
            }
        }

        loop {
            if settings.minimal && pass.to_find.none() {
                break;
            }
            if let Some(bound) = settings.bfs_bound {
                if pass.bfs_level + 1 > bound {
                    break;
                }
            }
            if settings.minimal {
                pass.restrict = pass.to_find;
            }

            if settings.seed_only && pass.bfs_level == 0 {
                let seed_mask = starting & pass.restrict;
                for &seed in &initials {
                    pass.transfer(seed, seed_mask);
                }
            } else {
                if pass.updates.is_empty() {
                    break;
                }
                while !pass.updates.is_empty() {
                    let id = pass.strongest_update(storage);
                    let passed = storage.color(id) & pass.restrict;
                    pass.transfer(id, passed);
                    pass.updates.remove(&id);
                }
            }

            storage.set_colors(&pass.next_colors);
            pass.updates = mem::take(&mut pass.next_updates);
            if pass.updates.is_empty() {
                break;
            }
            pass.bfs_level += 1;
        }

        let accepted = starting.minus(pass.to_find);
        debug!(
            "check over {:?} finished at level {} with {} accepted",
            settings.range,
            pass.bfs_level,
            accepted.count()
        );
        let mut results = SynthesisResults {
            accepted,
            cost: pass.cost.clone(),
            found_depth: pass.found_depth,
            lower_bound: None,
        };
        results.derive();
        storage.set_results(pass.cost, accepted);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grn_graph::Uts;
    use grn_model::ModelDoc;

    fn monotone_product() -> Product {
        let model = ModelDoc::from_json(
            r#"{
              "network": {
                "species": [
                  { "name": "cA", "max": 1, "basal": 1 }
                ]
              },
              "property": { "series": { "measurements": ["cA=1"] } }
            }"#,
        )
        .unwrap()
        .compile()
        .unwrap();
        let uts = Uts::build(&model.network, &model.kinetics, None).unwrap();
        Product::build(uts, model.property).unwrap()
    }

    #[test]
    fn seeds_stay_uncoloured_without_a_returning_path() {
        // the single parametrization drives cA to 1 and rests there, so
        // nothing ever returns to the state over level 0
        let product = monotone_product();
        let checker = ModelChecker::new(&product);
        let mut storage = ColorStorage::new(product.state_count());
        let seed = product.product_id(0, 0);
        let settings = CheckerSettings {
            initial_states: vec![seed],
            final_states: vec![seed],
            minimal: true,
            seed_only: true,
            starting: Paramset::single(0),
            range: (0, 1),
            ..CheckerSettings::default()
        };
        let results = checker.conduct_check(&settings, &mut storage);
        assert!(!results.is_accepting());
        assert!(storage.color(seed).none());
    }

    #[test]
    fn repeated_checks_reproduce_colors_and_costs() {
        let product = monotone_product();
        let checker = ModelChecker::new(&product);
        let settings = CheckerSettings {
            minimal: true,
            mark_initials: true,
            starting: Paramset::left_ones(1),
            range: (0, 1),
            ..CheckerSettings::default()
        };
        let mut first = ColorStorage::new(product.state_count());
        let first_results = checker.conduct_check(&settings, &mut first);
        let mut second = ColorStorage::new(product.state_count());
        let second_results = checker.conduct_check(&settings, &mut second);
        assert_eq!(first, second);
        assert_eq!(first_results, second_results);
    }
}
