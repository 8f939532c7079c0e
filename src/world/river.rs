use std::collections::HashMap;

use super::cell::RiverId;

/// Tracks river identity without cyclic cell-to-cell links: a river is a name
/// plus the set of cell indices that currently carry it. Merges are recorded
/// as a forwarding map so a cell's stored `river_name` stays valid even after
/// its river has been absorbed by another.
#[derive(Debug, Clone, Default)]
pub struct RiverRegistry {
    next_id: RiverId,
    members: HashMap<RiverId, Vec<usize>>,
    merged_into: HashMap<RiverId, RiverId>,
}

impl RiverRegistry {
    pub fn new() -> Self {
        RiverRegistry {
            next_id: 1,
            members: HashMap::new(),
            merged_into: HashMap::new(),
        }
    }

    /// Start a brand-new river (a spring's first flow) and return its id.
    pub fn new_river(&mut self, origin_index: usize) -> RiverId {
        let id = self.next_id;
        self.next_id += 1;
        self.members.insert(id, vec![origin_index]);
        id
    }

    pub fn add_member(&mut self, name: RiverId, index: usize) {
        let canonical = self.resolve(name);
        self.members.entry(canonical).or_default().push(index);
    }

    /// Resolve a (possibly absorbed) river id to its current canonical id.
    pub fn resolve(&self, name: RiverId) -> RiverId {
        let mut current = name;
        while let Some(&next) = self.merged_into.get(&current) {
            current = next;
        }
        current
    }

    /// Merge `absorbed` into `winner`. No-op if already merged or identical.
    pub fn merge(&mut self, absorbed: RiverId, winner: RiverId) {
        let absorbed = self.resolve(absorbed);
        let winner = self.resolve(winner);
        if absorbed == winner {
            return;
        }
        if let Some(members) = self.members.remove(&absorbed) {
            self.members.entry(winner).or_default().extend(members);
        }
        self.merged_into.insert(absorbed, winner);
    }

    pub fn member_count(&self, name: RiverId) -> usize {
        self.members
            .get(&self.resolve(name))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn river_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_river_starts_with_one_member() {
        let mut reg = RiverRegistry::new();
        let id = reg.new_river(7);
        assert_eq!(reg.member_count(id), 1);
    }

    #[test]
    fn merge_combines_membership_and_forwards_lookups() {
        let mut reg = RiverRegistry::new();
        let a = reg.new_river(1);
        let b = reg.new_river(2);
        reg.add_member(a, 10);
        reg.add_member(b, 20);

        reg.merge(a, b);

        assert_eq!(reg.resolve(a), reg.resolve(b));
        assert_eq!(reg.member_count(b), 3);
        assert_eq!(reg.river_count(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut reg = RiverRegistry::new();
        let a = reg.new_river(1);
        let b = reg.new_river(2);
        reg.merge(a, b);
        reg.merge(a, b);
        assert_eq!(reg.river_count(), 1);
    }

    #[test]
    fn transitive_merge_resolves_through_chain() {
        let mut reg = RiverRegistry::new();
        let a = reg.new_river(1);
        let b = reg.new_river(2);
        let c = reg.new_river(3);
        reg.merge(a, b);
        reg.merge(b, c);
        assert_eq!(reg.resolve(a), reg.resolve(c));
    }

    #[test]
    fn add_member_after_merge_lands_on_canonical() {
        let mut reg = RiverRegistry::new();
        let a = reg.new_river(1);
        let b = reg.new_river(2);
        reg.merge(a, b);
        reg.add_member(a, 99);
        assert_eq!(reg.member_count(b), 3);
    }
}
