/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::UserId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Present in `new`, absent in `old`, in `new` order.
    pub added: Vec<UserId>,
    /// Present in `old`, absent in `new`, in `old` order.
    pub removed: Vec<UserId>,
}

/// Diffs two membership lists with set semantics : duplicates within one list
/// count as a single membership and are emitted at most once.
pub fn diff_membership(old: &[UserId], new: &[UserId]) -> MembershipDiff {
    let old_set: FxHashSet<&UserId> = old.iter().collect();
    let new_set: FxHashSet<&UserId> = new.iter().collect();

    let mut added = Vec::new();
    let mut emitted: FxHashSet<&UserId> = FxHashSet::default();
    for user_id in new {
        if !old_set.contains(user_id) && emitted.insert(user_id) {
            added.push(user_id.to_owned());
        }
    }

    let mut removed = Vec::new();
    let mut emitted: FxHashSet<&UserId> = FxHashSet::default();
    for user_id in old {
        if !new_set.contains(user_id) && emitted.insert(user_id) {
            removed.push(user_id.to_owned());
        }
    }

    MembershipDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<UserId> {
        raw.iter().map(|id| UserId(id.to_string())).collect()
    }

    #[test]
    fn added_and_removed_are_disjoint() {
        let old = ids(&["a", "b", "c"]);
        let new = ids(&["b", "c", "d"]);
        let diff = diff_membership(&old, &new);
        assert_eq!(diff.added, ids(&["d"]));
        assert_eq!(diff.removed, ids(&["a"]));
        for user_id in &diff.added {
            assert!(!diff.removed.contains(user_id));
        }
    }

    #[test]
    fn diff_is_antisymmetric() {
        let old = ids(&["a", "b", "c"]);
        let new = ids(&["c", "d"]);
        let forward = diff_membership(&old, &new);
        let backward = diff_membership(&new, &old);
        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.removed, backward.added);
    }

    #[test]
    fn identical_lists_diff_to_empty() {
        let list = ids(&["a", "b"]);
        let diff = diff_membership(&list, &list);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn both_empty() {
        let diff = diff_membership(&[], &[]);
        assert_eq!(diff, MembershipDiff::default());
    }

    #[test]
    fn duplicates_collapse_to_single_membership() {
        let old = ids(&["a", "a", "b"]);
        let new = ids(&["b", "c", "c", "b"]);
        let diff = diff_membership(&old, &new);
        assert_eq!(diff.added, ids(&["c"]));
        assert_eq!(diff.removed, ids(&["a"]));
    }

    #[test]
    fn output_preserves_input_order() {
        let old = ids(&["x", "m", "y", "n"]);
        let new = ids(&["q", "m", "p", "n"]);
        let diff = diff_membership(&old, &new);
        assert_eq!(diff.added, ids(&["q", "p"]));
        assert_eq!(diff.removed, ids(&["x", "y"]));
    }
}
