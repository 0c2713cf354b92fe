//! `htgroup` membership store.

use std::collections::BTreeMap;

use super::HtFile;

/// Parsed view of one `htgroup` file: group name → member usernames.
///
/// The value field tokenizes on whitespace. Member order follows the source
/// line, duplicates included; a line whose value tokenizes to nothing is not
/// stored at all, so an existing group always has at least one member.
#[derive(Debug)]
pub struct HtGroupFile {
    entries: BTreeMap<String, Vec<String>>,
    clear_on_load: bool,
}

impl HtGroupFile {
    /// Create an empty store that clears itself at the start of each load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clear_on_load(true)
    }

    /// Create an empty store with an explicit clear-on-load policy.
    #[must_use]
    pub fn with_clear_on_load(clear_on_load: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            clear_on_load,
        }
    }

    /// Number of stored groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the store holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members of `group`, in source order, or `None` if the group was never
    /// seen. An empty slice is never returned.
    #[must_use]
    pub fn get_users(&self, group: &str) -> Option<&[String]> {
        self.entries.get(group).map(Vec::as_slice)
    }

    /// Every group whose member list contains `user` (exact string match),
    /// in lexicographic group-name order. Computed by scanning all groups;
    /// an unknown user yields an empty vector, never an error.
    #[must_use]
    pub fn get_groups(&self, user: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m == user))
            .map(|(group, _)| group.clone())
            .collect()
    }
}

impl HtFile for HtGroupFile {
    fn put(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }
        let members: Vec<String> = value.split_whitespace().map(str::to_string).collect();
        if !members.is_empty() {
            self.entries.insert(key.to_string(), members);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn clear_on_load(&self) -> bool {
        self.clear_on_load
    }
}

impl Default for HtGroupFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "empty:\n\
        group2: root\n\
        group3: user1   user2     user3\n\
        group4:user4\n\
        group5: root user2\n\
        admin: root\n\
        empty2 : \n";

    fn loaded() -> HtGroupFile {
        let mut groups = HtGroupFile::new();
        groups.load(INPUT.as_bytes()).unwrap();
        groups
    }

    #[test]
    fn test_memberless_groups_are_absent() {
        let groups = loaded();
        assert!(groups.get_users("empty").is_none());
        assert!(groups.get_users("empty2").is_none());
        assert!(groups.get_users("unknown").is_none());
    }

    #[test]
    fn test_membership_lists() {
        let groups = loaded();
        assert_eq!(groups.get_users("group2"), Some(&["root".to_string()][..]));
        assert_eq!(groups.get_users("group3").unwrap().len(), 3);
        assert_eq!(groups.get_users("group4").unwrap(), ["user4"]);

        let group3 = groups.get_users("group3").unwrap();
        assert!(group3.contains(&"user1".to_string()));
        assert!(group3.contains(&"user3".to_string()));
        assert!(!group3.contains(&"root".to_string()));
    }

    #[test]
    fn test_reverse_lookup() {
        let groups = loaded();
        assert_eq!(groups.get_groups("root"), ["admin", "group2", "group5"]);
        assert_eq!(groups.get_groups("user2"), ["group3", "group5"]);
    }

    #[test]
    fn test_reverse_lookup_unknown_user_is_empty_not_absent() {
        let groups = loaded();
        assert!(groups.get_groups("stranger").is_empty());
    }

    #[test]
    fn test_duplicate_members_are_preserved() {
        let mut groups = HtGroupFile::new();
        groups.load("g: a a b\n".as_bytes()).unwrap();
        assert_eq!(groups.get_users("g").unwrap(), ["a", "a", "b"]);
    }

    #[test]
    fn test_exact_match_only() {
        let mut groups = HtGroupFile::new();
        groups.load("g: alice alicia\n".as_bytes()).unwrap();
        assert_eq!(groups.get_groups("alice"), ["g"]);
        assert!(groups.get_groups("ali").is_empty());
    }
}
