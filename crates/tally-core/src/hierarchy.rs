//! In-memory views over stored rows: the account tree and statement
//! replacement chains.
//!
//! The database stores the account hierarchy as an adjacency list
//! (`parent_id`). `AccountTree` loads it into an arena of nodes addressed by
//! index so walks and path lookups never chase references.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::{Result, TallyError};
use crate::storage::types::{Account, Statement};

/// Separator between names in an account path.
pub const PATH_SEPARATOR: char = ':';

#[derive(Debug)]
struct AccountNode {
    account: Account,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Chart of accounts arranged by parent.
#[derive(Debug, Default)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
    index: HashMap<Uuid, usize>,
    roots: Vec<usize>,
}

impl AccountTree {
    /// Build a tree from a flat list of accounts.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Integrity` if an account names a parent that is
    /// not in `accounts`.
    pub fn build(accounts: Vec<Account>) -> Result<Self> {
        let mut nodes: Vec<AccountNode> = accounts
            .into_iter()
            .map(|account| AccountNode {
                account,
                parent: None,
                children: Vec::new(),
            })
            .collect();

        let index: HashMap<Uuid, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.account.id, i))
            .collect();

        let mut roots = Vec::new();
        for i in 0..nodes.len() {
            let parent_id = nodes[i].account.parent_id;
            match parent_id {
                Some(parent_id) => {
                    let parent = *index.get(&parent_id).ok_or_else(|| {
                        TallyError::Integrity(format!(
                            "account {} references missing parent {}",
                            nodes[i].account.id, parent_id
                        ))
                    })?;
                    nodes[i].parent = Some(parent);
                    nodes[parent].children.push(i);
                }
                None => roots.push(i),
            }
        }

        let by_name = |nodes: &[AccountNode], a: &usize, b: &usize| {
            let (a, b) = (&nodes[*a].account, &nodes[*b].account);
            a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
        };
        roots.sort_by(|a, b| by_name(nodes.as_slice(), a, b));
        for i in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[i].children);
            children.sort_by(|a, b| by_name(nodes.as_slice(), a, b));
            nodes[i].children = children;
        }

        Ok(Self {
            nodes,
            index,
            roots,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Account> {
        self.index.get(id).map(|&i| &self.nodes[i].account)
    }

    /// Root accounts, sorted by name.
    pub fn roots(&self) -> Vec<&Account> {
        self.roots.iter().map(|&i| &self.nodes[i].account).collect()
    }

    /// Direct children of `id`, sorted by name. Empty for unknown ids.
    pub fn children(&self, id: &Uuid) -> Vec<&Account> {
        self.index
            .get(id)
            .map(|&i| {
                self.nodes[i]
                    .children
                    .iter()
                    .map(|&c| &self.nodes[c].account)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Colon-joined names from the root down to `id`.
    pub fn path(&self, id: &Uuid) -> Option<String> {
        let mut current = *self.index.get(id)?;
        let mut names = vec![self.nodes[current].account.name.as_str()];
        while let Some(parent) = self.nodes[current].parent {
            // A parent loop would never terminate.
            if names.len() > self.nodes.len() {
                return None;
            }
            names.push(self.nodes[parent].account.name.as_str());
            current = parent;
        }
        names.reverse();
        Some(names.join(&PATH_SEPARATOR.to_string()))
    }

    /// Resolve a path such as `Assets:Bank:Checking`.
    pub fn find_by_path(&self, path: &str) -> Option<&Account> {
        let mut level: &[usize] = &self.roots;
        let mut found: Option<usize> = None;

        for segment in path.split(PATH_SEPARATOR).map(str::trim) {
            if segment.is_empty() {
                return None;
            }
            let next = *level
                .iter()
                .find(|&&i| self.nodes[i].account.name == segment)?;
            found = Some(next);
            level = &self.nodes[next].children;
        }

        found.map(|i| &self.nodes[i].account)
    }

    /// Depth-first walk from every root, children in name order.
    ///
    /// Accounts caught in a parent loop are unreachable and not visited.
    pub fn walk(&self) -> Vec<(usize, &Account)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
        while let Some((depth, i)) = stack.pop() {
            out.push((depth, &self.nodes[i].account));
            for &child in self.nodes[i].children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Every account below `id`, depth-first.
    pub fn descendants(&self, id: &Uuid) -> Vec<&Account> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[start].children.iter().rev().copied().collect();
        let mut seen = HashSet::new();
        while let Some(i) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            out.push(&self.nodes[i].account);
            stack.extend(self.nodes[i].children.iter().rev().copied());
        }
        out
    }
}

/// Follows `replaced_by` links between statements.
pub struct StatementChain;

impl StatementChain {
    /// The statement that currently stands in for `id`.
    ///
    /// # Errors
    ///
    /// - `TallyError::NotFound` if `id` or a link target is not in `statements`
    /// - `TallyError::Integrity` if the chain loops
    pub fn latest<'a>(statements: &'a [Statement], id: &Uuid) -> Result<&'a Statement> {
        let chain = Self::history(statements, id)?;
        chain
            .last()
            .copied()
            .ok_or_else(|| TallyError::NotFound(format!("statement {}", id)))
    }

    /// `id` followed by each newer replacement, oldest first.
    pub fn history<'a>(statements: &'a [Statement], id: &Uuid) -> Result<Vec<&'a Statement>> {
        let by_id: HashMap<Uuid, &Statement> = statements.iter().map(|s| (s.id, s)).collect();

        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = *id;
        loop {
            if !seen.insert(current) {
                return Err(TallyError::Integrity(format!(
                    "statement replacement chain from {} loops back to {}",
                    id, current
                )));
            }
            let statement = by_id
                .get(&current)
                .copied()
                .ok_or_else(|| TallyError::NotFound(format!("statement {}", current)))?;
            chain.push(statement);
            match statement.replaced_by {
                Some(next) => current = next,
                None => return Ok(chain),
            }
        }
    }

    /// Statements that `id` directly replaced.
    pub fn predecessors<'a>(statements: &'a [Statement], id: &Uuid) -> Vec<&'a Statement> {
        statements
            .iter()
            .filter(|s| s.replaced_by == Some(*id))
            .collect()
    }
}

/// Would marking `old` as replaced by `new` close a loop?
pub fn would_cycle(statements: &[Statement], old: &Uuid, new: &Uuid) -> bool {
    if old == new {
        return true;
    }
    let links: HashMap<Uuid, Option<Uuid>> =
        statements.iter().map(|s| (s.id, s.replaced_by)).collect();

    let mut seen = HashSet::new();
    let mut current = *new;
    while seen.insert(current) {
        if current == *old {
            return true;
        }
        match links.get(&current).copied().flatten() {
            Some(next) => current = next,
            None => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn account(name: &str, parent: Option<&Account>) -> Account {
        Account {
            id: Uuid::new_v4(),
            parent_id: parent.map(|p| p.id),
            name: name.to_string(),
            currency: "USD".to_string(),
            is_closed: false,
            created_at: Utc::now(),
            note: None,
        }
    }

    fn statement(replaced_by: Option<Uuid>) -> Statement {
        Statement {
            id: Uuid::new_v4(),
            institution: "Bank".to_string(),
            account_id: Uuid::new_v4(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            currency: "USD".to_string(),
            file_hash: Uuid::new_v4().simple().to_string(),
            file_size: 10,
            imported_at: Utc::now(),
            replaced_by,
        }
    }

    fn sample_tree() -> (AccountTree, Vec<Account>) {
        let assets = account("Assets", None);
        let liabilities = account("Liabilities", None);
        let bank = account("Bank", Some(&assets));
        let checking = account("Checking", Some(&bank));
        let savings = account("Savings", Some(&bank));
        let cash = account("Cash", Some(&assets));
        let accounts = vec![
            savings.clone(),
            liabilities.clone(),
            checking.clone(),
            cash.clone(),
            assets.clone(),
            bank.clone(),
        ];
        (
            AccountTree::build(accounts).unwrap(),
            vec![assets, bank, cash, checking, savings, liabilities],
        )
    }

    #[test]
    fn test_walk_is_depth_first_by_name() {
        let (tree, _) = sample_tree();
        let walked: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(depth, a)| (depth, a.name.as_str()))
            .collect();

        assert_eq!(
            walked,
            vec![
                (0, "Assets"),
                (1, "Bank"),
                (2, "Checking"),
                (2, "Savings"),
                (1, "Cash"),
                (0, "Liabilities"),
            ]
        );
    }

    #[test]
    fn test_path_and_find_by_path() {
        let (tree, accounts) = sample_tree();
        let checking = &accounts[3];

        assert_eq!(
            tree.path(&checking.id).as_deref(),
            Some("Assets:Bank:Checking")
        );
        assert_eq!(
            tree.find_by_path("Assets:Bank:Checking").map(|a| a.id),
            Some(checking.id)
        );
        assert_eq!(
            tree.find_by_path(" Assets : Cash ").map(|a| a.name.as_str()),
            Some("Cash")
        );
        assert!(tree.find_by_path("Bank:Checking").is_none());
        assert!(tree.find_by_path("Assets::Cash").is_none());
    }

    #[test]
    fn test_children_and_descendants() {
        let (tree, accounts) = sample_tree();
        let assets = &accounts[0];

        let children: Vec<&str> = tree
            .children(&assets.id)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(children, vec!["Bank", "Cash"]);
        assert_eq!(tree.descendants(&assets.id).len(), 4);
        assert!(tree.children(&Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_build_rejects_missing_parent() {
        let orphan = Account {
            parent_id: Some(Uuid::new_v4()),
            ..account("Orphan", None)
        };
        let err = AccountTree::build(vec![orphan]).unwrap_err();
        assert!(matches!(err, TallyError::Integrity(_)));
    }

    #[test]
    fn test_parent_loop_is_not_walked() {
        let mut a = account("A", None);
        let mut b = account("B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let (a_id, b_id) = (a.id, b.id);

        let tree = AccountTree::build(vec![a, b]).unwrap();
        assert!(tree.walk().is_empty());
        assert!(tree.path(&a_id).is_none());
        assert_eq!(tree.descendants(&b_id).len(), 2);
    }

    #[test]
    fn test_statement_chain_latest_and_history() {
        let newest = statement(None);
        let middle = statement(Some(newest.id));
        let oldest = statement(Some(middle.id));
        let statements = vec![newest.clone(), oldest.clone(), middle.clone()];

        let latest = StatementChain::latest(&statements, &oldest.id).unwrap();
        assert_eq!(latest.id, newest.id);

        let history: Vec<Uuid> = StatementChain::history(&statements, &oldest.id)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(history, vec![oldest.id, middle.id, newest.id]);

        let preds = StatementChain::predecessors(&statements, &newest.id);
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].id, middle.id);
    }

    #[test]
    fn test_statement_chain_detects_loop() {
        let mut a = statement(None);
        let mut b = statement(None);
        a.replaced_by = Some(b.id);
        b.replaced_by = Some(a.id);
        let statements = vec![a.clone(), b];

        let err = StatementChain::latest(&statements, &a.id).unwrap_err();
        assert!(matches!(err, TallyError::Integrity(_)));
    }

    #[test]
    fn test_would_cycle() {
        let newest = statement(None);
        let older = statement(Some(newest.id));
        let unrelated = statement(None);
        let statements = vec![newest.clone(), older.clone(), unrelated.clone()];

        assert!(would_cycle(&statements, &newest.id, &older.id));
        assert!(would_cycle(&statements, &unrelated.id, &unrelated.id));
        assert!(!would_cycle(&statements, &unrelated.id, &older.id));
    }
}
