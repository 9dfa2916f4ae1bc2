//! Client query cache and its invalidation table
//!
//! Clients may cache query results keyed by [`QueryKey`]. Every mutation
//! names the keys it makes stale through [`Mutation::invalidates`]; applying
//! a mutation to a [`QueryCache`] drops exactly those entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "camelCase")]
pub enum QueryKey {
    Routes,
    /// Vendors of one route, or of every route when `route_id` is `None`
    #[serde(rename_all = "camelCase")]
    Vendors { route_id: Option<Uuid> },
    Items,
    Bills,
    Bill { id: Uuid },
}

/// A write that can make cached reads stale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mutation", rename_all = "camelCase")]
pub enum Mutation {
    CreateRoute,
    #[serde(rename_all = "camelCase")]
    AddVendor { route_id: Uuid },
    CreateItem,
    UpdateItem { id: Uuid },
    DeleteItem { id: Uuid },
    CreateBill,
    DeleteBill { id: Uuid },
}

impl Mutation {
    /// Whether this mutation makes `key` stale
    pub fn invalidates(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (Mutation::CreateRoute, QueryKey::Routes) => true,
            (Mutation::AddVendor { route_id }, QueryKey::Vendors { route_id: cached }) => {
                cached.is_none() || *cached == Some(*route_id)
            }
            (Mutation::CreateItem, QueryKey::Items) => true,
            // Bill reads nest item details, and deletes cascade into lines
            (
                Mutation::UpdateItem { .. } | Mutation::DeleteItem { .. },
                QueryKey::Items | QueryKey::Bills | QueryKey::Bill { .. },
            ) => true,
            (Mutation::CreateBill, QueryKey::Bills) => true,
            (Mutation::DeleteBill { .. }, QueryKey::Bills) => true,
            (Mutation::DeleteBill { id }, QueryKey::Bill { id: cached }) => id == cached,
            _ => false,
        }
    }
}

/// Query results cached by key
#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, V>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: QueryKey, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry the mutation invalidates, returning the dropped keys
    pub fn apply(&mut self, mutation: &Mutation) -> Vec<QueryKey> {
        let stale: Vec<QueryKey> = self
            .entries
            .keys()
            .filter(|key| mutation.invalidates(key))
            .cloned()
            .collect();
        for key in &stale {
            self.entries.remove(key);
        }
        stale
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> QueryCache<u32> {
        let mut cache = QueryCache::new();
        cache.insert(QueryKey::Routes, 1);
        cache.insert(QueryKey::Vendors { route_id: None }, 2);
        cache.insert(QueryKey::Vendors { route_id: Some(Uuid::from_u128(1)) }, 3);
        cache.insert(QueryKey::Vendors { route_id: Some(Uuid::from_u128(2)) }, 4);
        cache.insert(QueryKey::Items, 5);
        cache.insert(QueryKey::Bills, 6);
        cache.insert(QueryKey::Bill { id: Uuid::from_u128(10) }, 7);
        cache.insert(QueryKey::Bill { id: Uuid::from_u128(11) }, 8);
        cache
    }

    #[test]
    fn test_create_bill_only_invalidates_bill_list() {
        let mut cache = filled();
        let dropped = cache.apply(&Mutation::CreateBill);
        assert_eq!(dropped, vec![QueryKey::Bills]);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn test_add_vendor_invalidates_its_route_and_all_vendors() {
        let mut cache = filled();
        cache.apply(&Mutation::AddVendor {
            route_id: Uuid::from_u128(1),
        });
        assert!(!cache.contains(&QueryKey::Vendors { route_id: None }));
        assert!(!cache.contains(&QueryKey::Vendors { route_id: Some(Uuid::from_u128(1)) }));
        assert!(cache.contains(&QueryKey::Vendors { route_id: Some(Uuid::from_u128(2)) }));
        assert!(cache.contains(&QueryKey::Routes));
    }

    #[test]
    fn test_delete_bill_drops_list_and_that_bill() {
        let mut cache = filled();
        cache.apply(&Mutation::DeleteBill {
            id: Uuid::from_u128(10),
        });
        assert!(!cache.contains(&QueryKey::Bills));
        assert!(!cache.contains(&QueryKey::Bill { id: Uuid::from_u128(10) }));
        assert!(cache.contains(&QueryKey::Bill { id: Uuid::from_u128(11) }));
    }

    #[test]
    fn test_item_changes_reach_bill_reads() {
        for mutation in [
            Mutation::UpdateItem { id: Uuid::from_u128(1) },
            Mutation::DeleteItem { id: Uuid::from_u128(1) },
        ] {
            let mut cache = filled();
            cache.apply(&mutation);
            assert!(!cache.contains(&QueryKey::Items));
            assert!(!cache.contains(&QueryKey::Bills));
            assert!(!cache.contains(&QueryKey::Bill { id: Uuid::from_u128(11) }));
            assert!(cache.contains(&QueryKey::Routes));
        }
    }

    #[test]
    fn test_create_route_and_item() {
        let mut cache = filled();
        assert_eq!(cache.apply(&Mutation::CreateRoute), vec![QueryKey::Routes]);
        assert_eq!(cache.apply(&Mutation::CreateItem), vec![QueryKey::Items]);
        assert_eq!(cache.len(), 6);
    }

    #[test]
    fn test_keys_round_trip_as_json() {
        let key: QueryKey =
            serde_json::from_str(r#"{"query":"vendors","routeId":null}"#).unwrap();
        assert_eq!(key, QueryKey::Vendors { route_id: None });
        let mutation: Mutation = serde_json::from_str(r#"{"mutation":"createBill"}"#).unwrap();
        assert_eq!(mutation, Mutation::CreateBill);
    }
}
