//! Allocation tables in the JSON shape used to publish airdrop roots:
//!
//! ```text
//! {
//!     "0x96c7...b065": {
//!         "private_allocation": "1000000000",
//!         "public_allocation": "1000000000"
//!     },
//!     ...
//! }
//! ```
//!
//! Key order is kept, it decides leaf positions. Amounts may be decimal
//! strings or JSON integers.

use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};

use crate::digest::Digest;
use crate::error::{Error, FormatError, Result};
use crate::merkle::TreeConfig;
use crate::proof::Proof;
use crate::record::{encode_leaf, parse_amount, Address, AllocationRecord};
use crate::AllocationTree;

/// Ordered allocation records with an account index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationTable {
    records: Vec<AllocationRecord>,
    index: HashMap<Address, usize>,
}

impl AllocationTable {
    /// Creates a table from records in leaf order. A repeated account keeps
    /// every record, lookups by account return the first one.
    pub fn new(records: Vec<AllocationRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            index.entry(r.account).or_insert(i);
        }
        AllocationTable { records, index }
    }

    /// Parses a JSON object mapping hex accounts to their allocations.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| FormatError::Record(format!("invalid JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// See [`AllocationTable::from_json_str`].
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| FormatError::Record("allocation table must be a JSON object".into()))?;

        let records = entries
            .iter()
            .map(|(account, allocs)| parse_entry(account, allocs))
            .collect::<std::result::Result<Vec<_>, FormatError>>()?;

        debug!("parsed allocation table with {} records", records.len());
        Ok(Self::new(records))
    }

    /// Records in leaf order.
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record of `account`.
    pub fn get(&self, account: &Address) -> Option<&AllocationRecord> {
        self.position_of(account).map(|i| &self.records[i])
    }

    /// Input position of `account`.
    pub fn position_of(&self, account: &Address) -> Option<usize> {
        self.index.get(account).copied()
    }

    /// Leaf digests in record order.
    pub fn leaves(&self) -> Vec<Digest> {
        self.records.iter().map(encode_leaf).collect()
    }

    /// Builds the tree with default options.
    pub fn build(&self) -> Result<AllocationTree> {
        self.build_with_config(TreeConfig::default())
    }

    /// Builds the tree.
    pub fn build_with_config(&self, config: TreeConfig) -> Result<AllocationTree> {
        AllocationTree::new_with_config(self.leaves(), config)
    }

    /// Proof for `account` in `tree`, which must have been built from this
    /// table. Works for sorted trees too since the lookup goes through the
    /// leaf digest.
    pub fn proof_for(&self, tree: &AllocationTree, account: &Address) -> Result<Proof<Digest>> {
        let record = self.get(account).ok_or_else(|| Error::AccountNotFound {
            account: hex::encode(account.as_bytes()),
        })?;
        tree.gen_proof_for_leaf(&encode_leaf(record))
    }
}

impl From<Vec<AllocationRecord>> for AllocationTable {
    fn from(records: Vec<AllocationRecord>) -> Self {
        AllocationTable::new(records)
    }
}

fn parse_entry(account: &str, allocs: &Value) -> std::result::Result<AllocationRecord, FormatError> {
    let fields: &Map<String, Value> = allocs
        .as_object()
        .ok_or_else(|| FormatError::Record(format!("allocations of {} must be an object", account)))?;

    Ok(AllocationRecord {
        account: account.parse()?,
        private_allocation: amount_field(account, fields, "private_allocation")?,
        public_allocation: amount_field(account, fields, "public_allocation")?,
    })
}

fn amount_field(
    account: &str,
    fields: &Map<String, Value>,
    name: &str,
) -> std::result::Result<u64, FormatError> {
    match fields.get(name) {
        Some(Value::String(s)) => parse_amount(s),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| FormatError::Amount(n.to_string())),
        Some(other) => Err(FormatError::Amount(other.to_string())),
        None => Err(FormatError::Record(format!("{} is missing {}", account, name))),
    }
}
