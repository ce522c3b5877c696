//! Fund directory: display name → fund identity and investment parameters.
//!
//! Built once from configuration and handed around by reference.

use crate::config::{AppConfig, FundEntry};
use crate::error::DirectoryError;
use crate::models::FundInfo;
use crate::scraper::cleaner::fund_key;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct FundDirectory {
    by_key: HashMap<String, FundInfo>,
    total: FundInfo,
}

fn to_info(e: &FundEntry) -> Result<FundInfo, DirectoryError> {
    if e.invested.is_nan() || e.invested <= 0.0 {
        return Err(DirectoryError::NonPositiveInvested {
            name: e.name.clone(),
            invested: e.invested,
        });
    }
    Ok(FundInfo {
        fund_id: e.id,
        name: e.name.clone(),
        invested: e.invested,
        allocated: e.allocated.clone(),
    })
}

impl FundDirectory {
    pub fn new(total: &FundEntry, funds: &[FundEntry]) -> Result<Self, DirectoryError> {
        let total = to_info(total)?;
        let mut ids = HashSet::from([total.fund_id]);
        let mut by_key = HashMap::with_capacity(funds.len());

        for e in funds {
            let info = to_info(e)?;
            if !ids.insert(info.fund_id) {
                return Err(DirectoryError::DuplicateId(info.fund_id));
            }
            if by_key.insert(fund_key(&e.name), info).is_some() {
                return Err(DirectoryError::DuplicateName(e.name.clone()));
            }
        }

        Ok(Self { by_key, total })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, DirectoryError> {
        Self::new(&cfg.total, &cfg.funds)
    }

    /// Looks a fund up by the name as rendered on the page. Whitespace is
    /// ignored because pages mix regular and non-breaking spaces.
    pub fn lookup(&self, name: &str) -> Option<&FundInfo> {
        self.by_key.get(&fund_key(name))
    }

    pub fn total(&self) -> &FundInfo {
        &self.total
    }

    /// Display name for an id, covering the total pseudo-fund as well.
    pub fn name_of(&self, fund_id: i64) -> Option<&str> {
        if fund_id == self.total.fund_id {
            return Some(&self.total.name);
        }
        self.by_key
            .values()
            .find(|f| f.fund_id == fund_id)
            .map(|f| f.name.as_str())
    }

    /// Funds sorted by id, total excluded.
    pub fn funds(&self) -> Vec<&FundInfo> {
        let mut v: Vec<&FundInfo> = self.by_key.values().collect();
        v.sort_by_key(|f| f.fund_id);
        v
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }
}
