//! Testing utilities for siftr
//!
//! Sample record types shaped like the selection-list payloads the engine
//! typically fronts, plus helpers for settling asynchronous commits.
//!
//! Only available when compiled with `cfg(test)`.

use chrono::NaiveDate;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::engine::FilterEngine;
use crate::fields::{FieldSet, FieldSource};

/// An account record with nested sites, as a selection modal would fetch it
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAccount {
    pub id: String,
    pub name: String,
    pub notes: String,
    pub balance: f64,
    pub opened: NaiveDate,
    pub sites: Vec<SampleSite>,
}

/// A nested location record, searchable through its parent account
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSite {
    pub name: String,
    pub code: String,
}

impl FieldSource for SampleAccount {
    fn collect_fields(&self, out: &mut FieldSet) {
        out.push_text("id", self.id.as_str());
        out.push_text("name", self.name.as_str());
        out.push_text("notes", self.notes.as_str());
        out.push_number("balance", self.balance);
        out.push_date("opened", self.opened);
        for site in &self.sites {
            out.push_text("sites.name", site.name.as_str());
            out.push_text("sites.code", site.code.as_str());
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Four accounts with overlapping and distinct searchable terms
#[must_use]
pub fn sample_accounts() -> Vec<SampleAccount> {
    vec![
        SampleAccount {
            id: "A1".to_string(),
            name: "Arendal Fisk".to_string(),
            notes: "north region".to_string(),
            balance: 2500.0,
            opened: date(2023, 5, 12),
            sites: vec![
                SampleSite {
                    name: "North Harbor".to_string(),
                    code: "NH-1".to_string(),
                },
                SampleSite {
                    name: "Cold Store".to_string(),
                    code: "CS-2".to_string(),
                },
            ],
        },
        SampleAccount {
            id: "B2".to_string(),
            name: "Bergen Verft".to_string(),
            notes: "south region".to_string(),
            balance: 800.0,
            opened: date(2024, 1, 3),
            sites: vec![SampleSite {
                name: "South Quay".to_string(),
                code: "SQ-1".to_string(),
            }],
        },
        SampleAccount {
            id: "C3".to_string(),
            name: "Drammen Industri".to_string(),
            notes: "pending review".to_string(),
            balance: 120.5,
            opened: date(2024, 11, 20),
            sites: Vec::new(),
        },
        SampleAccount {
            id: "D4".to_string(),
            name: "Norheim Bygg".to_string(),
            notes: "closed last year".to_string(),
            balance: 0.0,
            opened: date(2022, 8, 30),
            sites: vec![SampleSite {
                name: "Depot West".to_string(),
                code: "DW-7".to_string(),
            }],
        },
    ]
}

/// A configuration with a short debounce window, for fast tests
#[must_use]
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        debounce_ms: 20,
        ..EngineConfig::default()
    }
}

/// Block until the engine has committed the most recent query
///
/// Sleeps past the debounce window, then waits for the busy flag to clear.
///
/// # Panics
/// Panics if the engine has not settled within two seconds.
pub fn settle<T>(engine: &FilterEngine<T>, config: &EngineConfig)
where
    T: FieldSource + Clone + Send + Sync + 'static,
{
    std::thread::sleep(config.debounce() + Duration::from_millis(150));
    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.is_busy() {
        assert!(Instant::now() < deadline, "engine did not settle in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_accounts_have_distinct_ids() {
        let accounts = sample_accounts();
        let mut ids: Vec<_> = accounts.iter().map(|a| a.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), accounts.len());
    }

    #[test]
    fn test_sample_account_fields_include_nested_sites() {
        let accounts = sample_accounts();
        let mut fields = FieldSet::new();
        accounts[0].collect_fields(&mut fields);
        assert_eq!(fields.values_named("sites.name").count(), 2);
        assert!(fields.values_named("balance").next().is_some());
    }
}
