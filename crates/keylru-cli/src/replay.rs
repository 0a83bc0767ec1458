//! Executes script commands against a shared cache

use std::fmt;
use std::sync::Arc;

use keylru::{Cache, Keyed, StatsSnapshot};
use serde::Serialize;

use crate::script::Command;

/// Record stored by the CLI: an id plus an opaque value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub value: String,
}

impl Record {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

impl Keyed for Record {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Reply printed for one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Nil,
    Record(Record),
    Integer(usize),
    Records(Vec<Record>),
    Stats(StatsSnapshot),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Record(r) => write!(f, "{} = {}", r.id, r.value),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Records(records) if records.is_empty() => write!(f, "(empty)"),
            Reply::Records(records) => {
                for (i, r) in records.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {} = {}", i, r.id, r.value)?;
                }
                Ok(())
            }
            Reply::Stats(snapshot) => match serde_json::to_string(snapshot) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

fn record_or_nil(record: Option<Record>) -> Reply {
    record.map_or(Reply::Nil, Reply::Record)
}

/// Runs commands against one cache
pub struct Replayer {
    cache: Arc<Cache<Record>>,
}

impl Replayer {
    pub fn new(cache: Arc<Cache<Record>>) -> Self {
        Self { cache }
    }

    pub fn execute(&self, cmd: Command) -> Reply {
        match cmd {
            Command::Add { id, value } => {
                self.cache.add(Record::new(id, value));
                Reply::Ok
            }
            Command::Get(id) => record_or_nil(self.cache.get(&id)),
            Command::Peek(id) => record_or_nil(self.cache.peek(&id)),
            Command::Remove(id) => record_or_nil(self.cache.remove(&id)),
            Command::Head => record_or_nil(self.cache.peek_head()),
            Command::Tail => record_or_nil(self.cache.peek_tail()),
            Command::Size => Reply::Integer(self.cache.size()),
            Command::List => {
                let mut records = Vec::with_capacity(self.cache.size());
                self.cache.for_each(|r, _| records.push(r.clone()));
                Reply::Records(records)
            }
            Command::Clear => {
                self.cache.clear();
                Reply::Ok
            }
            Command::Stats => Reply::Stats(self.cache.stats().snapshot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn replay(capacity: usize, script: &str) -> Vec<String> {
        let cache = Arc::new(Cache::new(capacity).unwrap());
        let replayer = Replayer::new(cache);
        parse_script(script)
            .unwrap()
            .into_iter()
            .map(|(_, cmd)| replayer.execute(cmd).to_string())
            .collect()
    }

    #[test]
    fn test_replay_eviction_scenario() {
        let out = replay(
            2,
            "add A alpha\nadd B beta\nhead\ntail\nget A\nhead\ntail\nadd C gamma\nhead\ntail\nsize\nget B\n",
        );
        assert_eq!(
            out,
            vec![
                "OK", "OK", "B = beta", "A = alpha", "A = alpha", "A = alpha", "B = beta", "OK",
                "C = gamma", "A = alpha", "2", "(nil)",
            ]
        );
    }

    #[test]
    fn test_replay_list_and_remove() {
        let out = replay(3, "list\nadd a 1\nadd b 2\nlist\ndel a\nremove a\nlist\n");
        assert_eq!(out[0], "(empty)");
        assert_eq!(out[3], "0) b = 2\n1) a = 1");
        assert_eq!(out[4], "a = 1");
        assert_eq!(out[5], "(nil)");
        assert_eq!(out[6], "0) b = 2");
    }

    #[test]
    fn test_replay_stats_json() {
        let out = replay(2, "add a 1\nget a\nget z\nstats\nclear\nsize\n");
        let stats: serde_json::Value = serde_json::from_str(&out[3]).unwrap();
        assert_eq!(stats["hits"], 1);
        assert_eq!(stats["misses"], 1);
        assert_eq!(stats["inserts"], 1);
        assert_eq!(out[4], "OK");
        assert_eq!(out[5], "0");
    }
}
