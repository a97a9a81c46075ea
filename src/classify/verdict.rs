// src/classify/verdict.rs
//! Permissive reading of the model's `{"results":[...]}` reply.
//!
//! A reply without a `results` array is an error (the caller fails open).
//! Inside the array, each record is validated on its own and bad ones are dropped.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::config::env::parse_bool_token;

const MAX_REASON_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub index: usize,
    pub keep: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidVerdict {
    NotAnObject,
    MissingIndex,
    BadIndex,
    OutOfRange(usize),
    BadKeep,
}

/// One entry of `results` after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictRecord {
    Valid(Verdict),
    Invalid(InvalidVerdict),
}

impl VerdictRecord {
    pub fn validate(rec: &Value, batch_len: usize) -> Self {
        let Some(obj) = rec.as_object() else {
            return Self::Invalid(InvalidVerdict::NotAnObject);
        };
        let index = match obj.get("index") {
            None | Some(Value::Null) => return Self::Invalid(InvalidVerdict::MissingIndex),
            Some(v) => match read_index(v) {
                Some(i) => i,
                None => return Self::Invalid(InvalidVerdict::BadIndex),
            },
        };
        if index >= batch_len {
            return Self::Invalid(InvalidVerdict::OutOfRange(index));
        }
        // A record that says nothing about keeping is a drop.
        let keep = match obj.get("keep") {
            None | Some(Value::Null) => false,
            Some(v) => match read_keep(v) {
                Some(k) => k,
                None => return Self::Invalid(InvalidVerdict::BadKeep),
            },
        };
        let reason = obj
            .get("reason")
            .and_then(Value::as_str)
            .map(sanitize_reason)
            .filter(|r| !r.is_empty());

        Self::Valid(Verdict {
            index,
            keep,
            reason,
        })
    }

    pub fn valid(self) -> Option<Verdict> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Invalid(_) => None,
        }
    }
}

fn read_index(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|u| usize::try_from(u).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn read_keep(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => parse_bool_token(s),
        _ => None,
    }
}

/// Valid verdicts from a raw model reply. Records keep their reply order.
pub fn parse_verdicts(content: &str, batch_len: usize) -> Result<Vec<Verdict>> {
    let body = strip_code_fence(content);
    let data: Value = serde_json::from_str(body).context("classifier reply is not JSON")?;
    let results = data
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("classifier reply has no `results` array"))?;

    let mut out = Vec::with_capacity(results.len());
    for rec in results {
        match VerdictRecord::validate(rec, batch_len) {
            VerdictRecord::Valid(v) => out.push(v),
            VerdictRecord::Invalid(why) => {
                tracing::debug!(reason = ?why, record = %rec, "ignoring classifier record");
            }
        }
    }
    Ok(out)
}

fn strip_code_fence(s: &str) -> &str {
    let t = s.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Single line, collapsed whitespace, at most 160 chars.
pub fn sanitize_reason(input: &str) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_REASON_CHARS {
        collapsed.chars().take(MAX_REASON_CHARS).collect::<String>().trim_end().to_string()
    } else {
        collapsed
    }
}
