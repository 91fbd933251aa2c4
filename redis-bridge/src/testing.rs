//! In-memory transport for tests, demos and benchmarks
//!
//! [`MemoryBackend`] evaluates a useful subset of the command surface against
//! process-local state and implements the transport boundary of both driver
//! back-ends, so the whole layer can be exercised without a server. Replies
//! are produced in a neutral shape and lowered to whichever reply model the
//! driver asks for.

use crate::driver::{Resp2Reply, Resp2Transport, Resp3Reply, Resp3Transport};
use bytes::Bytes;
use redis_bridge_core::{CommandFrame, DriverResult, StreamId};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Backend reply before lowering to a driver's native shape
#[derive(Debug, Clone)]
enum Reply {
    Ok,
    Simple(String),
    Error(String),
    Int(i64),
    Bulk(Bytes),
    Nil,
    Array(Vec<Reply>),
    Pairs(Vec<(Reply, Reply)>),
}

impl Reply {
    fn bulk(data: impl AsRef<[u8]>) -> Self {
        Self::Bulk(Bytes::copy_from_slice(data.as_ref()))
    }

    fn into_resp2(self) -> Resp2Reply {
        match self {
            Self::Ok => Resp2Reply::Simple("OK".to_string()),
            Self::Simple(s) => Resp2Reply::Simple(s),
            Self::Error(e) => Resp2Reply::Error(e),
            Self::Int(i) => Resp2Reply::Integer(i),
            Self::Bulk(b) => Resp2Reply::Bulk(b),
            Self::Nil => Resp2Reply::Nil,
            Self::Array(items) => {
                Resp2Reply::Array(items.into_iter().map(Reply::into_resp2).collect())
            }
            // The flat model has no map shape; pairs flatten.
            Self::Pairs(pairs) => Resp2Reply::Array(
                pairs
                    .into_iter()
                    .flat_map(|(k, v)| [k.into_resp2(), v.into_resp2()])
                    .collect(),
            ),
        }
    }

    fn into_resp3(self) -> Resp3Reply {
        match self {
            Self::Ok => Resp3Reply::Simple("OK".to_string()),
            Self::Simple(s) => Resp3Reply::Simple(s),
            Self::Error(e) => Resp3Reply::Error(e),
            Self::Int(i) => Resp3Reply::Integer(i),
            Self::Bulk(b) => Resp3Reply::Bulk(b),
            Self::Nil => Resp3Reply::Nil,
            Self::Array(items) => {
                Resp3Reply::Array(items.into_iter().map(Reply::into_resp3).collect())
            }
            Self::Pairs(pairs) => Resp3Reply::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_resp3(), v.into_resp3()))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
enum Data {
    Str(Bytes),
    Hash(BTreeMap<Vec<u8>, Bytes>),
    Set(BTreeSet<Vec<u8>>),
    List(VecDeque<Bytes>),
    SortedSet(BTreeMap<Vec<u8>, f64>),
    Stream(Vec<(StreamId, Vec<(Bytes, Bytes)>)>),
}

impl Data {
    fn kind_token(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Hash(_) => "hash",
            Self::Set(_) => "set",
            Self::List(_) => "list",
            Self::SortedSet(_) => "zset",
            Self::Stream(_) => "stream",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    data: Data,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(data: Data) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }
}

/// Process-local store speaking both transport boundaries
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<Vec<u8>, Entry>,
    stream_clock: u64,
}

type Eval = Result<Reply, Reply>;

fn wrongtype() -> Reply {
    Reply::Error(
        "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
    )
}

fn wrong_arity(name: &str) -> Reply {
    Reply::Error(format!(
        "ERR wrong number of arguments for '{}' command",
        name.to_lowercase()
    ))
}

fn not_an_integer() -> Reply {
    Reply::Error("ERR value is not an integer or out of range".to_string())
}

fn parse_int(raw: &[u8]) -> Result<i64, Reply> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(not_an_integer)
}

fn parse_float(raw: &[u8]) -> Result<f64, Reply> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Reply::Error("ERR value is not a valid float".to_string()))
}

/// Normalize a `[start, stop]` index pair with negative-from-end semantics
fn index_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let clamp = |i: i64| {
        if i < 0 {
            (len + i).max(0)
        } else {
            i.min(len - 1)
        }
    };
    if len == 0 {
        return None;
    }
    let start = clamp(start);
    let stop = clamp(stop);
    if start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

impl MemoryBackend {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|e| e.expires_at.map_or(true, |deadline| deadline > now))
            .count()
    }

    /// Check if the store holds no live keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&mut self, key: &[u8]) -> Option<&mut Entry> {
        if let Some(entry) = self.entries.get(key) {
            if let Some(deadline) = entry.expires_at {
                if deadline <= Instant::now() {
                    self.entries.remove(key);
                    return None;
                }
            }
        }
        self.entries.get_mut(key)
    }

    fn eval(&mut self, frame: &CommandFrame) -> Reply {
        match self.dispatch(frame) {
            Ok(reply) | Err(reply) => reply,
        }
    }

    /// Get-or-create the entry at `key`, after purging an expired one
    fn ensure(&mut self, key: &[u8], empty: impl FnOnce() -> Data) -> &mut Data {
        let _ = self.entry(key);
        &mut self
            .entries
            .entry(key.to_vec())
            .or_insert_with(|| Entry::new(empty()))
            .data
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, frame: &CommandFrame) -> Eval {
        let args = frame.arg_slice();
        let arg = |i: usize| args.get(i).ok_or_else(|| wrong_arity(frame.name()));
        match frame.name() {
            "PING" => Ok(Reply::Simple("PONG".to_string())),
            "ECHO" => Ok(Reply::Bulk(arg(0)?.clone())),
            "SET" => {
                let key = arg(0)?.to_vec();
                let value = arg(1)?.clone();
                let mut entry = Entry::new(Data::Str(value));
                if args.len() >= 4 && args[2].eq_ignore_ascii_case(b"EX") {
                    let secs = parse_int(&args[3])?;
                    entry.expires_at = Some(Instant::now() + Duration::from_secs(secs.max(0) as u64));
                }
                self.entries.insert(key, entry);
                Ok(Reply::Ok)
            }
            "SETNX" => {
                let key = arg(0)?.to_vec();
                let value = arg(1)?.clone();
                if self.entry(&key).is_some() {
                    return Ok(Reply::Int(0));
                }
                self.entries.insert(key, Entry::new(Data::Str(value)));
                Ok(Reply::Int(1))
            }
            "GET" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Str(v), .. }) => Ok(Reply::Bulk(v.clone())),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "MGET" => {
                let mut out = Vec::with_capacity(args.len());
                for key in args {
                    let key = key.clone();
                    out.push(match self.entry(&key) {
                        Some(Entry { data: Data::Str(v), .. }) => Reply::Bulk(v.clone()),
                        _ => Reply::Nil,
                    });
                }
                Ok(Reply::Array(out))
            }
            "APPEND" => {
                let key = arg(0)?.to_vec();
                let suffix = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Str(v), .. }) => {
                        let mut joined = v.to_vec();
                        joined.extend_from_slice(&suffix);
                        let len = joined.len() as i64;
                        *v = Bytes::from(joined);
                        Ok(Reply::Int(len))
                    }
                    Some(_) => Err(wrongtype()),
                    None => {
                        let len = suffix.len() as i64;
                        self.entries.insert(key, Entry::new(Data::Str(suffix)));
                        Ok(Reply::Int(len))
                    }
                }
            }
            "STRLEN" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Str(v), .. }) => Ok(Reply::Int(v.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "INCR" => self.incr_by(arg(0)?.clone(), 1),
            "DECR" => self.incr_by(arg(0)?.clone(), -1),
            "INCRBY" => {
                let delta = parse_int(arg(1)?)?;
                self.incr_by(arg(0)?.clone(), delta)
            }
            "DEL" => {
                let mut removed = 0;
                for key in args {
                    let key = key.clone();
                    if self.entry(&key).is_some() && self.entries.remove(key.as_ref()).is_some() {
                        removed += 1;
                    }
                }
                Ok(Reply::Int(removed))
            }
            "EXISTS" => {
                let key = arg(0)?.clone();
                Ok(Reply::Int(i64::from(self.entry(&key).is_some())))
            }
            "EXPIRE" => {
                let key = arg(0)?.clone();
                let secs = parse_int(arg(1)?)?;
                match self.entry(&key) {
                    Some(entry) => {
                        entry.expires_at =
                            Some(Instant::now() + Duration::from_secs(secs.max(0) as u64));
                        Ok(Reply::Int(1))
                    }
                    None => Ok(Reply::Int(0)),
                }
            }
            "TTL" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    None => Ok(Reply::Int(-2)),
                    Some(Entry { expires_at: None, .. }) => Ok(Reply::Int(-1)),
                    Some(Entry { expires_at: Some(deadline), .. }) => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        Ok(Reply::Int(remaining.as_secs() as i64))
                    }
                }
            }
            "PERSIST" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(entry) if entry.expires_at.is_some() => {
                        entry.expires_at = None;
                        Ok(Reply::Int(1))
                    }
                    _ => Ok(Reply::Int(0)),
                }
            }
            "TYPE" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(entry) => Ok(Reply::Simple(entry.data.kind_token().to_string())),
                    None => Ok(Reply::Simple("none".to_string())),
                }
            }
            "RENAME" => {
                let key = arg(0)?.clone();
                let target = arg(1)?.to_vec();
                if self.entry(&key).is_none() {
                    return Err(Reply::Error("ERR no such key".to_string()));
                }
                if let Some(entry) = self.entries.remove(key.as_ref()) {
                    self.entries.insert(target, entry);
                }
                Ok(Reply::Ok)
            }
            "MOVE" => {
                // Single logical database here; report the key as kept.
                let key = arg(0)?.clone();
                Ok(Reply::Int(i64::from(self.entry(&key).is_some())))
            }
            "HSET" => {
                let key = arg(0)?.to_vec();
                if args.len() < 3 || args.len() % 2 == 0 {
                    return Err(wrong_arity("HSET"));
                }
                let Data::Hash(hash) = self.ensure(&key, || Data::Hash(BTreeMap::new())) else {
                    return Err(wrongtype());
                };
                let mut created = 0;
                for pair in args[1..].chunks_exact(2) {
                    if hash.insert(pair[0].to_vec(), pair[1].clone()).is_none() {
                        created += 1;
                    }
                }
                Ok(Reply::Int(created))
            }
            "HGET" => {
                let key = arg(0)?.clone();
                let field = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => Ok(h
                        .get(field.as_ref())
                        .map_or(Reply::Nil, |v| Reply::Bulk(v.clone()))),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "HDEL" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => {
                        let mut removed = 0;
                        for field in &args[1..] {
                            if h.remove(field.as_ref()).is_some() {
                                removed += 1;
                            }
                        }
                        Ok(Reply::Int(removed))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "HGETALL" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => Ok(Reply::Pairs(
                        h.iter()
                            .map(|(f, v)| (Reply::bulk(f), Reply::Bulk(v.clone())))
                            .collect(),
                    )),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Pairs(Vec::new())),
                }
            }
            "HLEN" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => Ok(Reply::Int(h.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "HMGET" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => Ok(Reply::Array(
                        args[1..]
                            .iter()
                            .map(|f| {
                                h.get(f.as_ref())
                                    .map_or(Reply::Nil, |v| Reply::Bulk(v.clone()))
                            })
                            .collect(),
                    )),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Array(args[1..].iter().map(|_| Reply::Nil).collect())),
                }
            }
            "HEXISTS" => {
                let key = arg(0)?.clone();
                let field = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Hash(h), .. }) => {
                        Ok(Reply::Int(i64::from(h.contains_key(field.as_ref()))))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "SADD" => {
                let key = arg(0)?.to_vec();
                let Data::Set(set) = self.ensure(&key, || Data::Set(BTreeSet::new())) else {
                    return Err(wrongtype());
                };
                let mut added = 0;
                for member in &args[1..] {
                    if set.insert(member.to_vec()) {
                        added += 1;
                    }
                }
                Ok(Reply::Int(added))
            }
            "SREM" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Set(s), .. }) => {
                        let mut removed = 0;
                        for member in &args[1..] {
                            if s.remove(member.as_ref()) {
                                removed += 1;
                            }
                        }
                        Ok(Reply::Int(removed))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "SCARD" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Set(s), .. }) => Ok(Reply::Int(s.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "SISMEMBER" => {
                let key = arg(0)?.clone();
                let member = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Set(s), .. }) => {
                        Ok(Reply::Int(i64::from(s.contains(member.as_ref()))))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "SMEMBERS" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Set(s), .. }) => {
                        Ok(Reply::Array(s.iter().map(Reply::bulk).collect()))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Array(Vec::new())),
                }
            }
            "LPUSH" | "RPUSH" => {
                let head = frame.name() == "LPUSH";
                let key = arg(0)?.to_vec();
                let Data::List(list) = self.ensure(&key, || Data::List(VecDeque::new())) else {
                    return Err(wrongtype());
                };
                for value in &args[1..] {
                    if head {
                        list.push_front(value.clone());
                    } else {
                        list.push_back(value.clone());
                    }
                }
                Ok(Reply::Int(list.len() as i64))
            }
            "LPOP" | "RPOP" => {
                let head = frame.name() == "LPOP";
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::List(l), .. }) => {
                        let popped = if head { l.pop_front() } else { l.pop_back() };
                        Ok(popped.map_or(Reply::Nil, Reply::Bulk))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "BLPOP" => {
                // No waiting here: pop immediately or report the timeout as Nil.
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::List(l), .. }) => {
                        Ok(l.pop_front().map_or(Reply::Nil, |value| {
                            Reply::Array(vec![Reply::Bulk(key.clone()), Reply::Bulk(value)])
                        }))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "LLEN" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::List(l), .. }) => Ok(Reply::Int(l.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "LRANGE" => {
                let key = arg(0)?.clone();
                let start = parse_int(arg(1)?)?;
                let stop = parse_int(arg(2)?)?;
                match self.entry(&key) {
                    Some(Entry { data: Data::List(l), .. }) => {
                        let Some((start, stop)) = index_range(l.len(), start, stop) else {
                            return Ok(Reply::Array(Vec::new()));
                        };
                        Ok(Reply::Array(
                            l.iter()
                                .skip(start)
                                .take(stop - start + 1)
                                .map(|v| Reply::Bulk(v.clone()))
                                .collect(),
                        ))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Array(Vec::new())),
                }
            }
            "ZADD" => {
                let key = arg(0)?.to_vec();
                if args.len() < 3 || args.len() % 2 == 0 {
                    return Err(wrong_arity("ZADD"));
                }
                let mut scored = Vec::new();
                for pair in args[1..].chunks_exact(2) {
                    scored.push((parse_float(&pair[0])?, pair[1].to_vec()));
                }
                let Data::SortedSet(zset) = self.ensure(&key, || Data::SortedSet(BTreeMap::new()))
                else {
                    return Err(wrongtype());
                };
                let mut added = 0;
                for (score, member) in scored {
                    if zset.insert(member, score).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Int(added))
            }
            "ZSCORE" => {
                let key = arg(0)?.clone();
                let member = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::SortedSet(z), .. }) => Ok(z
                        .get(member.as_ref())
                        .map_or(Reply::Nil, |score| Reply::bulk(score.to_string()))),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "ZINCRBY" => {
                let key = arg(0)?.to_vec();
                let delta = parse_float(arg(1)?)?;
                let member = arg(2)?.to_vec();
                let Data::SortedSet(zset) = self.ensure(&key, || Data::SortedSet(BTreeMap::new()))
                else {
                    return Err(wrongtype());
                };
                let score = zset.entry(member).or_insert(0.0);
                *score += delta;
                Ok(Reply::bulk(score.to_string()))
            }
            "ZCARD" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::SortedSet(z), .. }) => Ok(Reply::Int(z.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "ZRANK" => {
                let key = arg(0)?.clone();
                let member = arg(1)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::SortedSet(z), .. }) => {
                        let ranked = ranked_members(z);
                        Ok(ranked
                            .iter()
                            .position(|(m, _)| m.as_slice() == member.as_ref())
                            .map_or(Reply::Nil, |rank| Reply::Int(rank as i64)))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Nil),
                }
            }
            "ZRANGE" => {
                let key = arg(0)?.clone();
                let start = parse_int(arg(1)?)?;
                let stop = parse_int(arg(2)?)?;
                let with_scores = args
                    .get(3)
                    .is_some_and(|a| a.eq_ignore_ascii_case(b"WITHSCORES"));
                match self.entry(&key) {
                    Some(Entry { data: Data::SortedSet(z), .. }) => {
                        let ranked = ranked_members(z);
                        let Some((start, stop)) = index_range(ranked.len(), start, stop) else {
                            return Ok(Reply::Array(Vec::new()));
                        };
                        let mut out = Vec::new();
                        for (member, score) in &ranked[start..=stop] {
                            out.push(Reply::bulk(member));
                            if with_scores {
                                out.push(Reply::bulk(score.to_string()));
                            }
                        }
                        Ok(Reply::Array(out))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Array(Vec::new())),
                }
            }
            "XADD" => {
                let key = arg(0)?.to_vec();
                if args.len() < 4 || args.len() % 2 != 0 {
                    return Err(wrong_arity("XADD"));
                }
                self.stream_clock += 1;
                let id = StreamId::new(self.stream_clock, 0);
                let fields: Vec<(Bytes, Bytes)> = args[2..]
                    .chunks_exact(2)
                    .map(|pair| (pair[0].clone(), pair[1].clone()))
                    .collect();
                let Data::Stream(stream) = self.ensure(&key, || Data::Stream(Vec::new())) else {
                    return Err(wrongtype());
                };
                stream.push((id, fields));
                Ok(Reply::bulk(id.to_string()))
            }
            "XLEN" => {
                let key = arg(0)?.clone();
                match self.entry(&key) {
                    Some(Entry { data: Data::Stream(s), .. }) => Ok(Reply::Int(s.len() as i64)),
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Int(0)),
                }
            }
            "XRANGE" => {
                let key = arg(0)?.clone();
                let start = parse_stream_bound(arg(1)?, StreamId::new(0, 0))?;
                let end = parse_stream_bound(arg(2)?, StreamId::new(u64::MAX, u64::MAX))?;
                let count = match args.get(3) {
                    Some(token) if token.eq_ignore_ascii_case(b"COUNT") => {
                        Some(parse_int(arg(4)?)? as usize)
                    }
                    _ => None,
                };
                match self.entry(&key) {
                    Some(Entry { data: Data::Stream(s), .. }) => {
                        let mut out = Vec::new();
                        for (id, fields) in s {
                            if *id < start || *id > end {
                                continue;
                            }
                            if count.is_some_and(|limit| out.len() >= limit) {
                                break;
                            }
                            let body: Vec<Reply> = fields
                                .iter()
                                .flat_map(|(f, v)| [Reply::Bulk(f.clone()), Reply::Bulk(v.clone())])
                                .collect();
                            out.push(Reply::Array(vec![
                                Reply::bulk(id.to_string()),
                                Reply::Array(body),
                            ]));
                        }
                        Ok(Reply::Array(out))
                    }
                    Some(_) => Err(wrongtype()),
                    None => Ok(Reply::Array(Vec::new())),
                }
            }
            "DBSIZE" => Ok(Reply::Int(self.len() as i64)),
            "FLUSHDB" => {
                self.entries.clear();
                Ok(Reply::Ok)
            }
            "TIME" => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default();
                Ok(Reply::Array(vec![
                    Reply::bulk(now.as_secs().to_string()),
                    Reply::bulk(now.subsec_micros().to_string()),
                ]))
            }
            "INFO" => Ok(Reply::bulk(
                "# Server\r\nredis_version:7.2.0\r\nredis_mode:standalone\r\n",
            )),
            "CONFIG" => match args.first() {
                Some(sub) if sub.eq_ignore_ascii_case(b"GET") => Ok(Reply::Array(vec![
                    Reply::bulk("maxmemory"),
                    Reply::bulk("0"),
                ])),
                _ => Err(unknown_command(frame)),
            },
            "PUBLISH" => Ok(Reply::Int(0)),
            "PUBSUB" => match args.first() {
                Some(sub) if sub.eq_ignore_ascii_case(b"CHANNELS") => {
                    Ok(Reply::Array(Vec::new()))
                }
                Some(sub) if sub.eq_ignore_ascii_case(b"NUMSUB") => Ok(Reply::Array(
                    args[1..]
                        .iter()
                        .flat_map(|channel| [Reply::Bulk(channel.clone()), Reply::Int(0)])
                        .collect(),
                )),
                _ => Err(unknown_command(frame)),
            },
            "WATCH" | "UNWATCH" => Ok(Reply::Ok),
            "ACL" => match args.first() {
                Some(sub) if sub.eq_ignore_ascii_case(b"WHOAMI") => Ok(Reply::bulk("default")),
                Some(sub) if sub.eq_ignore_ascii_case(b"LIST") => Ok(Reply::Array(vec![
                    Reply::bulk("user default on nopass ~* &* +@all"),
                ])),
                Some(sub) if sub.eq_ignore_ascii_case(b"CAT") => Ok(Reply::Array(
                    ["read", "write", "keyspace", "admin"]
                        .iter()
                        .map(Reply::bulk)
                        .collect(),
                )),
                _ => Err(unknown_command(frame)),
            },
            _ => Err(unknown_command(frame)),
        }
    }

    fn incr_by(&mut self, key: Bytes, delta: i64) -> Eval {
        match self.entry(&key) {
            Some(Entry { data: Data::Str(v), .. }) => {
                let current = parse_int(v)?;
                let next = current
                    .checked_add(delta)
                    .ok_or_else(not_an_integer)?;
                *v = Bytes::from(next.to_string().into_bytes());
                Ok(Reply::Int(next))
            }
            Some(_) => Err(wrongtype()),
            None => {
                self.entries.insert(
                    key.to_vec(),
                    Entry::new(Data::Str(Bytes::from(delta.to_string().into_bytes()))),
                );
                Ok(Reply::Int(delta))
            }
        }
    }
}

fn unknown_command(frame: &CommandFrame) -> Reply {
    Reply::Error(format!(
        "ERR unknown command '{}'",
        frame.name().to_lowercase()
    ))
}

fn parse_stream_bound(raw: &Bytes, open: StreamId) -> Result<StreamId, Reply> {
    match raw.as_ref() {
        b"-" | b"+" => Ok(open),
        other => std::str::from_utf8(other)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Reply::Error("ERR Invalid stream ID specified".to_string())),
    }
}

/// Members ordered by (score, member), the rank order of the real store
fn ranked_members(zset: &BTreeMap<Vec<u8>, f64>) -> Vec<(Vec<u8>, f64)> {
    let mut ranked: Vec<(Vec<u8>, f64)> =
        zset.iter().map(|(m, s)| (m.clone(), *s)).collect();
    ranked.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

impl Resp2Transport for MemoryBackend {
    fn exchange(&mut self, frame: &CommandFrame) -> DriverResult<Resp2Reply> {
        Ok(self.eval(frame).into_resp2())
    }

    fn exchange_batch(&mut self, frames: &[CommandFrame]) -> DriverResult<Vec<Resp2Reply>> {
        Ok(frames
            .iter()
            .map(|frame| self.eval(frame).into_resp2())
            .collect())
    }
}

impl Resp3Transport for MemoryBackend {
    fn exchange(&mut self, frame: &CommandFrame) -> DriverResult<Resp3Reply> {
        Ok(self.eval(frame).into_resp3())
    }

    fn exchange_batch(&mut self, frames: &[CommandFrame]) -> DriverResult<Vec<Resp3Reply>> {
        Ok(frames
            .iter()
            .map(|frame| self.eval(frame).into_resp3())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval2(backend: &mut MemoryBackend, frame: CommandFrame) -> Resp2Reply {
        Resp2Transport::exchange(backend, &frame).expect("memory backend is infallible")
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut backend = MemoryBackend::new();
        eval2(&mut backend, CommandFrame::new("SET").arg("k").arg("v"));
        let reply = eval2(&mut backend, CommandFrame::new("GET").arg("k"));
        assert_eq!(reply, Resp2Reply::Bulk(Bytes::from_static(b"v")));
    }

    #[test]
    fn incr_creates_and_counts() {
        let mut backend = MemoryBackend::new();
        assert_eq!(
            eval2(&mut backend, CommandFrame::new("INCR").arg("n")),
            Resp2Reply::Integer(1)
        );
        assert_eq!(
            eval2(&mut backend, CommandFrame::new("INCRBY").arg("n").arg_int(9)),
            Resp2Reply::Integer(10)
        );
    }

    #[test]
    fn wrongtype_is_a_server_error() {
        let mut backend = MemoryBackend::new();
        eval2(&mut backend, CommandFrame::new("LPUSH").arg("l").arg("x"));
        let reply = eval2(&mut backend, CommandFrame::new("GET").arg("l"));
        assert!(matches!(reply, Resp2Reply::Error(ref e) if e.starts_with("WRONGTYPE")));
    }

    #[test]
    fn blpop_pops_immediately_and_names_the_source() {
        let mut backend = MemoryBackend::new();
        eval2(&mut backend, CommandFrame::new("RPUSH").arg("q").arg("job"));
        let reply = eval2(&mut backend, CommandFrame::new("BLPOP").arg("q").arg_int(1));
        assert_eq!(
            reply,
            Resp2Reply::Array(vec![
                Resp2Reply::Bulk(Bytes::from_static(b"q")),
                Resp2Reply::Bulk(Bytes::from_static(b"job")),
            ])
        );
        assert_eq!(
            eval2(&mut backend, CommandFrame::new("BLPOP").arg("q").arg_int(1)),
            Resp2Reply::Nil
        );
    }

    #[test]
    fn hgetall_is_a_map_under_the_extended_model() {
        let mut backend = MemoryBackend::new();
        let set = CommandFrame::new("HSET").arg("h").arg("f").arg("v");
        let _ = Resp3Transport::exchange(&mut backend, &set).expect("infallible");
        let reply = Resp3Transport::exchange(&mut backend, &CommandFrame::new("HGETALL").arg("h"))
            .expect("infallible");
        assert!(matches!(reply, Resp3Reply::Map(ref pairs) if pairs.len() == 1));
    }

    #[test]
    fn zrange_orders_by_score_then_member() {
        let mut backend = MemoryBackend::new();
        eval2(
            &mut backend,
            CommandFrame::new("ZADD")
                .arg("z")
                .arg_float(2.0)
                .arg("b")
                .arg_float(1.0)
                .arg("c")
                .arg_float(2.0)
                .arg("a"),
        );
        let reply = eval2(
            &mut backend,
            CommandFrame::new("ZRANGE").arg("z").arg_int(0).arg_int(-1),
        );
        assert_eq!(
            reply,
            Resp2Reply::Array(vec![
                Resp2Reply::Bulk(Bytes::from_static(b"c")),
                Resp2Reply::Bulk(Bytes::from_static(b"a")),
                Resp2Reply::Bulk(Bytes::from_static(b"b")),
            ])
        );
    }

    #[test]
    fn stream_ids_are_monotonic() {
        let mut backend = MemoryBackend::new();
        let first = eval2(
            &mut backend,
            CommandFrame::new("XADD").arg("s").arg("*").arg("f").arg("1"),
        );
        let second = eval2(
            &mut backend,
            CommandFrame::new("XADD").arg("s").arg("*").arg("f").arg("2"),
        );
        assert_eq!(first, Resp2Reply::Bulk(Bytes::from_static(b"1-0")));
        assert_eq!(second, Resp2Reply::Bulk(Bytes::from_static(b"2-0")));
    }

    #[test]
    fn unknown_commands_error_instead_of_panicking() {
        let mut backend = MemoryBackend::new();
        let reply = eval2(&mut backend, CommandFrame::new("OBJECT").arg("ENCODING"));
        assert!(matches!(reply, Resp2Reply::Error(_)));
    }
}
