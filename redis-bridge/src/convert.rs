//! Converter framework
//!
//! Converters are plain functions from a driver-native reply to a domain
//! value, written once against the [`Reply`] trait so both back-ends share
//! them. Composite shapes are built from the generic combinators
//! ([`list_of`], [`pairs_of`], [`entry_of`], [`option_of`]) instead of being
//! re-derived per command.

use crate::driver::Reply;
use bytes::Bytes;
use redis_bridge_core::{
    BridgeError, BridgeResult, GeoPoint, KeyKind, NodeDescriptor, NodeRole, ScoredMember,
    SlotRange, StreamEntry, StreamId, Value,
};

// --- combinators ---

/// Apply `element` to every item of an array reply, preserving order
pub fn list_of<R, T, C>(element: C) -> impl Fn(R) -> BridgeResult<Vec<T>>
where
    R: Reply,
    C: Fn(R) -> BridgeResult<T>,
{
    move |reply| reply.into_array()?.into_iter().map(&element).collect()
}

/// Apply a key and a value converter to every pair of a map-shaped reply
pub fn pairs_of<R, K, V, CK, CV>(key: CK, value: CV) -> impl Fn(R) -> BridgeResult<Vec<(K, V)>>
where
    R: Reply,
    CK: Fn(R) -> BridgeResult<K>,
    CV: Fn(R) -> BridgeResult<V>,
{
    move |reply| {
        reply
            .into_pairs()?
            .into_iter()
            .map(|(k, v)| Ok((key(k)?, value(v)?)))
            .collect()
    }
}

/// Apply two converters to the members of one pair
pub fn entry_of<R, A, B, CA, CB>(first: CA, second: CB) -> impl Fn((R, R)) -> BridgeResult<(A, B)>
where
    R: Reply,
    CA: Fn(R) -> BridgeResult<A>,
    CB: Fn(R) -> BridgeResult<B>,
{
    move |(a, b)| Ok((first(a)?, second(b)?))
}

/// Map the nil reply to `None` and everything else through `element`
pub fn option_of<R, T, C>(element: C) -> impl Fn(R) -> BridgeResult<Option<T>>
where
    R: Reply,
    C: Fn(R) -> BridgeResult<T>,
{
    move |reply| {
        if reply.is_nil() {
            Ok(None)
        } else {
            element(reply).map(Some)
        }
    }
}

// --- scalar converters ---

/// Identity conversion into the type-erased domain value
pub fn raw<R: Reply>(reply: R) -> BridgeResult<Value> {
    Ok(reply.into_value())
}

/// Acknowledged status reply
pub fn status<R: Reply>(reply: R) -> BridgeResult<()> {
    let text = reply.into_text()?;
    if text == "OK" {
        Ok(())
    } else {
        Err(BridgeError::Type(format!("expected OK status, got {text}")))
    }
}

/// Textual reply
pub fn text<R: Reply>(reply: R) -> BridgeResult<String> {
    reply.into_text()
}

/// Textual reply, nil-safe
pub fn optional_text<R: Reply>(reply: R) -> BridgeResult<Option<String>> {
    option_of(text)(reply)
}

/// Integer reply
pub fn integer<R: Reply>(reply: R) -> BridgeResult<i64> {
    reply.into_integer()
}

/// Floating point reply
pub fn float<R: Reply>(reply: R) -> BridgeResult<f64> {
    reply.into_double()
}

/// Floating point reply, nil-safe
pub fn optional_float<R: Reply>(reply: R) -> BridgeResult<Option<f64>> {
    option_of(float)(reply)
}

/// Boolean reply
pub fn boolean<R: Reply>(reply: R) -> BridgeResult<bool> {
    reply.into_boolean()
}

/// Binary reply
pub fn binary<R: Reply>(reply: R) -> BridgeResult<Bytes> {
    reply.into_bytes()
}

/// Binary reply, nil-safe
pub fn optional_binary<R: Reply>(reply: R) -> BridgeResult<Option<Bytes>> {
    option_of(binary)(reply)
}

// --- collection converters ---

/// Array of textual replies
pub fn texts<R: Reply>(reply: R) -> BridgeResult<Vec<String>> {
    list_of(text)(reply)
}

/// Array of binary replies
pub fn binaries<R: Reply>(reply: R) -> BridgeResult<Vec<Bytes>> {
    list_of(binary)(reply)
}

/// Array of nil-safe binary replies (multi-get shape)
pub fn optional_binaries<R: Reply>(reply: R) -> BridgeResult<Vec<Option<Bytes>>> {
    list_of(optional_binary)(reply)
}

/// Map-shaped reply with binary fields and values
pub fn binary_pairs<R: Reply>(reply: R) -> BridgeResult<Vec<(Bytes, Bytes)>> {
    pairs_of(binary, binary)(reply)
}

/// Map-shaped reply with textual fields and values
pub fn text_pairs<R: Reply>(reply: R) -> BridgeResult<Vec<(String, String)>> {
    pairs_of(text, text)(reply)
}

// --- domain converters ---

/// Key data-type token
pub fn key_kind<R: Reply>(reply: R) -> BridgeResult<KeyKind> {
    let token = reply.into_text()?;
    KeyKind::from_token(&token)
        .ok_or_else(|| BridgeError::Type(format!("unknown key type token: {token}")))
}

/// Stream entry id in textual form
pub fn stream_id<R: Reply>(reply: R) -> BridgeResult<StreamId> {
    let text = reply.into_text()?;
    text.parse().map_err(BridgeError::Type)
}

/// Range-query reply: entries of id plus field/value pairs
pub fn stream_entries<R: Reply>(reply: R) -> BridgeResult<Vec<StreamEntry>> {
    list_of(stream_entry)(reply)
}

fn stream_entry<R: Reply>(reply: R) -> BridgeResult<StreamEntry> {
    let mut parts = reply.into_array()?;
    if parts.len() != 2 {
        return Err(BridgeError::Type(format!(
            "stream entry should have 2 parts, got {}",
            parts.len()
        )));
    }
    let fields = binary_pairs(parts.pop().unwrap_or_else(|| unreachable!()))?;
    let id = stream_id(parts.pop().unwrap_or_else(|| unreachable!()))?;
    Ok(StreamEntry::new(id, fields))
}

/// Member/score pairs from a with-scores range reply
pub fn scored_members<R: Reply>(reply: R) -> BridgeResult<Vec<ScoredMember>> {
    let pairs = pairs_of(binary, float)(reply)?;
    Ok(pairs
        .into_iter()
        .map(|(member, score)| ScoredMember::new(member, score))
        .collect())
}

/// Coordinate pairs, nil-safe per position
pub fn geo_points<R: Reply>(reply: R) -> BridgeResult<Vec<Option<GeoPoint>>> {
    list_of(option_of(geo_point))(reply)
}

fn geo_point<R: Reply>(reply: R) -> BridgeResult<GeoPoint> {
    let coords = list_of(float)(reply)?;
    if coords.len() < 2 {
        return Err(BridgeError::Type(format!(
            "coordinate pair should have 2 parts, got {}",
            coords.len()
        )));
    }
    Ok(GeoPoint::new(coords[0], coords[1]))
}

/// Parse the bulk text of a CLUSTER NODES reply
pub fn cluster_nodes<R: Reply>(reply: R) -> BridgeResult<Vec<NodeDescriptor>> {
    let text = reply.into_text()?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_node_line)
        .collect()
}

fn parse_node_line(line: &str) -> BridgeResult<NodeDescriptor> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return Err(BridgeError::Type(format!("malformed node line: {line}")));
    }

    let id = fields[0].to_string();
    // Address is host:port@cport; the cluster bus port is irrelevant here.
    let addr = fields[1].split('@').next().unwrap_or(fields[1]);
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| BridgeError::Type(format!("malformed node address: {}", fields[1])))?;
    let port = port
        .parse::<u16>()
        .map_err(|e| BridgeError::Type(format!("malformed node port {port}: {e}")))?;
    let role = if fields[2].contains("master") {
        NodeRole::Master
    } else {
        NodeRole::Replica
    };

    let mut node = NodeDescriptor::new(id, host.to_string(), port, role);
    for token in fields.iter().skip(8) {
        // Importing/migrating slot annotations are bracketed; skip them.
        if token.starts_with('[') {
            continue;
        }
        let range = match token.split_once('-') {
            Some((start, end)) => SlotRange::new(
                start
                    .parse()
                    .map_err(|e| BridgeError::Type(format!("malformed slot {token}: {e}")))?,
                end.parse()
                    .map_err(|e| BridgeError::Type(format!("malformed slot {token}: {e}")))?,
            ),
            None => {
                let slot = token
                    .parse()
                    .map_err(|e| BridgeError::Type(format!("malformed slot {token}: {e}")))?;
                SlotRange::new(slot, slot)
            }
        };
        node.slots.push(range);
    }
    Ok(node)
}

/// Slot ranges from a CLUSTER SLOTS reply
pub fn slot_ranges<R: Reply>(reply: R) -> BridgeResult<Vec<SlotRange>> {
    list_of(slot_range)(reply)
}

fn slot_range<R: Reply>(reply: R) -> BridgeResult<SlotRange> {
    let parts = reply.into_array()?;
    if parts.len() < 2 {
        return Err(BridgeError::Type(format!(
            "slot range should have at least 2 parts, got {}",
            parts.len()
        )));
    }
    let mut bounds = parts.into_iter();
    let start = integer(bounds.next().unwrap_or_else(|| unreachable!()))?;
    let end = integer(bounds.next().unwrap_or_else(|| unreachable!()))?;
    let start =
        u16::try_from(start).map_err(|e| BridgeError::Type(format!("slot out of range: {e}")))?;
    let end =
        u16::try_from(end).map_err(|e| BridgeError::Type(format!("slot out of range: {e}")))?;
    Ok(SlotRange::new(start, end))
}

/// Server TIME reply: seconds plus microseconds
pub fn time_pair<R: Reply>(reply: R) -> BridgeResult<(i64, i64)> {
    let parts = list_of(integer)(reply)?;
    if parts.len() != 2 {
        return Err(BridgeError::Type(format!(
            "time reply should have 2 parts, got {}",
            parts.len()
        )));
    }
    Ok((parts[0], parts[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Resp2Reply;

    fn bulk(data: &str) -> Resp2Reply {
        Resp2Reply::Bulk(Bytes::copy_from_slice(data.as_bytes()))
    }

    #[test]
    fn list_combinator_preserves_order_and_length() {
        let reply = Resp2Reply::Array(vec![bulk("1"), bulk("2"), bulk("3")]);
        let ints = list_of(integer)(reply).unwrap();
        assert_eq!(ints, vec![1, 2, 3]);
    }

    #[test]
    fn list_and_pairs_round_trip_source_values() {
        let source = vec!["alpha", "beta", "gamma"];
        let reply = Resp2Reply::Array(source.iter().map(|s| bulk(s)).collect());
        let decoded = texts(reply).unwrap();
        assert_eq!(decoded, source);

        let reply = Resp2Reply::Array(vec![bulk("k1"), bulk("v1"), bulk("k2"), bulk("v2")]);
        let decoded = text_pairs(reply).unwrap();
        assert_eq!(
            decoded,
            vec![
                ("k1".to_string(), "v1".to_string()),
                ("k2".to_string(), "v2".to_string())
            ]
        );
    }

    #[test]
    fn option_combinator_maps_nil_to_none() {
        assert_eq!(optional_binary(Resp2Reply::Nil).unwrap(), None);
        assert_eq!(
            optional_binary(bulk("x")).unwrap(),
            Some(Bytes::from_static(b"x"))
        );
    }

    #[test]
    fn entry_combinator_applies_both_converters() {
        let pair = (bulk("weight"), bulk("2.5"));
        let (name, value) = entry_of(text, float)(pair).unwrap();
        assert_eq!(name, "weight");
        assert!((value - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn status_rejects_unexpected_text() {
        assert!(status(Resp2Reply::Simple("OK".to_string())).is_ok());
        assert!(matches!(
            status(Resp2Reply::Simple("QUEUED".to_string())),
            Err(BridgeError::Type(_))
        ));
    }

    #[test]
    fn stream_entries_decode_ids_and_fields() {
        let entry = Resp2Reply::Array(vec![
            bulk("1690000000000-2"),
            Resp2Reply::Array(vec![bulk("action"), bulk("login")]),
        ]);
        let entries = stream_entries(Resp2Reply::Array(vec![entry])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, StreamId::new(1_690_000_000_000, 2));
        assert_eq!(
            entries[0].fields,
            vec![(Bytes::from_static(b"action"), Bytes::from_static(b"login"))]
        );
    }

    #[test]
    fn scored_members_decode_flat_pairs() {
        let reply = Resp2Reply::Array(vec![bulk("a"), bulk("1.5"), bulk("b"), bulk("2")]);
        let members = scored_members(reply).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].member, Bytes::from_static(b"a"));
        assert!((members[1].score - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cluster_nodes_parses_masters_replicas_and_slots() {
        let text = "\
07c37dfeb235213a872192d90877d0cd55635b91 127.0.0.1:30004@31004 slave e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 0 1426238317239 4 connected
67ed2db8d677e59ec4a4cefb06858cf2a1a89fa1 127.0.0.1:30002@31002 master - 0 1426238316232 2 connected 5461-10922
e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 127.0.0.1:30001@31001 myself,master - 0 0 1 connected 0-5460 [5461->-importing]
";
        let nodes = cluster_nodes(bulk(text)).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].role, NodeRole::Replica);
        assert_eq!(nodes[1].port, 30002);
        assert_eq!(nodes[1].slots, vec![SlotRange::new(5461, 10922)]);
        assert_eq!(nodes[2].role, NodeRole::Master);
        assert_eq!(nodes[2].slots, vec![SlotRange::new(0, 5460)]);
    }

    #[test]
    fn geo_points_keep_per_position_nils() {
        let reply = Resp2Reply::Array(vec![
            Resp2Reply::Array(vec![bulk("13.361389"), bulk("38.115556")]),
            Resp2Reply::Nil,
        ]);
        let points = geo_points(reply).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].is_some());
        assert!(points[1].is_none());
    }
}
