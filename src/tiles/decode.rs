//! Tile code decoder.
//!
//! A tile code is a `;`-separated list of `key=params` clauses:
//!
//! | key | part | params |
//! |-----|------|--------|
//! | `t` | town | `r` revenue, `id` local id |
//! | `c` | city | `r` revenue, `s` slots (default 1), `id` local id |
//! | `o` | offboard | `r` revenue |
//! | `p` | path | `a`, `b` endpoints |
//! | `l` | label | raw text |
//! | `u` | upgrade | `c` cost, `t` terrains joined by `+`, `e` edge |
//!
//! Path endpoints are an edge number `0..5`, `_N` for the Nth non-path
//! part decoded so far (which must be a city, town or offboard), or `j`
//! for the tile's junction. Empty clauses are skipped, so `""` decodes to
//! a blank tile and trailing `;` is harmless.
//!
//! ```
//! use rust_18xx::tiles::{decode, Part};
//!
//! let parts = decode("c=r:20;p=a:0,b:_0;p=a:_0,b:1").unwrap();
//! assert_eq!(parts.len(), 3);
//! assert!(matches!(parts[0], Part::City(_)));
//! ```

use std::str::FromStr;

use crate::core::{EngineResult, GameError};

use super::part::{City, Endpoint, NodeKind, Offboard, Part, Path, Revenue, Town, Upgrade};

/// Non-path parts in decode order, for `_N` back-references.
enum Decoded {
    Node(Endpoint),
    Label,
    Upgrade,
}

#[derive(Default)]
struct Decoder {
    cache: Vec<Decoded>,
    cities: usize,
    towns: usize,
    offboards: usize,
    junction: bool,
}

/// Decode a tile code into its parts.
pub fn decode(code: &str) -> EngineResult<Vec<Part>> {
    let mut decoder = Decoder::default();
    let mut parts = Vec::new();

    for clause in code.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        decoder.clause(clause, &mut parts)?;
    }

    Ok(parts)
}

impl Decoder {
    fn clause(&mut self, clause: &str, parts: &mut Vec<Part>) -> EngineResult<()> {
        let (key, raw) = clause
            .split_once('=')
            .ok_or_else(|| GameError::grammar(clause, "missing `=`"))?;

        if key == "l" {
            self.cache.push(Decoded::Label);
            parts.push(Part::Label(raw.to_string()));
            return Ok(());
        }

        let params = params(clause, raw)?;
        let get = |name: &str| params.iter().find(|(k, _)| *k == name).map(|(_, v)| *v);

        match key {
            "c" => {
                let revenue = revenue(clause, get("r"))?;
                let slots: usize = number(clause, get("s"), 1)?;
                let local_id: u8 = number(clause, get("id"), 0)?;
                let index = self.cities;
                self.cities += 1;
                self.cache.push(Decoded::Node(Endpoint::Node { kind: NodeKind::City, index, local_id }));
                parts.push(Part::City(City::new(revenue, slots, local_id)));
            }
            "t" => {
                let revenue = revenue(clause, get("r"))?;
                let local_id: u8 = number(clause, get("id"), 0)?;
                let index = self.towns;
                self.towns += 1;
                self.cache.push(Decoded::Node(Endpoint::Node { kind: NodeKind::Town, index, local_id }));
                parts.push(Part::Town(Town { local_id, revenue }));
            }
            "o" => {
                let revenue = revenue(clause, get("r"))?;
                let index = self.offboards;
                self.offboards += 1;
                self.cache.push(Decoded::Node(Endpoint::Node { kind: NodeKind::Offboard, index, local_id: 0 }));
                parts.push(Part::Offboard(Offboard { revenue }));
            }
            "u" => {
                let cost: i64 = number(clause, get("c"), 0)?;
                let terrains = get("t")
                    .map(|t| t.split('+').map(str::to_string).collect())
                    .unwrap_or_default();
                let edge = match get("e") {
                    Some(e) => Some(edge(clause, e)?),
                    None => None,
                };
                self.cache.push(Decoded::Upgrade);
                parts.push(Part::Upgrade(Upgrade { cost, terrains, edge }));
            }
            "p" => {
                let a = get("a").ok_or_else(|| GameError::grammar(clause, "path without `a`"))?;
                let b = get("b").ok_or_else(|| GameError::grammar(clause, "path without `b`"))?;
                let a = self.endpoint(clause, a, parts)?;
                let b = self.endpoint(clause, b, parts)?;
                parts.push(Part::Path(Path::new(a, b)));
            }
            other => {
                return Err(GameError::grammar(clause, format!("unknown part type `{other}`")));
            }
        }

        Ok(())
    }

    fn endpoint(&mut self, clause: &str, raw: &str, parts: &mut Vec<Part>) -> EngineResult<Endpoint> {
        if raw == "j" {
            if !self.junction {
                self.junction = true;
                parts.push(Part::Junction);
            }
            return Ok(Endpoint::Junction);
        }

        if let Some(reference) = raw.strip_prefix('_') {
            let n: usize = reference
                .parse()
                .map_err(|_| GameError::grammar(clause, format!("bad reference `{raw}`")))?;
            return match self.cache.get(n) {
                Some(Decoded::Node(endpoint)) => Ok(*endpoint),
                Some(Decoded::Label | Decoded::Upgrade) => Err(GameError::grammar(
                    clause,
                    format!("reference `{raw}` is not a city, town or offboard"),
                )),
                None => Err(GameError::grammar(clause, format!("dangling reference `{raw}`"))),
            };
        }

        Ok(Endpoint::Edge(edge(clause, raw)?))
    }
}

fn params<'a>(clause: &str, raw: &'a str) -> EngineResult<Vec<(&'a str, &'a str)>> {
    raw.split(',')
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.split_once(':')
                .ok_or_else(|| GameError::grammar(clause, format!("bad parameter `{p}`")))
        })
        .collect()
}

fn revenue(clause: &str, raw: Option<&str>) -> EngineResult<Revenue> {
    match raw {
        Some(r) => Revenue::parse(r).map_err(|reason| GameError::grammar(clause, reason)),
        None => Ok(Revenue::default()),
    }
}

/// Parse into the target type, so negative counts and out-of-range ids
/// are grammar errors.
fn number<T: FromStr>(clause: &str, raw: Option<&str>, default: T) -> EngineResult<T> {
    match raw {
        Some(n) => n
            .parse()
            .map_err(|_| GameError::grammar(clause, format!("bad number `{n}`"))),
        None => Ok(default),
    }
}

fn edge(clause: &str, raw: &str) -> EngineResult<u8> {
    match raw.parse::<u8>() {
        Ok(e) if e < 6 => Ok(e),
        _ => Err(GameError::grammar(clause, format!("bad edge `{raw}`"))),
    }
}
