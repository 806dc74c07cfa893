//! Dense position generation.
//!
//! Given two positions `p1 < p2`, [`generate_position_between`] mints a fresh
//! position strictly between them. Positions are dense: there is always room,
//! growing the path by a digit when the gap closes. The result's final
//! identifier always carries the minting site, so two replicas generating
//! between the same bounds concurrently still produce distinct, consistently
//! ordered positions.

use crate::crdt::decimal;
use crate::crdt::decimal::BASE;
use crate::crdt::identifier::Identifier;
use crate::error::{EngineError, Result};
use crate::SiteId;

/// Stand-in head when the lower bound runs out of identifiers.
///
/// Both stand-ins carry site 0, which real sessions never use; a session
/// minting with site 0 could forge an identifier equal to a stand-in and
/// break the betweenness guarantee at the document edges.
const FLOOR: Identifier = Identifier { digit: 1, site: 0 };

/// Stand-in head when the upper bound runs out of identifiers.
const CEILING: Identifier = Identifier {
    digit: BASE - 1,
    site: 0,
};

/// Mint a position `p` with `p1 < p < p2`.
///
/// Callers must guarantee `p1 < p2`; handing over misordered bounds is a
/// contract violation reported as [`EngineError::MisorderedBounds`].
///
/// The algorithm recurses on the head identifiers (an empty side is read as
/// [`FLOOR`]/[`CEILING`]):
///
/// - Heads with different digits: treat both full paths as digit vectors,
///   take a small increment of the lower one that stays below the upper one,
///   and pair the fresh digits with sites. The final digit takes the minting
///   site; an earlier digit that still matches one of the bounds keeps that
///   bound's site, so concurrent mints that land on the same digits order
///   the same way on every replica.
/// - Equal digits, left site below right site: keep the head and recurse
///   with the lower tail against an open upper bound.
/// - Heads fully equal: keep the head and recurse on both tails.
pub fn generate_position_between(
    p1: &[Identifier],
    p2: &[Identifier],
    site: SiteId,
) -> Result<Vec<Identifier>> {
    let head1 = p1.first().copied().unwrap_or(FLOOR);
    let head2 = p2.first().copied().unwrap_or(CEILING);

    if head1.digit != head2.digit {
        let n1 = digit_vector(p1, head1);
        let n2 = digit_vector(p2, head2);
        let delta = decimal::subtract_greater_than(&n2, &n1);
        let next = decimal::increment(&n1, &delta)?;
        Ok(rebuild_identifiers(&next, p1, p2, site))
    } else if head1.site < head2.site {
        let mut position = vec![head1];
        position.extend(generate_position_between(tail(p1), &[], site)?);
        Ok(position)
    } else if head1.site == head2.site {
        let mut position = vec![head1];
        position.extend(generate_position_between(tail(p1), tail(p2), site)?);
        Ok(position)
    } else {
        Err(EngineError::MisorderedBounds {
            left: head1.site,
            right: head2.site,
        })
    }
}

fn digit_vector(path: &[Identifier], head: Identifier) -> Vec<u32> {
    if path.is_empty() {
        vec![head.digit]
    } else {
        path.iter().map(|id| id.digit).collect()
    }
}

fn tail(path: &[Identifier]) -> &[Identifier] {
    if path.is_empty() {
        path
    } else {
        &path[1..]
    }
}

/// Pair freshly minted digits with sites.
///
/// The last digit belongs to the minting site. Any earlier digit equal to the
/// corresponding digit of a bound keeps that bound's site (lower bound wins a
/// double match), everything else takes the minting site.
fn rebuild_identifiers(
    digits: &[u32],
    p1: &[Identifier],
    p2: &[Identifier],
    site: SiteId,
) -> Vec<Identifier> {
    let last = digits.len() - 1;
    digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| {
            if index == last {
                Identifier::new(digit, site)
            } else if p1.get(index).map(|id| id.digit) == Some(digit) {
                Identifier::new(digit, p1[index].site)
            } else if p2.get(index).map(|id| id.digit) == Some(digit) {
                Identifier::new(digit, p2[index].site)
            } else {
                Identifier::new(digit, site)
            }
        })
        .collect()
}
