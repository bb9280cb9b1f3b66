/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::fmt;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use num_bigint_dig::BigUint;
use rand::Rng;

use crate::errors::Error;

/// An inclusive span of IPv4 addresses.
///
/// Accepted textual forms, one per pool subnet or reserved-range entry:
///
/// - `10.2.0.4` — a single address (start == end)
/// - `10.2.0.0/24` — a CIDR block, network through broadcast
/// - `10.2.0.10-10.2.0.50` — an explicit start and end
/// - `10.2.0.10-10.2.0.50/24` — as above; the suffix is carried but does
///   not alter the bounds
///
/// Size arithmetic runs over big integers so the full IPv4 space does not
/// overflow; candidate draws stay in machine words since any IPv4 span
/// fits in a `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
    prefix_len: Option<u8>,
}

impl IpRange {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let trimmed = text.trim();
        let (body, prefix_len) = match trimmed.split_once('/') {
            Some((body, len_text)) => {
                let len: u8 = len_text.parse().map_err(|_| {
                    Error::malformed_range(text, format!("invalid prefix length '{len_text}'"))
                })?;
                if len > 32 {
                    return Err(Error::malformed_range(
                        text,
                        format!("prefix length {len} exceeds 32"),
                    ));
                }
                (body, Some(len))
            }
            None => (trimmed, None),
        };

        match body.split_once('-') {
            Some((start_text, end_text)) => {
                let start = parse_ipv4(text, start_text)?;
                let end = parse_ipv4(text, end_text)?;
                if start > end {
                    return Err(Error::malformed_range(
                        text,
                        "start address is above end address",
                    ));
                }
                Ok(IpRange {
                    start,
                    end,
                    prefix_len,
                })
            }
            None => {
                let addr = parse_ipv4(text, body)?;
                match prefix_len {
                    Some(len) => {
                        let network = Ipv4Network::new(addr, len)
                            .map_err(|err| Error::malformed_range(text, err.to_string()))?;
                        Ok(IpRange {
                            start: network.network(),
                            end: network.broadcast(),
                            prefix_len,
                        })
                    }
                    None => Ok(IpRange {
                        start: addr,
                        end: addr,
                        prefix_len: None,
                    }),
                }
            }
        }
    }

    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    pub fn end(&self) -> Ipv4Addr {
        self.end
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.prefix_len
    }

    /// Number of addresses in the range, end inclusive.
    pub fn size(&self) -> BigUint {
        let start = BigUint::from_bytes_be(&self.start.octets());
        let end = BigUint::from_bytes_be(&self.end.octets());
        // the end address is part of the range
        (end - start) + BigUint::from(1u32)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr = u32::from(addr);
        u32::from(self.start) <= addr && addr <= u32::from(self.end)
    }

    /// Maps an integer offset from the range start back to an address.
    ///
    /// The big-integer sum carries no leading zero bytes, so the address
    /// octets sit at the tail of its byte representation whatever width
    /// the backing integer grew to. Returns `None` when the sum leaves
    /// 32-bit space; offsets below [`size`](Self::size) always map.
    pub fn offset_to_address(&self, offset: &BigUint) -> Option<Ipv4Addr> {
        let sum = BigUint::from_bytes_be(&self.start.octets()) + offset;
        let bytes = sum.to_bytes_be();
        if bytes.len() > 4 {
            return None;
        }
        let mut octets = [0u8; 4];
        octets[4 - bytes.len()..].copy_from_slice(&bytes);
        Some(Ipv4Addr::from(octets))
    }

    /// Addresses in this range that are not covered by `exclude_ranges`
    /// or `exclude_singletons`. Exclusions are clipped to the range and
    /// merged first, so overlapping reservations are not double-counted.
    pub fn usable_size(
        &self,
        exclude_ranges: &[IpRange],
        exclude_singletons: &[Ipv4Addr],
    ) -> u64 {
        let start = u64::from(u32::from(self.start));
        let end = u64::from(u32::from(self.end));

        let mut intervals: Vec<(u64, u64)> = Vec::new();
        for range in exclude_ranges {
            let lo = u64::from(u32::from(range.start)).max(start);
            let hi = u64::from(u32::from(range.end)).min(end);
            if lo <= hi {
                intervals.push((lo, hi));
            }
        }
        for addr in exclude_singletons {
            let at = u64::from(u32::from(*addr));
            if at >= start && at <= end {
                intervals.push((at, at));
            }
        }
        intervals.sort_unstable();

        let mut covered = 0u64;
        let mut current: Option<(u64, u64)> = None;
        for (lo, hi) in intervals {
            match current {
                Some((cur_lo, cur_hi)) if lo <= cur_hi + 1 => {
                    current = Some((cur_lo, cur_hi.max(hi)));
                }
                Some((cur_lo, cur_hi)) => {
                    covered += cur_hi - cur_lo + 1;
                    current = Some((lo, hi));
                }
                None => current = Some((lo, hi)),
            }
        }
        if let Some((cur_lo, cur_hi)) = current {
            covered += cur_hi - cur_lo + 1;
        }

        (end - start + 1) - covered
    }

    /// Draws a uniformly random address from the range, redrawing until
    /// the result avoids every excluded sub-range and singleton. Uniform
    /// resampling needs no bias correction.
    ///
    /// Fails with [`Error::PoolExhausted`] when the exclusions cover the
    /// whole range, and as a backstop after 64x the expected number of
    /// draws (miss probability below e^-64 whenever a usable address
    /// exists).
    pub fn random_address<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        exclude_ranges: &[IpRange],
        exclude_singletons: &[Ipv4Addr],
    ) -> Result<Ipv4Addr, Error> {
        let usable = self.usable_size(exclude_ranges, exclude_singletons);
        if usable == 0 {
            return Err(Error::PoolExhausted {
                subnet: self.to_string(),
            });
        }

        let start = u64::from(u32::from(self.start));
        let span = u64::from(u32::from(self.end)) - start + 1;
        let max_attempts = (span / usable).saturating_mul(64).max(64);

        for _ in 0..max_attempts {
            let offset = rng.random_range(0..span);
            let candidate = Ipv4Addr::from(u32::from(self.start) + offset as u32);

            let excluded = exclude_singletons.iter().any(|addr| *addr == candidate)
                || exclude_ranges.iter().any(|range| range.contains(candidate));
            if !excluded {
                return Ok(candidate);
            }
        }

        Err(Error::PoolExhausted {
            subnet: self.to_string(),
        })
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)?;
        if let Some(len) = self.prefix_len {
            write!(f, "/{len}")?;
        }
        Ok(())
    }
}

fn parse_ipv4(text: &str, part: &str) -> Result<Ipv4Addr, Error> {
    let part = part.trim();
    part.parse().map_err(|_| {
        Error::malformed_range(text, format!("'{part}' is not an IPv4 address"))
    })
}
