// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Positional field schema for the mmWave sensor CLI commands.
//!
//! Each rule maps a token position of a command (the keyword is position 0)
//! to a named parameter and the conversion applied to the token.

use std::ops::RangeInclusive;

/// Conversion applied to a command token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    /// Parse as a signed integer
    Int,
    /// Parse as a floating point value
    Float,
    /// Parse as an integer bitmask and count the set bits in the range
    Popcount(RangeInclusive<u32>),
}

/// Maps one token position of a command to a derived parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub keyword: &'static str,
    pub index: usize,
    pub parameter: &'static str,
    pub transform: Transform,
}

const fn rule(
    keyword: &'static str,
    index: usize,
    parameter: &'static str,
    transform: Transform,
) -> FieldRule {
    FieldRule {
        keyword,
        index,
        parameter,
        transform,
    }
}

/// Command keyword counted once per occurrence into [`TALLY_PARAMETER`].
pub const TALLY_KEYWORD: &str = "chirpCfg";

/// Parameter receiving the number of [`TALLY_KEYWORD`] commands.
pub const TALLY_PARAMETER: &str = "numTxAnt";

pub static SCHEMA: &[FieldRule] = &[
    rule("frameCfg", 1, "chirpStartIdx", Transform::Int),
    rule("frameCfg", 2, "chirpEndIdx", Transform::Int),
    rule("frameCfg", 3, "numLoops", Transform::Int),
    rule("frameCfg", 4, "numFrames", Transform::Int),
    rule("frameCfg", 5, "framePeriodicity", Transform::Float),
    rule("profileCfg", 2, "startFreq", Transform::Float),
    rule("profileCfg", 3, "idleTime", Transform::Float),
    rule("profileCfg", 5, "rampEndTime", Transform::Float),
    rule("profileCfg", 8, "freqSlopeConst", Transform::Float),
    rule("profileCfg", 10, "numAdcSamples", Transform::Int),
    rule("profileCfg", 11, "digOutSampleRate", Transform::Float),
    rule("compRangeBiasAndRxChanPhase", 1, "rangeBias", Transform::Float),
    // tx azimuth antennas are enabled by bits 0-1, rx antennas by bits 0-3
    rule("channelCfg", 1, "numTxAzimAnt", Transform::Popcount(0..=1)),
    rule("channelCfg", 2, "numRxAnt", Transform::Popcount(0..=3)),
];

/// Find the rule for a keyword and token position.
pub fn lookup(keyword: &str, index: usize) -> Option<&'static FieldRule> {
    SCHEMA
        .iter()
        .find(|r| r.keyword == keyword && r.index == index)
}

/// Count the set bits of `mask` within `bits`.
pub fn popcount(mask: i64, bits: RangeInclusive<u32>) -> u32 {
    bits.filter(|bit| *bit < i64::BITS)
        .map(|bit| ((mask >> bit) & 1) as u32)
        .sum()
}
