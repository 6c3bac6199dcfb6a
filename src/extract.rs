// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    error::{Expected, ParseError},
    schema::{self, Transform, TALLY_KEYWORD, TALLY_PARAMETER},
};
use std::fmt;

/// A tokenized command line. The first token is the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    /// Split a command line on whitespace. Returns None if there are no
    /// tokens.
    pub fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        match tokens.is_empty() {
            true => None,
            false => Some(Command { tokens }),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.tokens[0]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl From<ParamValue> for serde_json::Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Int(v) => serde_json::Value::from(v),
            ParamValue::Float(v) => serde_json::Value::from(v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// A named value derived from a command field.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedParameter {
    pub name: &'static str,
    pub value: ParamValue,
}

fn parse_int(command: &Command, index: usize, token: &str) -> Result<i64, ParseError> {
    token.parse::<i64>().map_err(|_| ParseError {
        keyword: command.keyword().to_string(),
        index,
        token: token.to_string(),
        expected: Expected::Int,
    })
}

/// NaN and infinities are rejected, they have no JSON representation.
fn parse_float(command: &Command, index: usize, token: &str) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError {
            keyword: command.keyword().to_string(),
            index,
            token: token.to_string(),
            expected: Expected::Float,
        }),
    }
}

/// Derive the schema parameters of a command in token order.
///
/// Every field of the command is converted before anything is returned, so
/// a malformed field yields no parameters at all for the line.
///
/// # Errors
/// Returns `ParseError` if a field with a rule does not hold the expected
/// numeric value.
pub fn extract(command: &Command) -> Result<Vec<DerivedParameter>, ParseError> {
    let mut params = Vec::new();

    for (index, token) in command.tokens().iter().enumerate().skip(1) {
        let rule = match schema::lookup(command.keyword(), index) {
            Some(rule) => rule,
            None => continue,
        };

        let value = match &rule.transform {
            Transform::Int => ParamValue::Int(parse_int(command, index, token)?),
            Transform::Float => ParamValue::Float(parse_float(command, index, token)?),
            Transform::Popcount(bits) => {
                let mask = parse_int(command, index, token)?;
                ParamValue::Int(schema::popcount(mask, bits.clone()) as i64)
            }
        };

        params.push(DerivedParameter {
            name: rule.parameter,
            value,
        });
    }

    Ok(params)
}

/// Running count of transmit chirp configurations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AntennaTally {
    count: i64,
}

impl AntennaTally {
    /// Count the command if its keyword is the tally keyword. Returns true
    /// when counted.
    pub fn observe(&mut self, command: &Command) -> bool {
        if command.keyword() == TALLY_KEYWORD {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn parameter(&self) -> DerivedParameter {
        DerivedParameter {
            name: TALLY_PARAMETER,
            value: ParamValue::Int(self.count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(text: &str) -> Result<Vec<(&'static str, ParamValue)>, ParseError> {
        let command = Command::parse(text).unwrap();
        Ok(extract(&command)?
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect())
    }

    #[test]
    fn test_tokenize() {
        let cmd = Command::parse("  profileCfg\t0 77  429 ").unwrap();
        assert_eq!(cmd.keyword(), "profileCfg");
        assert_eq!(cmd.tokens(), &["profileCfg", "0", "77", "429"]);
        assert_eq!(cmd.to_string(), "profileCfg 0 77 429");
        assert!(Command::parse(" \t").is_none());
    }

    #[test]
    fn test_frame_cfg() {
        assert_eq!(
            derive("frameCfg 0 1 2 3 4 5.0").unwrap(),
            vec![
                ("chirpStartIdx", ParamValue::Int(0)),
                ("chirpEndIdx", ParamValue::Int(1)),
                ("numLoops", ParamValue::Int(2)),
                ("numFrames", ParamValue::Int(3)),
                ("framePeriodicity", ParamValue::Float(4.0)),
            ]
        );

        // trailing fields without a rule are ignored
        assert_eq!(derive("frameCfg 0 2 16 0 100 1 0").unwrap().len(), 5);
    }

    #[test]
    fn test_channel_cfg() {
        assert_eq!(
            derive("channelCfg 3 15 0 0").unwrap(),
            vec![
                ("numTxAzimAnt", ParamValue::Int(2)),
                ("numRxAnt", ParamValue::Int(4)),
            ]
        );
        assert_eq!(
            derive("channelCfg 15 5 0").unwrap(),
            vec![
                ("numTxAzimAnt", ParamValue::Int(2)),
                ("numRxAnt", ParamValue::Int(2)),
            ]
        );
        assert_eq!(
            derive("channelCfg 4 8 0").unwrap(),
            vec![
                ("numTxAzimAnt", ParamValue::Int(0)),
                ("numRxAnt", ParamValue::Int(1)),
            ]
        );
    }

    #[test]
    fn test_profile_cfg() {
        let params = derive("profileCfg 0 77 429 7 57.14 0 0 70 1 256 5209 0 0 30").unwrap();
        assert_eq!(
            params,
            vec![
                ("startFreq", ParamValue::Float(77.0)),
                ("idleTime", ParamValue::Float(429.0)),
                ("rampEndTime", ParamValue::Float(57.14)),
                ("freqSlopeConst", ParamValue::Float(70.0)),
                ("numAdcSamples", ParamValue::Int(256)),
                ("digOutSampleRate", ParamValue::Float(5209.0)),
            ]
        );
    }

    #[test]
    fn test_range_bias() {
        assert_eq!(
            derive("compRangeBiasAndRxChanPhase 0.0 1 0 1 0 1 0 1 0").unwrap(),
            vec![("rangeBias", ParamValue::Float(0.0))]
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(derive("sensorStop").unwrap().is_empty());
        assert!(derive("adcCfg 2 1").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = derive("frameCfg 0 1 two 3 4").unwrap_err();
        assert_eq!(
            err,
            ParseError {
                keyword: "frameCfg".to_string(),
                index: 3,
                token: "two".to_string(),
                expected: Expected::Int,
            }
        );

        let err = derive("channelCfg 0x3 15 0").unwrap_err();
        assert_eq!(err.index, 1);

        let err = derive("profileCfg 0 77 idle").unwrap_err();
        assert_eq!(err.expected, Expected::Float);

        // fields after the malformed one are never reached
        assert!(derive("frameCfg 0 1.5 2 3 4").is_err());

        for token in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let err = derive(&format!("profileCfg 0 {} 429", token)).unwrap_err();
            assert_eq!(err.index, 2);
            assert_eq!(err.expected, Expected::Float);
            assert_eq!(err.token, token);
        }
        assert!(derive("compRangeBiasAndRxChanPhase 1e400").is_err());
    }

    #[test]
    fn test_tally() {
        let mut tally = AntennaTally::default();
        for line in [
            "chirpCfg 0 0 0 0 0 0 0 1",
            "profileCfg 0 77 429 7 57.14 0 0 70 1 256 5209 0 0 30",
            "chirpCfg 1 1 0 0 0 0 0 2",
            "chirpCfg 2 2 0 0 0 0 0 4",
            "frameCfg 0 2 16 0 100 1 0",
        ] {
            tally.observe(&Command::parse(line).unwrap());
        }
        assert_eq!(tally.count(), 3);
        assert_eq!(
            tally.parameter(),
            DerivedParameter {
                name: "numTxAnt",
                value: ParamValue::Int(3),
            }
        );

        // a keyword appearing as an argument is not counted
        assert!(!tally.observe(&Command::parse("echo chirpCfg").unwrap()));
        assert_eq!(tally.count(), 3);
    }
}
