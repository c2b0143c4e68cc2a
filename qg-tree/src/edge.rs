//! Per-edge learning signal.

use qg_core::ProofEnvInfo;
use serde::{Deserialize, Serialize};

/// Q-value of an edge the search strategy has not estimated yet.
pub const Q_VALUE_UNSET: f64 = f64::NEG_INFINITY;

/// Role of an edge's target state in the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    Undiscovered,
    Discovered,
    Backtracked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub reward: f64,
    pub done: bool,
    #[serde(with = "q_value_serde")]
    pub q_value: f64,
    pub env_info: ProofEnvInfo,
    pub state_type: StateType,
}

impl EdgeInfo {
    /// Fresh edge with an unset Q-value.
    pub fn new(reward: f64, done: bool, env_info: ProofEnvInfo, state_type: StateType) -> Self {
        Self {
            reward,
            done,
            q_value: Q_VALUE_UNSET,
            env_info,
            state_type,
        }
    }

    pub fn with_q_value(mut self, q: f64) -> Self {
        self.q_value = q;
        self
    }

    pub fn has_q_value(&self) -> bool {
        self.q_value != Q_VALUE_UNSET
    }
}

/// JSON has no infinities; non-finite Q-values are written as strings.
mod q_value_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(q: &f64, s: S) -> Result<S::Ok, S::Error> {
        let r = if q.is_finite() {
            Repr::Num(*q)
        } else if q.is_nan() {
            Repr::Text("nan".to_string())
        } else if *q > 0.0 {
            Repr::Text("inf".to_string())
        } else {
            Repr::Text("-inf".to_string())
        };
        r.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Num(x) => Ok(x),
            Repr::Text(t) => match t.as_str() {
                "-inf" => Ok(f64::NEG_INFINITY),
                "inf" => Ok(f64::INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(serde::de::Error::custom(format!(
                    "invalid q_value: {other}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qg_core::ProgressState;

    #[test]
    fn unset_q_value_survives_json() {
        let e = EdgeInfo::new(
            0.5,
            false,
            ProofEnvInfo::new(ProgressState::StateChanged),
            StateType::Discovered,
        );
        assert!(!e.has_q_value());
        let s = serde_json::to_string(&e).unwrap();
        assert!(s.contains("\"-inf\""));
        let back: EdgeInfo = serde_json::from_str(&s).unwrap();
        assert_eq!(back.q_value, f64::NEG_INFINITY);
        assert_eq!(back, e);
    }

    #[test]
    fn finite_q_value_is_a_number() {
        let e = EdgeInfo::new(
            1.0,
            true,
            ProofEnvInfo::new(ProgressState::Done),
            StateType::Discovered,
        )
        .with_q_value(0.25);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["q_value"], 0.25);
    }

    #[test]
    fn unknown_q_value_text_is_rejected() {
        let s = r#"{"reward":0.0,"done":false,"q_value":"lots","env_info":{"progress":"FAILED"},"state_type":"BACKTRACKED"}"#;
        assert!(serde_json::from_str::<EdgeInfo>(s).is_err());
    }
}
