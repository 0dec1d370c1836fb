//! Service configuration document.
//!
//! A resolver may return a service config alongside addresses. It carries the
//! load balancing policy and per-method settings in the canonical JSON shape:
//!
//! ```json
//! {
//!   "loadBalancingConfig": [{ "round_robin": {} }],
//!   "methodConfig": [{
//!     "name": [{ "service": "greet.Greeter" }],
//!     "timeout": "1.5s",
//!     "retryPolicy": {
//!       "maxAttempts": 3,
//!       "initialBackoff": "0.1s",
//!       "maxBackoff": "1s",
//!       "backoffMultiplier": 2,
//!       "retryableStatusCodes": ["UNAVAILABLE"]
//!     }
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Load balancing policies in order of preference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancing_config: Vec<LoadBalancingConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_config: Vec<MethodConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_throttling: Option<RetryThrottlingPolicy>,
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Name of the first (most preferred) load balancing policy.
    pub fn load_balancing_policy(&self) -> Option<&str> {
        self.load_balancing_config.first().map(|c| c.policy_name.as_str())
    }

    /// Find the method config matching `service`/`method`.
    ///
    /// An exact method match wins over a service-wide entry, which wins over
    /// the default (empty name) entry.
    pub fn method(&self, service: &str, method: &str) -> Option<&MethodConfig> {
        let rank = |name: &MethodName| match (name.service.as_deref(), name.method.as_deref()) {
            (Some(s), Some(m)) if s == service && m == method => Some(0),
            (Some(s), None) if s == service => Some(1),
            (None, None) => Some(2),
            _ => None,
        };
        self.method_config
            .iter()
            .filter_map(|config| config.name.iter().filter_map(rank).min().map(|r| (r, config)))
            .min_by_key(|(r, _)| *r)
            .map(|(_, config)| config)
    }
}

/// One entry of `loadBalancingConfig`: a single-key object mapping the
/// policy name to its policy-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct LoadBalancingConfig {
    pub policy_name: String,
    pub config: Value,
}

impl LoadBalancingConfig {
    pub fn new(policy_name: impl Into<String>) -> Self {
        Self {
            policy_name: policy_name.into(),
            config: Value::Object(Map::new()),
        }
    }
}

impl TryFrom<Map<String, Value>> for LoadBalancingConfig {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "load balancing config must have exactly one policy, found {}",
                map.len()
            ));
        }
        let (policy_name, config) = map.into_iter().next().ok_or("empty load balancing config")?;
        Ok(Self {
            policy_name,
            config,
        })
    }
}

impl From<LoadBalancingConfig> for Map<String, Value> {
    fn from(lb: LoadBalancingConfig) -> Self {
        let mut map = Map::new();
        map.insert(lb.policy_name, lb.config);
        map
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfig {
    #[serde(default)]
    pub name: Vec<MethodName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_ready: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: String,
    pub max_backoff: String,
    pub backoff_multiplier: f64,
    #[serde(default)]
    pub retryable_status_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryThrottlingPolicy {
    pub max_tokens: u32,
    pub token_ratio: f64,
}
