//! # Payload Codec
//!
//! Operation metadata travels with a draft as base64 of a canonical JSON
//! object. Four keys belong to the protocol:
//!
//! | key        | value                                   |
//! |------------|-----------------------------------------|
//! | `from`     | sender account, `0x` + 40 hex chars     |
//! | `to`       | account (40 hex) or resource (64 hex)   |
//! | `amount`   | decimal string                          |
//! | `token_id` | `0x` + 64 hex chars                     |
//!
//! Each is present only when the operation has that notion (a balance
//! query has no `to`, a burn has no `to`). Everything method-specific goes
//! under extension keys, which may never reuse a reserved name.
//!
//! "Canonical" means sorted keys and no insignificant whitespace, which is
//! what `serde_json` produces for its default `BTreeMap`-backed maps.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::config::RESERVED_PAYLOAD_KEYS;
use crate::error::DraftError;
use crate::types::amount::parse_amount;
use crate::types::{Address, Amount, Recipient, TokenId};

/// Reserved plus extension fields of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    from: Option<Address>,
    to: Option<Recipient>,
    amount: Option<Amount>,
    token_id: Option<TokenId>,
    extensions: BTreeMap<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: impl Into<Recipient>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets `token_id`; `None` (native asset) leaves the key out.
    pub fn with_token_id(mut self, token_id: Option<TokenId>) -> Self {
        self.token_id = token_id;
        self
    }

    /// Adds a method-specific field.
    ///
    /// Reserved names are accepted here and rejected by [`Payload::encode`],
    /// so a builder chain stays infallible and the conflict surfaces once,
    /// before any bytes are produced.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Adds every entry of `fields` as an extension.
    pub fn with_extensions<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in fields {
            self.extensions.insert(key.into(), value);
        }
        self
    }

    pub fn from(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Recipient> {
        self.to.as_ref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn token_id(&self) -> Option<&TokenId> {
        self.token_id.as_ref()
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    /// Fails with [`DraftError::FieldConflict`] on the first extension key
    /// that equals a reserved name.
    pub fn check_conflicts(&self) -> Result<(), DraftError> {
        match self
            .extensions
            .keys()
            .find(|k| RESERVED_PAYLOAD_KEYS.contains(&k.as_str()))
        {
            Some(key) => Err(DraftError::FieldConflict { key: key.clone() }),
            None => Ok(()),
        }
    }

    /// The canonical JSON object.
    pub fn to_json(&self) -> Result<Value, DraftError> {
        self.check_conflicts()?;

        let mut map = Map::new();
        if let Some(from) = &self.from {
            map.insert("from".into(), Value::String(from.to_hex()));
        }
        if let Some(to) = &self.to {
            map.insert("to".into(), Value::String(to.to_hex()));
        }
        if let Some(amount) = self.amount {
            map.insert("amount".into(), Value::String(amount.to_string()));
        }
        if let Some(token_id) = &self.token_id {
            map.insert("token_id".into(), Value::String(token_id.to_hex()));
        }
        for (key, value) in &self.extensions {
            map.insert(key.clone(), value.clone());
        }
        Ok(Value::Object(map))
    }

    /// Base64 of the canonical JSON.
    pub fn encode(&self) -> Result<String, DraftError> {
        let json = self.to_json()?;
        let bytes = serde_json::to_vec(&json)
            .map_err(|e| DraftError::Internal(format!("payload serialization: {e}")))?;
        Ok(BASE64.encode(bytes))
    }

    /// Parses an encoded payload back into its fields.
    pub fn decode(encoded: &str) -> Result<Self, DraftError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| DraftError::validation("payload", format!("invalid base64: {e}")))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| DraftError::validation("payload", format!("invalid json: {e}")))?;
        let Value::Object(map) = value else {
            return Err(DraftError::validation("payload", "expected a json object"));
        };

        let mut payload = Payload::new();
        for (key, value) in map {
            match key.as_str() {
                "from" => {
                    let s = reserved_str(&key, &value)?;
                    let from = Address::from_hex(s)
                        .map_err(|e| DraftError::validation("from", e.to_string()))?;
                    payload.from = Some(from);
                }
                "to" => {
                    let s = reserved_str(&key, &value)?;
                    let to = Recipient::from_hex(s)
                        .map_err(|e| DraftError::validation("to", e.to_string()))?;
                    payload.to = Some(to);
                }
                "amount" => {
                    let s = reserved_str(&key, &value)?;
                    let amount = parse_amount(s).ok_or_else(|| {
                        DraftError::validation("amount", format!("not a decimal integer: {s:?}"))
                    })?;
                    payload.amount = Some(amount);
                }
                "token_id" => {
                    let s = reserved_str(&key, &value)?;
                    let token_id = TokenId::from_hex(s)
                        .map_err(|e| DraftError::validation("token_id", e.to_string()))?;
                    payload.token_id = Some(token_id);
                }
                _ => {
                    payload.extensions.insert(key, value);
                }
            }
        }
        Ok(payload)
    }
}

fn reserved_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, DraftError> {
    value
        .as_str()
        .ok_or_else(|| DraftError::validation(key, "expected a string"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
