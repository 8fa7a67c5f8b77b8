use serde::{Deserialize, Serialize};

/// Error details in a rejected call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallError {
    pub message: String,
    /// Underlying error, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Machine-readable failure reason (e.g. "io", "http-status").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Envelope for a host-to-native invocation.
///
/// The `payload` field uses `serde_json::value::RawValue` to defer
/// deserialization until the dispatched handler knows the concrete type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<serde_json::value::RawValue>>,
}

impl Call {
    /// Creates a new call with the given method and payload.
    pub fn new<T: Serialize>(
        id: impl Into<String>,
        method: impl Into<String>,
        payload: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let raw = match payload {
            Some(p) => {
                let json = serde_json::to_string(p)?;
                Some(serde_json::value::RawValue::from_string(json)?)
            }
            None => None,
        };
        Ok(Self {
            id: id.into(),
            method: method.into(),
            payload: raw,
        })
    }

    /// Deserializes the payload into the given type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.payload {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }

    /// Creates the resolving reply for this call.
    pub fn resolve<T: Serialize>(&self, payload: &T) -> Result<Reply, serde_json::Error> {
        Reply::resolve(self.id.as_str(), payload)
    }

    /// Creates a rejecting reply for this call.
    pub fn reject(&self, message: impl Into<String>) -> Reply {
        Reply::reject(self.id.as_str(), message)
    }
}

/// Terminal response to a [`Call`]: exactly one of `payload` (resolve)
/// or `error` (reject) is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<serde_json::value::RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CallError>,
}

impl Reply {
    /// Creates a resolving reply carrying `payload`.
    pub fn resolve<T: Serialize>(
        id: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(payload)?;
        Ok(Self {
            id: id.into(),
            payload: Some(serde_json::value::RawValue::from_string(json)?),
            error: None,
        })
    }

    /// Creates a rejecting reply with a human-readable message.
    pub fn reject(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: None,
            error: Some(CallError {
                message: message.into(),
                cause: None,
                reason: None,
            }),
        }
    }

    /// Creates a rejecting reply with full error details.
    pub fn reject_with(id: impl Into<String>, error: CallError) -> Self {
        Self {
            id: id.into(),
            payload: None,
            error: Some(error),
        }
    }

    /// Returns `true` if this reply resolves the call.
    pub fn is_resolved(&self) -> bool {
        self.error.is_none()
    }

    /// Deserializes the resolve payload into the given type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.payload {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }
}

/// Named out-of-band notification to the host (e.g. upload status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<serde_json::value::RawValue>>,
}

impl Event {
    /// Creates a new event with the given name and payload.
    pub fn new<T: Serialize>(
        name: impl Into<String>,
        payload: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let raw = match payload {
            Some(p) => {
                let json = serde_json::to_string(p)?;
                Some(serde_json::value::RawValue::from_string(json)?)
            }
            None => None,
        };
        Ok(Self {
            name: name.into(),
            payload: raw,
        })
    }

    /// Deserializes the payload into the given type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.payload {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }
}
