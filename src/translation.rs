//! Mapping between [`SubscriberEntry`] and the shapes each facade puts on the wire.
//!
//! Both wire shapes carry `confirmed_at` as whole seconds since the epoch, `id` and `opt_out`
//! pass through untouched. Encoding then decoding an entry gives the same entry back.

use serde::{Deserialize, Serialize};

use crate::domain::subscriber_entry::{from_epoch_seconds, to_epoch_seconds, SubscriberEntry};
use crate::grpc::proto;

/// JSON body of the HTTP facade. Missing fields take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EmailEntryBody {
    pub id: i64,
    pub email: String,
    pub confirmed_at: i64,
    pub opt_out: bool,
}

impl From<&SubscriberEntry> for EmailEntryBody {
    fn from(entry: &SubscriberEntry) -> Self {
        EmailEntryBody {
            id: entry.id,
            email: entry.email.clone(),
            confirmed_at: to_epoch_seconds(&entry.confirmed_at),
            opt_out: entry.opt_out,
        }
    }
}

impl TryFrom<EmailEntryBody> for SubscriberEntry {
    type Error = String;

    fn try_from(body: EmailEntryBody) -> Result<Self, Self::Error> {
        Ok(SubscriberEntry {
            id: body.id,
            email: body.email,
            confirmed_at: from_epoch_seconds(body.confirmed_at)?,
            opt_out: body.opt_out,
        })
    }
}

impl From<&SubscriberEntry> for proto::EmailEntry {
    fn from(entry: &SubscriberEntry) -> Self {
        proto::EmailEntry {
            id: entry.id,
            email: entry.email.clone(),
            confirmed_at: to_epoch_seconds(&entry.confirmed_at),
            opt_out: entry.opt_out,
        }
    }
}

impl TryFrom<proto::EmailEntry> for SubscriberEntry {
    type Error = String;

    fn try_from(message: proto::EmailEntry) -> Result<Self, Self::Error> {
        Ok(SubscriberEntry {
            id: message.id,
            email: message.email,
            confirmed_at: from_epoch_seconds(message.confirmed_at)?,
            opt_out: message.opt_out,
        })
    }
}
