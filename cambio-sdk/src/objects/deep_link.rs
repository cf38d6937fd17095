//! Deep link entry into the post-submission feedback flow.
//!
//! A host opens `...?order_id=<uuid>&action=confirm` to bring the user
//! straight to the confirmation/feedback screen of an existing order,
//! without going through checkout.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeepLinkAction {
    Confirm,
}

/// A parsed feedback deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDeepLink {
    pub order_id: Uuid,
    pub action: DeepLinkAction,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeepLinkError {
    #[error("missing order_id parameter")]
    MissingOrderId,
    #[error("invalid order_id: {0}")]
    InvalidOrderId(String),
    #[error("missing action parameter")]
    MissingAction,
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
}

impl FeedbackDeepLink {
    /// Parse from decoded query pairs. Unknown parameters are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, DeepLinkError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut order_id = None;
        let mut action = None;
        for (key, value) in pairs {
            match key {
                "order_id" => order_id = Some(value),
                "action" => action = Some(value),
                _ => {}
            }
        }

        let order_id = order_id.ok_or(DeepLinkError::MissingOrderId)?;
        let order_id = Uuid::parse_str(order_id.trim())
            .map_err(|_| DeepLinkError::InvalidOrderId(order_id.to_string()))?;

        let action = match action.ok_or(DeepLinkError::MissingAction)? {
            "confirm" => DeepLinkAction::Confirm,
            other => return Err(DeepLinkError::UnsupportedAction(other.to_string())),
        };

        Ok(Self { order_id, action })
    }

    /// Parse from a full URL.
    pub fn from_url(url: &Url) -> Result<Self, DeepLinkError> {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        Self::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirm_link() {
        let url = Url::parse(
            "https://cambio.example/?order_id=0195f3a2-7c4e-7b61-9a0e-3f1c2d4e5f60&action=confirm&utm=x",
        )
        .unwrap();
        let link = FeedbackDeepLink::from_url(&url).unwrap();
        assert_eq!(link.action, DeepLinkAction::Confirm);
        assert_eq!(
            link.order_id.to_string(),
            "0195f3a2-7c4e-7b61-9a0e-3f1c2d4e5f60"
        );
    }

    #[test]
    fn test_rejects_incomplete_links() {
        let url = Url::parse("https://cambio.example/?action=confirm").unwrap();
        assert_eq!(
            FeedbackDeepLink::from_url(&url),
            Err(DeepLinkError::MissingOrderId)
        );

        let url = Url::parse("https://cambio.example/?order_id=nope&action=confirm").unwrap();
        assert!(matches!(
            FeedbackDeepLink::from_url(&url),
            Err(DeepLinkError::InvalidOrderId(_))
        ));

        let url = Url::parse(
            "https://cambio.example/?order_id=0195f3a2-7c4e-7b61-9a0e-3f1c2d4e5f60&action=cancel",
        )
        .unwrap();
        assert_eq!(
            FeedbackDeepLink::from_url(&url),
            Err(DeepLinkError::UnsupportedAction("cancel".to_string()))
        );
    }
}
