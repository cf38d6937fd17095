//! Proof-of-payment files and their local acceptance rules.

use crate::config::MAX_PROOF_BYTES;

/// File types the order service accepts as proof of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    Jpeg,
    Png,
    Pdf,
}

impl ProofKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ProofKind::Jpeg => "image/jpeg",
            ProofKind::Png => "image/png",
            ProofKind::Pdf => "application/pdf",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ProofKind::Jpeg),
            "image/png" => Some(ProofKind::Png),
            "application/pdf" => Some(ProofKind::Pdf),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(ProofKind::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ProofKind::Png),
            [b'%', b'P', b'D', b'F', b'-', ..] => Some(ProofKind::Pdf),
            _ => None,
        }
    }
}

/// Errors raised while accepting or uploading a proof file.
///
/// All of these are recovered locally: the input is reset and the user
/// picks another file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("proof file is empty")]
    Empty,
    #[error("proof file is {size} bytes, the limit is 5 MiB")]
    TooLarge { size: usize },
    #[error("unsupported proof file type: {0}")]
    UnsupportedType(String),
    #[error("proof upload failed: {0}")]
    UploadFailed(String),
}

/// A file picked by the user at the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ProofFile {
    /// Check size and type before anything is sent over the network.
    ///
    /// The declared content type and the file's magic bytes must both
    /// name the same accepted type.
    pub fn validate(&self) -> Result<ProofKind, UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if self.bytes.len() > MAX_PROOF_BYTES {
            return Err(UploadError::TooLarge {
                size: self.bytes.len(),
            });
        }
        let declared = ProofKind::from_mime(&self.content_type)
            .ok_or_else(|| UploadError::UnsupportedType(self.content_type.clone()))?;
        match ProofKind::sniff(&self.bytes) {
            Some(actual) if actual == declared => Ok(actual),
            _ => Err(UploadError::UnsupportedType(format!(
                "{} (content does not match)",
                self.content_type
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, bytes: Vec<u8>) -> ProofFile {
        ProofFile {
            file_name: "comprovativo".to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    #[test]
    fn test_accepts_supported_types() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0].to_vec();
        assert_eq!(file("image/png", png).validate(), Ok(ProofKind::Png));
        assert_eq!(
            file("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]).validate(),
            Ok(ProofKind::Jpeg)
        );
        assert_eq!(
            file("application/pdf; charset=binary", b"%PDF-1.7\n".to_vec()).validate(),
            Ok(ProofKind::Pdf)
        );
    }

    #[test]
    fn test_rejects_oversize_and_wrong_type() {
        let mut big = b"%PDF-1.7".to_vec();
        big.resize(MAX_PROOF_BYTES + 1, 0);
        assert_eq!(
            file("application/pdf", big).validate(),
            Err(UploadError::TooLarge {
                size: MAX_PROOF_BYTES + 1
            })
        );

        assert!(matches!(
            file("image/gif", b"GIF89a".to_vec()).validate(),
            Err(UploadError::UnsupportedType(_))
        ));
        // Declared PNG but actually a PDF.
        assert!(matches!(
            file("image/png", b"%PDF-1.4".to_vec()).validate(),
            Err(UploadError::UnsupportedType(_))
        ));
        assert_eq!(file("image/png", vec![]).validate(), Err(UploadError::Empty));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let mut exact = vec![0xFF, 0xD8, 0xFF];
        exact.resize(MAX_PROOF_BYTES, 0);
        assert!(file("image/jpeg", exact).validate().is_ok());
    }
}
