use serde_json::Value;

use crate::ProofFetchError;

const HEX_PREFIX: &str = "0x";

/// Decoded proof bytes, submitted on-chain unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofPayload(Vec<u8>);

impl ProofPayload {
    /// Returns `None` for empty input; a payload is never empty.
    pub fn new(bytes: Vec<u8>) -> Option<Self> {
        (!bytes.is_empty()).then_some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validate a proof service response body and decode its `proof` field.
pub fn parse_proof_response(body: &str) -> Result<ProofPayload, ProofFetchError> {
    let value: Value = serde_json::from_str(body).map_err(ProofFetchError::MalformedBody)?;

    let proof = match value.get("proof") {
        None | Some(Value::Null) => return Err(ProofFetchError::MissingProof),
        Some(Value::String(proof)) => proof.trim(),
        Some(_) => return Err(ProofFetchError::InvalidProofType),
    };

    if proof.is_empty() {
        return Err(ProofFetchError::EmptyProof);
    }

    let Some(hex_digits) = proof.strip_prefix(HEX_PREFIX) else {
        return Err(ProofFetchError::MissingHexPrefix);
    };

    if hex_digits.is_empty() {
        return Err(ProofFetchError::EmptyProof);
    }

    let bytes = hex::decode(hex_digits).map_err(ProofFetchError::InvalidHex)?;
    Ok(ProofPayload(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_prefixed_hex_proof() {
        let payload = parse_proof_response(r#"{"proof":"0xdeadbeef"}"#).unwrap();
        assert_eq!(payload.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let payload = parse_proof_response(r#"{"proof":"0x01","pairs":[0,1]}"#).unwrap();
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_proof_response("<html>bad gateway</html>"),
            Err(ProofFetchError::MalformedBody(_))
        ));
    }

    #[test]
    fn rejects_missing_or_null_proof() {
        assert!(matches!(
            parse_proof_response(r#"{"data":"0x00"}"#),
            Err(ProofFetchError::MissingProof)
        ));
        assert!(matches!(
            parse_proof_response(r#"{"proof":null}"#),
            Err(ProofFetchError::MissingProof)
        ));
    }

    #[test]
    fn rejects_wrong_typed_proof() {
        assert!(matches!(
            parse_proof_response(r#"{"proof":123}"#),
            Err(ProofFetchError::InvalidProofType)
        ));
    }

    #[test]
    fn rejects_empty_proof() {
        assert!(matches!(
            parse_proof_response(r#"{"proof":""}"#),
            Err(ProofFetchError::EmptyProof)
        ));
        assert!(matches!(
            parse_proof_response(r#"{"proof":"0x"}"#),
            Err(ProofFetchError::EmptyProof)
        ));
    }

    #[test]
    fn rejects_unprefixed_or_invalid_hex() {
        assert!(matches!(
            parse_proof_response(r#"{"proof":"deadbeef"}"#),
            Err(ProofFetchError::MissingHexPrefix)
        ));
        assert!(matches!(
            parse_proof_response(r#"{"proof":"0xzz"}"#),
            Err(ProofFetchError::InvalidHex(_))
        ));
    }
}
