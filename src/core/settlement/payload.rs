//! Batch instruction payload for the on-chain settler entry function.
//!
//! Arguments are BCS-encoded: a ULEB128 entry count, then for each entry the
//! ULEB128-length-prefixed recipient address bytes followed by the amount as a
//! little-endian `u64`.

use crate::core::amount::BaseUnits;
use crate::core::errors::SettlementError;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PayloadEntry {
    pub recipient: String,
    pub amount: BaseUnits,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchPayload {
    /// Fully qualified entry function, `<address>::<module>::<function>`.
    pub function: String,
    pub entries: Vec<PayloadEntry>,
    #[serde(serialize_with = "serialize_hex")]
    pub arguments: Vec<u8>,
}

impl BatchPayload {
    pub fn build(function: impl Into<String>, entries: Vec<PayloadEntry>) -> Result<Self, SettlementError> {
        let mut arguments = Vec::new();
        write_uleb128(&mut arguments, entries.len() as u64);

        for entry in &entries {
            let address = decode_address(&entry.recipient)?;
            let amount = entry.amount.as_u64().ok_or_else(|| {
                SettlementError::MalformedPayload(format!(
                    "amount {} for {} exceeds u64",
                    entry.amount, entry.recipient
                ))
            })?;

            write_uleb128(&mut arguments, address.len() as u64);
            arguments.extend_from_slice(&address);
            arguments.extend_from_slice(&amount.to_le_bytes());
        }

        Ok(BatchPayload {
            function: function.into(),
            entries,
            arguments,
        })
    }
}

fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Hex address, optional `0x` prefix; odd-length forms are left-padded.
pub(crate) fn decode_address(address: &str) -> Result<Vec<u8>, SettlementError> {
    let digits = address.trim().trim_start_matches("0x");
    if digits.is_empty() {
        return Err(SettlementError::MalformedPayload(format!(
            "recipient address {:?} is empty",
            address
        )));
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    hex::decode(&padded).map_err(|e| {
        SettlementError::MalformedPayload(format!("recipient address {:?} is not hex: {}", address, e))
    })
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{}", hex::encode(bytes)))
}
