//! Textual operand addresses (`DB1.DBX10.5`, `MW20`, `I0.7`, ...) parsed
//! into the memory-area/byte-offset/bit-offset triple the S7-ANY wire
//! format needs, and encoded as the 12-byte VariableSpec item.

use crate::errors::{AddressError, Error};

/// A PLC memory area, as used by the S7-ANY addressing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Data block (requires a DB number)
    DataBlock,
    /// Inputs (process-image input, `I`/`E`)
    Inputs,
    /// Outputs (process-image output, `Q`/`A`)
    Outputs,
    /// Markers / flags (`M`)
    Markers,
    /// Counters (`C`/`Z`)
    Counters,
    /// Timers (`T`)
    Timers,
}

impl Area {
    /// The S7-ANY area code transmitted on the wire.
    pub fn code(self) -> u8 {
        match self {
            Area::DataBlock => 0x84,
            Area::Inputs => 0x81,
            Area::Outputs => 0x82,
            Area::Markers => 0x83,
            Area::Counters => 0x1C,
            Area::Timers => 0x1D,
        }
    }
}

/// The S7-ANY transport size ("WordLen") of the addressed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordLen {
    /// Single bit
    Bit,
    /// Single byte
    Byte,
    /// 16-bit word
    Word,
    /// 32-bit double word
    DWord,
    /// Counter cell
    Counter,
    /// Timer cell
    Timer,
}

impl WordLen {
    /// The S7-ANY transport-size code transmitted on the wire.
    pub fn code(self) -> u8 {
        match self {
            WordLen::Bit => 0x01,
            WordLen::Byte => 0x02,
            WordLen::Word | WordLen::Counter | WordLen::Timer => 0x04,
            WordLen::DWord => 0x06,
        }
    }

    /// Size in bytes of a single element of this transport size.
    pub fn data_size(self) -> usize {
        match self {
            WordLen::Bit | WordLen::Byte => 1,
            WordLen::Word | WordLen::Counter | WordLen::Timer => 2,
            WordLen::DWord => 4,
        }
    }
}

/// A fully resolved operand: which area, which DB (if any), which
/// transport size, and the byte/bit offset within that area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    /// Memory area
    pub area: Area,
    /// DB number; `0` when `area != Area::DataBlock`
    pub db_number: u16,
    /// Transport size of the addressed element
    pub word_len: WordLen,
    /// Bit offset of the addressed element, counted from the start of the area
    pub bit_offset: u32,
}

impl Operand {
    fn byte_index(self) -> u32 {
        self.bit_offset / 8
    }

    fn bit_index(self) -> u8 {
        (self.bit_offset % 8) as u8
    }
}

fn split_bit_suffix(rest: &str) -> Result<(&str, Option<u8>), AddressError> {
    match rest.split_once('.') {
        Some((byte_part, bit_part)) => {
            let bit: u8 = bit_part
                .parse()
                .map_err(|_| AddressError::InvalidNumber(bit_part.to_string()))?;
            if bit > 7 {
                return Err(AddressError::InvalidBitIndex(bit));
            }
            Ok((byte_part, Some(bit)))
        }
        None => Ok((rest, None)),
    }
}

fn parse_u32(token: &str) -> Result<u32, AddressError> {
    token
        .parse()
        .map_err(|_| AddressError::InvalidNumber(token.to_string()))
}

/// Parses a textual operand address such as `DB1.DBX10.5`, `MW20`, `I0.7`,
/// `QB3`, `MD8`, `C0`, `T0`. The grammar is case-insensitive.
pub fn parse_address(input: &str) -> Result<Operand, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Address(AddressError::Empty));
    }
    let upper = trimmed.to_ascii_uppercase();

    if let Some(rest) = upper.strip_prefix("DB") {
        let (db_part, after_db) = rest
            .split_once('.')
            .ok_or_else(|| AddressError::Malformed(trimmed.to_string()))?;
        let db_number: u32 =
            db_part.parse().map_err(|_| AddressError::InvalidNumber(db_part.to_string()))?;
        let (word_len, field_rest) = if let Some(r) = after_db.strip_prefix("DBX") {
            (WordLen::Bit, r)
        } else if let Some(r) = after_db.strip_prefix("DBB") {
            (WordLen::Byte, r)
        } else if let Some(r) = after_db.strip_prefix("DBW") {
            (WordLen::Word, r)
        } else if let Some(r) = after_db.strip_prefix("DBD") {
            (WordLen::DWord, r)
        } else {
            return Err(Error::Address(AddressError::Malformed(trimmed.to_string())));
        };
        let (byte_part, bit) = split_bit_suffix(field_rest).map_err(Error::Address)?;
        let byte_index = parse_u32(byte_part).map_err(Error::Address)?;
        if word_len == WordLen::Bit && bit.is_none() {
            return Err(Error::Address(AddressError::Malformed(trimmed.to_string())));
        }
        let bit_offset = byte_index * 8 + bit.unwrap_or(0) as u32;
        return Ok(Operand { area: Area::DataBlock, db_number: db_number as u16, word_len, bit_offset });
    }

    let (area, letter_len) = if upper.starts_with('I') || upper.starts_with('E') {
        (Area::Inputs, 1)
    } else if upper.starts_with('Q') || upper.starts_with('A') {
        (Area::Outputs, 1)
    } else if upper.starts_with('M') {
        (Area::Markers, 1)
    } else if upper.starts_with('C') || upper.starts_with('Z') {
        (Area::Counters, 1)
    } else if upper.starts_with('T') {
        (Area::Timers, 1)
    } else {
        return Err(Error::Address(AddressError::UnknownArea(trimmed.to_string())));
    };

    let after_area = &upper[letter_len..];

    if area == Area::Counters || area == Area::Timers {
        let word_len = if area == Area::Counters { WordLen::Counter } else { WordLen::Timer };
        let n = parse_u32(after_area).map_err(Error::Address)?;
        return Ok(Operand { area, db_number: 0, word_len, bit_offset: n * 8 });
    }

    let (word_len, field_rest) = if let Some(r) = after_area.strip_prefix('B') {
        (WordLen::Byte, r)
    } else if let Some(r) = after_area.strip_prefix('W') {
        (WordLen::Word, r)
    } else if let Some(r) = after_area.strip_prefix('D') {
        (WordLen::DWord, r)
    } else {
        (WordLen::Bit, after_area)
    };

    let (byte_part, bit) = split_bit_suffix(field_rest).map_err(Error::Address)?;
    let byte_index = parse_u32(byte_part).map_err(Error::Address)?;
    if word_len == WordLen::Bit && bit.is_none() {
        return Err(Error::Address(AddressError::Malformed(trimmed.to_string())));
    }
    let bit_offset = byte_index * 8 + bit.unwrap_or(0) as u32;
    Ok(Operand { area, db_number: 0, word_len, bit_offset })
}

/// Encodes an [`Operand`] and element count as a 12-byte S7-ANY VariableSpec
/// item, ready to be embedded in a READ/WRITE AREA request.
pub fn encode_variable_spec(operand: Operand, count: u16) -> [u8; 12] {
    let mut buf = [0u8; 12];
    buf[0] = 0x12; // item header: variable specification
    buf[1] = 0x0A; // length of the remaining item
    buf[2] = 0x10; // S7-ANY syntax id
    buf[3] = operand.word_len.code();
    buf[4] = (count >> 8) as u8;
    buf[5] = count as u8;
    buf[6] = (operand.db_number >> 8) as u8;
    buf[7] = operand.db_number as u8;
    buf[8] = operand.area.code();
    let addr = operand.byte_index() << 3 | operand.bit_index() as u32;
    buf[9] = (addr >> 16) as u8;
    buf[10] = (addr >> 8) as u8;
    buf[11] = addr as u8;
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_db_bit_address() {
        let op = parse_address("DB1.DBX10.5").unwrap();
        assert_eq!(op.area, Area::DataBlock);
        assert_eq!(op.db_number, 1);
        assert_eq!(op.word_len, WordLen::Bit);
        assert_eq!(op.bit_offset, 85);
    }

    #[test]
    fn parses_marker_word_address() {
        let op = parse_address("MW20").unwrap();
        assert_eq!(op.area, Area::Markers);
        assert_eq!(op.word_len, WordLen::Word);
        assert_eq!(op.bit_offset, 160);
    }

    #[test]
    fn parses_input_bit_address() {
        let op = parse_address("I0.7").unwrap();
        assert_eq!(op.area, Area::Inputs);
        assert_eq!(op.word_len, WordLen::Bit);
        assert_eq!(op.bit_offset, 7);
    }

    #[test]
    fn is_case_insensitive() {
        let a = parse_address("db1.dbx10.5").unwrap();
        let b = parse_address("DB1.DBX10.5").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_bit_index() {
        assert_eq!(parse_address("I0.9"), Err(Error::Address(AddressError::InvalidBitIndex(9))));
    }

    #[test]
    fn rejects_unknown_area() {
        assert!(matches!(parse_address("XB3"), Err(Error::Address(AddressError::UnknownArea(_)))));
    }

    #[test]
    fn rejects_empty_address() {
        assert_eq!(parse_address("   "), Err(Error::Address(AddressError::Empty)));
    }

    #[test]
    fn encodes_db_bit_variable_spec() {
        let op = parse_address("DB1.DBX10.5").unwrap();
        let bytes = encode_variable_spec(op, 1);
        assert_eq!(bytes, [0x12, 0x0A, 0x10, 0x01, 0x00, 0x01, 0x00, 0x01, 0x84, 0x00, 0x00, 0x55]);
    }

    #[test]
    fn encodes_marker_word_variable_spec() {
        let op = parse_address("MW20").unwrap();
        let bytes = encode_variable_spec(op, 1);
        assert_eq!(bytes, [0x12, 0x0A, 0x10, 0x04, 0x00, 0x01, 0x00, 0x00, 0x83, 0x00, 0x00, 0xA0]);
    }
}
