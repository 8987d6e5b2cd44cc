//! Row-oriented views over a DB byte buffer, driven by a small line-oriented
//! layout specification:
//!
//! ```text
//! 0    id       INT
//! 2    name     STRING[8]
//! 12.0 active   BOOL
//! ```
//!
//! Each line is `index name TYPE`. `TYPE` is one of `BOOL`, `INT`, `WORD`,
//! `DWORD`, `REAL` or `STRING[n]`. `BOOL` fields use a dotted `byte.bit`
//! index; every other type uses a plain byte index. Blank lines and lines
//! starting with `#` are skipped, and a trailing `# ...` comment on a data
//! line is stripped before tokenizing.

use crate::client::create::S7Client;
use crate::errors::{Error, LayoutError};
use crate::s7_protocol::codec;

/// The declared type of one layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Single bit
    Bool,
    /// 16-bit signed integer
    Int,
    /// 16-bit unsigned word
    Word,
    /// 32-bit unsigned double word
    DWord,
    /// IEEE-754 single-precision float
    Real,
    /// Siemens STRING with the given declared capacity
    Str(usize),
}

impl FieldType {
    fn size(self) -> usize {
        match self {
            FieldType::Bool => 1,
            FieldType::Int | FieldType::Word => 2,
            FieldType::DWord | FieldType::Real => 4,
            FieldType::Str(n) => 2 + n,
        }
    }
}

/// A decoded value read from, or to be written into, a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `BOOL`
    Bool(bool),
    /// `INT`
    Int(i16),
    /// `WORD`
    Word(u16),
    /// `DWORD`
    DWord(u32),
    /// `REAL`
    Real(f32),
    /// `STRING[n]`
    Str(String),
}

/// One field declared by a layout specification.
#[derive(Debug, Clone)]
struct Field {
    name: String,
    byte_index: usize,
    bit_index: Option<u8>,
    ty: FieldType,
}

/// An ordered, parsed layout specification.
///
/// Fields keep the order they were declared in so that the row size can be
/// derived from the highest field offset plus that field's size.
#[derive(Debug, Clone)]
pub struct Layout {
    fields: Vec<Field>,
}

impl Layout {
    fn field(&self, name: &str) -> Result<&Field, Error> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::Layout(LayoutError::UnknownField(name.to_string())))
    }

    /// The size, in bytes, of one row described by this layout: one past the
    /// end of its last field.
    pub fn row_size(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.byte_index + f.ty.size())
            .max()
            .unwrap_or(0)
    }
}

fn parse_field_type(token: &str, line_number: usize) -> Result<FieldType, Error> {
    match token {
        "BOOL" => Ok(FieldType::Bool),
        "INT" => Ok(FieldType::Int),
        "WORD" => Ok(FieldType::Word),
        "DWORD" => Ok(FieldType::DWord),
        "REAL" => Ok(FieldType::Real),
        other => {
            if let Some(inner) = other.strip_prefix("STRING[").and_then(|s| s.strip_suffix(']')) {
                let n: usize = inner
                    .parse()
                    .map_err(|_| Error::Layout(LayoutError::UnknownType(line_number, other.to_string())))?;
                Ok(FieldType::Str(n))
            } else {
                Err(Error::Layout(LayoutError::UnknownType(line_number, other.to_string())))
            }
        }
    }
}

/// Parses a DB-row layout specification into an ordered [`Layout`].
///
/// # Errors
///
/// Returns `Error::Layout` if a data line does not tokenize into exactly
/// three whitespace-separated tokens, a `BOOL` field is missing its dotted
/// bit index, or a declared type is not recognized.
pub fn parse_layout(text: &str) -> Result<Layout, Error> {
    let mut fields = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = match raw_line.split_once('#') {
            Some((before, _)) => before,
            None => raw_line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(Error::Layout(LayoutError::BadLine(line_number)));
        }
        let (index_expr, name, ty_token) = (tokens[0], tokens[1], tokens[2]);
        let ty = parse_field_type(ty_token, line_number)?;

        let (byte_index, bit_index) = if ty == FieldType::Bool {
            let (byte, bit) = index_expr
                .split_once('.')
                .ok_or(Error::Layout(LayoutError::MissingBitIndex(line_number)))?;
            let byte_index: usize = byte
                .parse()
                .map_err(|_| Error::Layout(LayoutError::BadLine(line_number)))?;
            let bit_index: u8 = bit
                .parse()
                .map_err(|_| Error::Layout(LayoutError::BadLine(line_number)))?;
            (byte_index, Some(bit_index))
        } else {
            let byte_index: usize = index_expr
                .parse()
                .map_err(|_| Error::Layout(LayoutError::BadLine(line_number)))?;
            (byte_index, None)
        };

        fields.push(Field {
            name: name.to_string(),
            byte_index,
            bit_index,
            ty,
        });
    }

    Ok(Layout { fields })
}

/// A view over a buffer laid out as a sequence of fixed-size rows, each
/// described by the same [`Layout`].
///
/// `db_offset` is the byte offset, both inside `buf` and inside the PLC's DB,
/// at which the first row begins. `layout_offset` is subtracted from every
/// field's declared byte index before indexing into a row's own slice, so a
/// layout written against byte 100 of the DB can drive a view whose buffer
/// starts at byte 100.
#[derive(Debug)]
pub struct DbView {
    buf: Vec<u8>,
    layout: Layout,
    db_number: u16,
    row_size: usize,
    row_count: usize,
    db_offset: usize,
    layout_offset: usize,
    id_field: Option<String>,
}

impl DbView {
    /// Builds a view over `buf` interpreting it as `row_count` rows of
    /// `layout`, starting at `db_offset` (an offset shared by the buffer and
    /// the PLC's DB memory).
    pub fn new(
        db_number: u16,
        buf: Vec<u8>,
        layout: Layout,
        row_count: usize,
        db_offset: usize,
        layout_offset: usize,
        id_field: Option<String>,
    ) -> Self {
        let row_size = layout.row_size();
        DbView {
            buf,
            layout,
            db_number,
            row_size,
            row_count,
            db_offset,
            layout_offset,
            id_field,
        }
    }

    /// Size, in bytes, of a single row.
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Number of rows this view covers.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Borrows row `index`, giving it exclusive access to its slice of the
    /// underlying buffer for as long as the returned [`DbRow`] lives.
    ///
    /// # Errors
    ///
    /// Returns `Error::Domain` if `index` is outside `0..row_count()`.
    pub fn row(&mut self, index: usize) -> Result<DbRow<'_>, Error> {
        if index >= self.row_count {
            return Err(Error::Domain);
        }
        let start = self.db_offset + index * self.row_size;
        let end = start + self.row_size;
        let buf = self.buf.get_mut(start..end).ok_or(Error::Domain)?;
        Ok(DbRow {
            buf,
            layout: &self.layout,
            db_number: self.db_number,
            start,
            layout_offset: self.layout_offset,
        })
    }

    /// Maps each row's `id_field` value to its row index.
    ///
    /// Only `INT`, `WORD` and `DWORD` id fields are supported. Duplicate ids
    /// are not an error: the later row silently wins, matching how the PLC
    /// itself would present duplicate keys to a reader that indexes by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Layout(LayoutError::UnknownField)` if no `id_field`
    /// was configured, or `Error::Domain` if it resolves to a type that
    /// cannot be used as an id.
    pub fn index_by_id(&self) -> Result<std::collections::BTreeMap<i64, usize>, Error> {
        let id_field = self
            .id_field
            .as_ref()
            .ok_or_else(|| Error::Layout(LayoutError::UnknownField(String::new())))?;
        let field = self.layout.field(id_field)?;

        let mut map = std::collections::BTreeMap::new();
        for index in 0..self.row_count {
            let start = self.db_offset + index * self.row_size;
            let offset = field
                .byte_index
                .checked_sub(self.layout_offset)
                .ok_or(Error::Domain)?
                + start;
            let id = match field.ty {
                FieldType::Int => codec::get_int(&self.buf, offset)? as i64,
                FieldType::Word => codec::get_word(&self.buf, offset)? as i64,
                FieldType::DWord => codec::get_dword(&self.buf, offset)? as i64,
                _ => return Err(Error::Domain),
            };
            map.insert(id, index);
        }
        Ok(map)
    }
}

/// One row of a [`DbView`], borrowing an exclusive slice of its buffer.
#[derive(Debug)]
pub struct DbRow<'a> {
    buf: &'a mut [u8],
    layout: &'a Layout,
    db_number: u16,
    start: usize,
    layout_offset: usize,
}

impl DbRow<'_> {
    fn get_offset(&self, byte_index: usize) -> Result<usize, Error> {
        byte_index.checked_sub(self.layout_offset).ok_or(Error::Domain)
    }

    /// Reads the named field out of this row.
    ///
    /// # Errors
    ///
    /// Returns `Error::Layout(LayoutError::UnknownField)` if `name` is not
    /// part of the layout, or `Error::Domain` if the field falls outside the
    /// row's buffer.
    pub fn get(&self, name: &str) -> Result<Value, Error> {
        let field = self.layout.field(name)?;
        let offset = self.get_offset(field.byte_index)?;
        Ok(match field.ty {
            FieldType::Bool => {
                Value::Bool(codec::get_bool(self.buf, offset, field.bit_index.unwrap_or(0))?)
            }
            FieldType::Int => Value::Int(codec::get_int(self.buf, offset)?),
            FieldType::Word => Value::Word(codec::get_word(self.buf, offset)?),
            FieldType::DWord => Value::DWord(codec::get_dword(self.buf, offset)?),
            FieldType::Real => Value::Real(codec::get_real(self.buf, offset)?),
            FieldType::Str(_) => Value::Str(codec::get_string(self.buf, offset)?),
        })
    }

    /// Writes the named field into this row.
    ///
    /// # Errors
    ///
    /// Returns `Error::Layout(LayoutError::UnknownField)` if `name` is not
    /// part of the layout, or `Error::Domain` if `value`'s variant does not
    /// match the field's declared type or falls outside the row's buffer.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let field = self.layout.field(name)?;
        let offset = self.get_offset(field.byte_index)?;
        match (field.ty, value) {
            (FieldType::Bool, Value::Bool(v)) => {
                codec::set_bool(self.buf, offset, field.bit_index.unwrap_or(0), v)
            }
            (FieldType::Int, Value::Int(v)) => codec::set_int(self.buf, offset, v),
            (FieldType::Word, Value::Word(v)) => codec::set_word(self.buf, offset, v),
            (FieldType::DWord, Value::DWord(v)) => codec::set_dword(self.buf, offset, v),
            (FieldType::Real, Value::Real(v)) => codec::set_real(self.buf, offset, v),
            (FieldType::Str(max), Value::Str(v)) => codec::set_string(self.buf, offset, max as u8, &v),
            _ => Err(Error::Domain),
        }
    }

    /// Reads this row's bytes back from the PLC, replacing the row's buffer
    /// in place. Moves exactly `row_size` bytes.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn read(&mut self, client: &mut S7Client) -> Result<(), Error> {
        let data = client
            .db_read(self.db_number, self.start as u32, self.buf.len() as u32)
            .await?;
        self.buf.copy_from_slice(&data);
        Ok(())
    }

    /// Writes this row's bytes to the PLC. Moves exactly `row_size` bytes.
    ///
    /// # Errors
    ///
    /// Will return `Error` if the PLC rejects the request.
    pub async fn write(&mut self, client: &mut S7Client) -> Result<(), Error> {
        client
            .db_write(self.db_number, self.start as u32, &*self.buf)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SPEC: &str = "\
        0     id         INT\n\
        2     name       STRING[4]\n\
        8.0   testbool1  BOOL\n\
        8.1   testbool2  BOOL\n\
        8.2   testbool3  BOOL\n\
        8.3   testbool4  BOOL\n\
        8.4   testbool5  BOOL\n\
        8.5   testbool6  BOOL\n\
        8.6   testbool7  BOOL\n\
        8.7   testbool8  BOOL\n\
    ";

    #[test]
    fn parses_mixed_field_layout() {
        let layout = parse_layout(TEST_SPEC).unwrap();
        assert_eq!(layout.fields.len(), 10);
        assert_eq!(layout.row_size(), 9);
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let text = "# header comment\n\n0 id INT # inline\n\n";
        let layout = parse_layout(text).unwrap();
        assert_eq!(layout.fields.len(), 1);
        assert_eq!(layout.fields[0].name, "id");
    }

    #[test]
    fn bool_without_dotted_index_is_an_error() {
        let err = parse_layout("0 flag BOOL").unwrap_err();
        assert_eq!(err, Error::Layout(LayoutError::MissingBitIndex(1)));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = parse_layout("0 flag CHAR").unwrap_err();
        assert_eq!(
            err,
            Error::Layout(LayoutError::UnknownType(1, "CHAR".to_string()))
        );
    }

    #[test]
    fn wrong_token_count_is_an_error() {
        let err = parse_layout("0 flag").unwrap_err();
        assert_eq!(err, Error::Layout(LayoutError::BadLine(1)));
    }

    #[test]
    fn decodes_test_spec_row() {
        let layout = parse_layout(TEST_SPEC).unwrap();
        let buf: Vec<u8> = vec![0x00, 0x00, 0x04, 0x04, b't', b'e', b's', b't', 0x0F];
        let mut view = DbView::new(1, buf, layout, 1, 0, 0, None);
        let row = view.row(0).unwrap();

        assert_eq!(row.get("id").unwrap(), Value::Int(0));
        assert_eq!(row.get("name").unwrap(), Value::Str("test".to_string()));
        for i in 1..=4 {
            assert_eq!(row.get(&format!("testbool{i}")).unwrap(), Value::Bool(true));
        }
        for i in 5..=8 {
            assert_eq!(row.get(&format!("testbool{i}")).unwrap(), Value::Bool(false));
        }
    }

    #[test]
    fn set_rejects_mismatched_variant() {
        let layout = parse_layout(TEST_SPEC).unwrap();
        let buf: Vec<u8> = vec![0u8; 9];
        let mut view = DbView::new(1, buf, layout, 1, 0, 0, None);
        let mut row = view.row(0).unwrap();
        assert_eq!(row.set("id", Value::Bool(true)), Err(Error::Domain));
    }

    #[test]
    fn index_by_id_last_duplicate_wins() {
        let layout = parse_layout("0 id INT\n2 name STRING[4]\n").unwrap();
        let row_size = layout.row_size();
        let mut buf = vec![0u8; row_size * 2];
        buf[0..2].copy_from_slice(&1i16.to_be_bytes());
        buf[row_size..row_size + 2].copy_from_slice(&1i16.to_be_bytes());
        let view = DbView::new(1, buf, layout, 2, 0, 0, Some("id".to_string()));
        let map = view.index_by_id().unwrap();
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn row_out_of_range_is_domain_error() {
        let layout = parse_layout("0 id INT\n").unwrap();
        let mut view = DbView::new(1, vec![0u8; 2], layout, 1, 0, 0, None);
        assert_eq!(view.row(1).unwrap_err(), Error::Domain);
    }
}
