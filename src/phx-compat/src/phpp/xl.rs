// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Spreadsheet plumbing: cell addressing, the `Workbook` trait, and the
//! in-memory `CellBook` used by tests and callers that want to inspect
//! writes without a live spreadsheet application.

use std::collections::HashMap;
use std::fmt;

use phx_model::common::{Error, ErrorCode, ErrorKind, Result};
use phx_model::resource_err;
use phx_model::units::{self, Unit};

/// Column letters to a 1-based column number, with support past `Z`
/// (`AA` is 27, `AB` is 28, ...). Digits in a full A1 range are ignored.
pub fn xl_ord(col: &str) -> u32 {
    let mut num: u32 = 0;
    for c in col.chars() {
        if c.is_ascii_alphabetic() {
            num = num * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32) + 1;
        }
    }
    num
}

/// 1-based column number back to letters.
pub fn xl_chr(i: u32) -> String {
    let mut letters = Vec::new();
    let mut num = i;
    while num > 0 {
        let rem = (num - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        num = (num - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Column letters offset by `offset` columns.
pub fn col_offset(col: &str, offset: i32) -> String {
    let base = xl_ord(col) as i32;
    xl_chr((base + offset).max(1) as u32)
}

#[derive(Clone, Debug, PartialEq)]
pub enum XlValue {
    Text(String),
    Number(f64),
    Blank,
}

impl fmt::Display for XlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XlValue::Text(s) => write!(f, "{s}"),
            XlValue::Number(n) => write!(f, "{n}"),
            XlValue::Blank => Ok(()),
        }
    }
}

/// One pending cell write: worksheet, A1-style range, value, and an
/// optional unit conversion applied when the value is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct XlItem {
    pub sheet: String,
    pub range: String,
    pub value: XlValue,
    pub input_unit: Option<Unit>,
    pub target_unit: Option<Unit>,
}

impl XlItem {
    pub fn text(sheet: &str, range: String, value: impl Into<String>) -> XlItem {
        XlItem {
            sheet: sheet.to_owned(),
            range,
            value: XlValue::Text(value.into()),
            input_unit: None,
            target_unit: None,
        }
    }

    pub fn number(sheet: &str, range: String, value: f64) -> XlItem {
        XlItem {
            sheet: sheet.to_owned(),
            range,
            value: XlValue::Number(value),
            input_unit: None,
            target_unit: None,
        }
    }

    pub fn blank(sheet: &str, range: String) -> XlItem {
        XlItem {
            sheet: sheet.to_owned(),
            range,
            value: XlValue::Blank,
            input_unit: None,
            target_unit: None,
        }
    }

    pub fn with_units(mut self, input: Unit, target: Unit) -> XlItem {
        self.input_unit = Some(input);
        self.target_unit = Some(target);
        self
    }

    /// The value to write, after unit conversion. `None` when the item
    /// declares a unit pair the converter does not support.
    pub fn resolved_value(&self) -> Option<XlValue> {
        match (self.input_unit, self.target_unit) {
            (Some(input), Some(target)) => match self.value {
                XlValue::Number(n) => units::convert(n, input, target).map(XlValue::Number),
                ref other => Some(other.clone()),
            },
            _ => Some(self.value.clone()),
        }
    }
}

/// A spreadsheet document the exporter can write into. Implementations
/// must reject reads/writes while no session is attached.
pub trait Workbook {
    fn attach(&mut self) -> Result<()>;
    fn detach(&mut self);
    fn read_cell(&self, sheet: &str, range: &str) -> Result<Option<String>>;
    fn write_cell(&mut self, sheet: &str, range: &str, value: &XlValue) -> Result<()>;
}

/// RAII attach guard: detaches the workbook on every exit path.
pub struct Session<'a, W: Workbook + ?Sized> {
    workbook: &'a mut W,
}

impl<'a, W: Workbook + ?Sized> Session<'a, W> {
    pub fn attach(workbook: &'a mut W) -> Result<Session<'a, W>> {
        workbook.attach()?;
        Ok(Session { workbook })
    }

    pub fn read_cell(&self, sheet: &str, range: &str) -> Result<Option<String>> {
        self.workbook.read_cell(sheet, range)
    }

    pub fn write_item(&mut self, item: &XlItem) -> Result<()> {
        let value = match item.resolved_value() {
            Some(value) => value,
            None => {
                return Err(Error::new(
                    ErrorKind::Export,
                    ErrorCode::BadPhysicalValue,
                    Some(format!(
                        "{}!{}: unsupported unit conversion",
                        item.sheet, item.range
                    )),
                ));
            }
        };
        self.workbook.write_cell(&item.sheet, &item.range, &value)
    }
}

impl<W: Workbook + ?Sized> Drop for Session<'_, W> {
    fn drop(&mut self) {
        self.workbook.detach();
    }
}

/// One write as recorded by `CellBook`, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedWrite {
    pub sheet: String,
    pub range: String,
    pub value: XlValue,
}

/// In-memory workbook. Cells seeded via `set_cell` play the part of the
/// pre-existing document (version cell included); `writes` is the ordered
/// log the exporter produced.
#[derive(Default)]
pub struct CellBook {
    cells: HashMap<(String, String), String>,
    pub writes: Vec<RecordedWrite>,
    attached: bool,
}

impl CellBook {
    pub fn new() -> CellBook {
        CellBook::default()
    }

    /// Seed a cell as if the document already contained it.
    pub fn set_cell(&mut self, sheet: &str, range: &str, value: &str) {
        self.cells
            .insert((sheet.to_owned(), range.to_owned()), value.to_owned());
    }

    pub fn cell(&self, sheet: &str, range: &str) -> Option<&str> {
        self.cells
            .get(&(sheet.to_owned(), range.to_owned()))
            .map(String::as_str)
    }
}

impl Workbook for CellBook {
    fn attach(&mut self) -> Result<()> {
        if self.attached {
            return resource_err!(
                DocumentUnavailable,
                "workbook is already attached".to_owned()
            );
        }
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn read_cell(&self, sheet: &str, range: &str) -> Result<Option<String>> {
        if !self.attached {
            return resource_err!(DocumentUnavailable, "workbook is not attached".to_owned());
        }
        Ok(self.cell(sheet, range).map(str::to_owned))
    }

    fn write_cell(&mut self, sheet: &str, range: &str, value: &XlValue) -> Result<()> {
        if !self.attached {
            return resource_err!(DocumentUnavailable, "workbook is not attached".to_owned());
        }
        self.cells
            .insert((sheet.to_owned(), range.to_owned()), value.to_string());
        self.writes.push(RecordedWrite {
            sheet: sheet.to_owned(),
            range: range.to_owned(),
            value: value.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_math_past_z() {
        assert_eq!(xl_ord("A"), 1);
        assert_eq!(xl_ord("Z"), 26);
        assert_eq!(xl_ord("AA"), 27);
        assert_eq!(xl_ord("AB"), 28);
        assert_eq!(xl_chr(27), "AA");
        assert_eq!(xl_chr(52), "AZ");
        assert_eq!(xl_chr(53), "BA");
        assert_eq!(col_offset("Y", 3), "AB");
        assert_eq!(col_offset("AB", -3), "Y");
    }

    #[test]
    fn range_digits_are_ignored_by_ord() {
        assert_eq!(xl_ord("K21"), 11);
    }

    #[test]
    fn item_converts_units_on_resolve() {
        let item = XlItem::number("Areas", "K8".to_owned(), 10.0).with_units(Unit::M2, Unit::Ft2);
        match item.resolved_value() {
            Some(XlValue::Number(n)) => assert!((n - 107.639_104_17).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unsupported_conversion_resolves_to_none() {
        let item = XlItem::number("Areas", "K8".to_owned(), 10.0).with_units(Unit::M2, Unit::DegF);
        assert_eq!(item.resolved_value(), None);
    }

    #[test]
    fn detached_book_rejects_io() {
        let mut book = CellBook::new();
        let err = book
            .write_cell("Areas", "K8", &XlValue::Number(1.0))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentUnavailable);
    }

    #[test]
    fn session_detaches_on_drop() {
        let mut book = CellBook::new();
        {
            let mut session = Session::attach(&mut book).unwrap();
            session
                .write_item(&XlItem::number("Areas", "K8".to_owned(), 1.0))
                .unwrap();
        }
        assert!(!book.attached);
        assert_eq!(book.writes.len(), 1);
    }
}
