// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DoesNotExist,
    JsonDeserialization,
    XmlDeserialization,
    UnknownTag,
    UnresolvedReference,
    MissingRequiredField,
    MalformedNode,
    CatalogFrozen,
    BadGeometry,
    BadPhysicalValue,
    OrphanAperture,
    AlreadyAttached,
    WrongDocumentVersion,
    DocumentUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DoesNotExist => "does_not_exist",
            JsonDeserialization => "json_deserialization",
            XmlDeserialization => "xml_deserialization",
            UnknownTag => "unknown_tag",
            UnresolvedReference => "unresolved_reference",
            MissingRequiredField => "missing_required_field",
            MalformedNode => "malformed_node",
            CatalogFrozen => "catalog_frozen",
            BadGeometry => "bad_geometry",
            BadPhysicalValue => "bad_physical_value",
            OrphanAperture => "orphan_aperture",
            AlreadyAttached => "already_attached",
            WrongDocumentVersion => "wrong_document_version",
            DocumentUnavailable => "document_unavailable",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mapping errors raised while building a Project from a foreign document.
    Import,
    /// Structural violations raised while constructing or validating the tree.
    Model,
    /// Fatal errors raised while rendering a Project into a target document.
    Export,
    /// Problems with the external target document (missing, wrong version).
    Resource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Import => "ImportError",
            ErrorKind::Model => "ModelError",
            ErrorKind::Export => "ExportError",
            ErrorKind::Resource => "ResourceError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! import_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Import,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! resource_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Resource,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Resource, ErrorCode::$code, None))
    }};
}

/// A non-fatal problem noticed while exporting: a value or feature with no
/// representation in the target platform. Accumulated and surfaced to the
/// caller as a list once the export completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportWarning {
    /// Where in the target document the omission happened ("Areas!K21",
    /// "Component/IdentNr=4").
    pub location: String,
    /// The model field that could not be represented.
    pub field: String,
    pub details: String,
}

impl ExportWarning {
    pub fn new(location: &str, field: &str, details: String) -> Self {
        ExportWarning {
            location: location.to_owned(),
            field: field.to_owned(),
            details,
        }
    }
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.location, self.field, self.details)
    }
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Import,
        ErrorCode::UnresolvedReference,
        Some("face 'wall_1': assembly 'concrete_8in' not in document".to_owned()),
    );
    let display = format!("{err}");
    assert!(display.starts_with("ImportError{unresolved_reference:"));
    assert!(display.contains("concrete_8in"));

    let err = Error::new(ErrorKind::Resource, ErrorCode::WrongDocumentVersion, None);
    assert_eq!(format!("{err}"), "ResourceError{wrong_document_version}");
}

#[test]
fn test_export_warning_display() {
    let warning = ExportWarning::new(
        "Areas!K21",
        "exposure_exterior",
        "no PHPP group for 'surface' exposure".to_owned(),
    );
    assert_eq!(
        format!("{warning}"),
        "Areas!K21 [exposure_exterior]: no PHPP group for 'surface' exposure"
    );
}
