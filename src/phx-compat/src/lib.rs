// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Translators between the neutral building model and the external
//! platforms: HBJSON in, WUFI XML out and back in, PHPP cell writes out.

#![forbid(unsafe_code)]

use std::io::BufRead;

pub use phx_model::{self as model, Error, ErrorCode, ErrorKind, ExportWarning, Result};
use phx_model::project::Project;

pub mod hbjson;
pub mod phpp;
pub mod wufi;

/// Import an HBJSON document into a validated Project.
pub fn open_hbjson(reader: &mut dyn BufRead) -> Result<Project> {
    hbjson::project_from_reader(reader)
}

/// Render a Project as a WUFI XML document string, plus any non-fatal
/// warnings from the traversal.
pub fn to_wufi_xml(project: &Project) -> Result<(String, Vec<ExportWarning>)> {
    wufi::project_to_wufi_xml(project)
}

/// Re-import a WUFI XML document into a validated Project.
pub fn open_wufi_xml(reader: &mut dyn BufRead) -> Result<Project> {
    wufi::project_from_reader(reader)
}

/// Write a Project into an attached PHPP workbook.
pub fn to_phpp<W: phpp::xl::Workbook + ?Sized>(
    project: &Project,
    workbook: &mut W,
) -> Result<Vec<ExportWarning>> {
    phpp::project_to_phpp(project, workbook)
}
