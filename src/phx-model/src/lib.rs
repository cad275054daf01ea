// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The neutral in-memory representation of a Passive-House building,
//! independent of any source or target file format.
//!
//! A `Project` is built once by an importer (see the `phx-compat` crate),
//! validated, read by one or more exporters, and discarded. Shared
//! definitions (materials, assemblies, window types, schedules, mechanical
//! equipment) live in keyed [`catalog::Catalog`] registries owned by the
//! Project; tree nodes hold lookup keys, never entity ownership.

#![forbid(unsafe_code)]

pub mod building;
pub mod catalog;
pub mod certification;
pub mod common;
pub mod components;
pub mod constructions;
pub mod elec;
pub mod geometry;
pub mod hvac;
pub mod project;
pub mod schedules;
pub mod site;
pub mod spaces;
pub mod units;

pub use self::common::{Error, ErrorCode, ErrorKind, ExportWarning, Result};
pub use self::project::{BuildingSegment, Project};
