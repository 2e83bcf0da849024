// src/lib.rs

//! Mass scanner for the Apache Struts2 Content-Type OGNL injection
//! (CVE-2017-5638).

pub mod config;
pub mod core;
pub mod errors;
pub mod input;
pub mod logging;
